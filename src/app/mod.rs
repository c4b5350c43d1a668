pub mod config;
pub mod state;

pub mod cli;
pub mod events;
pub mod input_handler;
pub mod keys;
pub use state::*;
