//! Remote control surfaces.
//!
//! Each adapter receives the player as a [`ControlledPlayer`], registers the
//! observer callbacks it needs and may issue commands back at any time.

pub mod fifo;
pub mod tmux;

pub use fifo::ControlFifo;
pub use tmux::TmuxStatus;

use crate::error::RemoteError;
use crate::player::ControlledPlayer;
use std::sync::Arc;
use tracing::{info, warn};

pub trait RemoteAdapter {
    fn name(&self) -> &'static str;
    fn register(&mut self, player: Arc<dyn ControlledPlayer>) -> Result<(), RemoteError>;
}

/// Register every adapter; one that fails is logged and skipped.
///
/// Returns the names of the adapters that registered.
pub fn register_all(
    adapters: &mut [Box<dyn RemoteAdapter>],
    player: Arc<dyn ControlledPlayer>,
) -> Vec<&'static str> {
    let mut registered = Vec::new();
    for adapter in adapters.iter_mut() {
        match adapter.register(player.clone()) {
            Ok(()) => {
                info!(adapter = adapter.name(), "remote adapter registered");
                registered.push(adapter.name());
            }
            Err(e) => warn!(adapter = adapter.name(), "remote adapter unavailable: {}", e),
        }
    }
    registered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::backend::fake::FakeBackend;
    use crate::player::PlaybackEngine;

    struct Broken;

    impl RemoteAdapter for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn register(&mut self, _player: Arc<dyn ControlledPlayer>) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable {
                adapter: "broken",
                reason: "no transport".to_string(),
            })
        }
    }

    struct Counting(bool);

    impl RemoteAdapter for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn register(&mut self, player: Arc<dyn ControlledPlayer>) -> Result<(), RemoteError> {
            player.on_stopped(Box::new(|| {}));
            self.0 = true;
            Ok(())
        }
    }

    #[test]
    fn test_failed_adapter_does_not_block_others() {
        let (engine, _rx) = PlaybackEngine::detached(Arc::new(FakeBackend::new()));
        let engine = Arc::new(engine);
        let mut adapters: Vec<Box<dyn RemoteAdapter>> =
            vec![Box::new(Broken), Box::new(Counting(false))];

        let registered = register_all(&mut adapters, engine.clone());
        assert_eq!(registered, vec!["counting"]);
    }
}
