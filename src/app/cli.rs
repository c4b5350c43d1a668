use clap::Parser;
use std::path::PathBuf;

/// Cadence - a queue-first music player for your terminal 🎵
#[derive(Parser, Debug)]
#[command(name = "cadence", version, about)]
pub struct Args {
    /// Catalog ids, local files or URLs to enqueue
    #[arg(value_name = "TRACKS")]
    pub tracks: Vec<String>,

    /// Start playing the queue immediately
    #[arg(long)]
    pub play: bool,

    /// Use this config file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `cadence=debug` (RUST_LOG takes precedence)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Do not register tmux / control pipe surfaces
    #[arg(long)]
    pub no_remote: bool,

    /// Generate default config.toml to stdout
    #[arg(long)]
    pub generate_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "cadence",
            "--play",
            "--log-level",
            "cadence=debug",
            "tr-1",
            "/music/a.flac",
        ]);
        assert!(args.play);
        assert!(!args.no_remote);
        assert_eq!(args.log_level.as_deref(), Some("cadence=debug"));
        assert_eq!(args.tracks, vec!["tr-1", "/music/a.flac"]);
    }
}
