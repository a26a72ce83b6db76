//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terrain streaming command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terrane", about = "Procedural terrain streaming")]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base seed for all three climate noise fields.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Build faceted meshes with unshared vertices.
    #[arg(long)]
    pub flat_shading: Option<bool>,

    /// Background worker threads (0 = auto).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Evict chunks hidden for this many visibility passes.
    #[arg(long)]
    pub evict_after: Option<u64>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.noise = self.noise.clone().with_seed(seed);
        }
        if let Some(flat) = args.flat_shading {
            self.terrain.flat_shading = flat;
        }
        if let Some(workers) = args.workers {
            self.streaming.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(passes) = args.evict_after {
            self.streaming.evict_after_passes = Some(passes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(42),
            workers: Some(3),
            evict_after: Some(8),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.noise.height.seed, 42);
        assert_eq!(config.noise.heat.seed, 42);
        assert_eq!(config.noise.humidity.seed, 42);
        assert_eq!(config.streaming.worker_threads, 3);
        assert_eq!(config.streaming.evict_after_passes, Some(8));
        // Non-overridden fields retain defaults
        assert!(!config.terrain.flat_shading);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let defaults = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, defaults);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "terrane",
            "--seed",
            "9",
            "--flat-shading",
            "true",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.flat_shading, Some(true));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }
}
