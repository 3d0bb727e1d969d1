//! Command implementations for the ChordForge CLI.

use anyhow::{Context, Result};
use std::fs;

use chordforge_spec::GenerationConfig;

pub mod generate;
pub mod preview;

/// Load a generation config from a JSON file, or fall back to defaults.
///
/// A `--seed` given on the command line overrides whatever the file says.
pub(crate) fn load_config(path: Option<&str>, seed: Option<u32>) -> Result<GenerationConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config file: {}", path))?
        }
        None => GenerationConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None, None).unwrap();
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn seed_flag_overrides_config_seed() {
        let config = load_config(None, Some(42)).unwrap();
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        assert!(load_config(Some("/nonexistent/config.json"), None).is_err());
    }
}
