use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::re::engine::DEFAULT_SPECULATION_THRESHOLD;

/// Configuration used when building a [`Regexp`](crate::Regexp).
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Matching engine configuration.
    pub engine: EngineConfig,
}

/// Matching engine configuration.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Evaluate the alternatives at decision points in parallel when
    /// there are idle worker threads.
    pub speculative: bool,
    /// Decision points where fewer than this number of bytes remain in the
    /// input are always evaluated sequentially.
    pub speculation_threshold: usize,
    /// Use the precompiled version of the pattern if one is linked into
    /// the program.
    pub use_precompiled: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            engine: EngineConfig {
                speculative: false,
                speculation_threshold: DEFAULT_SPECULATION_THRESHOLD,
                use_precompiled: true,
            },
        }
    }
}

/// Load config file from a given path. Path must contain a valid TOML file or
/// this function will propagate the error. Settings missing from the file
/// keep their default values.
pub fn load_config_from_file(
    config_file: &Path,
) -> Result<Config, figment::Error> {
    let config: Config =
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file_exact(config_file))
            .extract()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    use super::{load_config_from_file, Config};

    #[test]
    fn partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.child("yarex.toml");

        config_file
            .write_str(
                r#"
[engine]
speculative = true
"#,
            )
            .unwrap();

        let config = load_config_from_file(config_file.path()).unwrap();

        let mut expected = Config::default();
        expected.engine.speculative = true;

        assert_eq!(config, expected);
    }

    #[test]
    fn full_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.child("yarex.toml");

        config_file
            .write_str(
                r#"
[engine]
speculative = true
speculation_threshold = 1024
use_precompiled = false
"#,
            )
            .unwrap();

        let config = load_config_from_file(config_file.path()).unwrap();

        assert!(config.engine.speculative);
        assert_eq!(config.engine.speculation_threshold, 1024);
        assert!(!config.engine.use_precompiled);
    }

    #[test]
    fn missing_file() {
        let temp_dir = TempDir::new().unwrap();

        assert!(load_config_from_file(&temp_dir.path().join("yarex.toml"))
            .is_err());
        assert!(
            load_config_from_file(Path::new("/nonexistent/yarex.toml")).is_err()
        );
    }

    #[test]
    fn invalid_type() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.child("yarex.toml");

        config_file
            .write_str(
                r#"
[engine]
speculation_threshold = "many"
"#,
            )
            .unwrap();

        assert!(load_config_from_file(config_file.path()).is_err());
    }
}
