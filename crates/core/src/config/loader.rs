use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix for overrides, e.g. `POWERHOUR_FETCH__MAX_PARALLEL=2`
pub const ENV_PREFIX: &str = "POWERHOUR_";

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "powerhour.toml";

fn layered(path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    layered(Some(path))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load defaults, `powerhour.toml` if present, and environment overrides
pub fn load_default_config() -> Result<Config, ConfigError> {
    let default_file = Path::new(DEFAULT_CONFIG_FILE);
    let file = default_file.exists().then_some(default_file);

    layered(file)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[segment]
duration_secs = 45
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.segment.duration_secs, 45.0);
    }

    #[test]
    fn test_load_config_from_str_bad_value() {
        let toml = r#"
[assembly]
order = "random"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/powerhour.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[paths]
index = "songs.txt"

[fetch]
max_parallel = 6
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.paths.index, PathBuf::from("songs.txt"));
        assert_eq!(config.fetch.max_parallel, 6);
        // Untouched sections keep their defaults.
        assert_eq!(config.segment.max_parallel, 2);
    }
}
