use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use pipcheck::PipOptions;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub pip: PipOptions,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    pub listen: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataConfig {
    /// GeoJSON file with the polygons to serve
    pub polygons: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
listen = "127.0.0.1:4000"

[data]
polygons = "regions.geojson"

[pip]
ignore_boundary = true
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.listen.as_deref(), Some("127.0.0.1:4000"));
        assert_eq!(config.data.polygons, Some(PathBuf::from("regions.geojson")));
        assert!(config.pip.ignore_boundary);
    }

    #[test]
    fn test_sections_are_optional() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[data]\npolygons = \"a.geojson\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert!(config.server.listen.is_none());
        assert!(!config.pip.ignore_boundary);
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load_from_file("/nonexistent/pipcheck.toml").is_err());
    }
}
