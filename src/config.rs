use crate::constants;
use crate::error::{InsightsError, Result};
use crate::selector::SelectorConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tables: TableRoutes,
    pub selector: SelectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Optional JSON seed file loaded into the in-memory store on startup
    pub data_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data_file: None,
        }
    }
}

/// Mapping from public page names to backing report tables. Pages not listed
/// here route to the home table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableRoutes {
    pub home: String,
    pub term: String,
    pub saving: String,
}

impl Default for TableRoutes {
    fn default() -> Self {
        Self {
            home: constants::HOME_TABLE.to_string(),
            term: constants::TERM_TABLE.to_string(),
            saving: constants::SAVING_TABLE.to_string(),
        }
    }
}

impl TableRoutes {
    pub fn table_for_page(&self, page: &str) -> &str {
        match page {
            constants::TERM_PAGE => &self.term,
            constants::SAVING_PAGE => &self.saving,
            _ => &self.home,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Read the config file when present; a missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(path).map_err(|e| {
            InsightsError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::DedupMode;
    use std::io::Write;

    #[test]
    fn unknown_pages_route_to_the_home_table() {
        let routes = TableRoutes::default();
        assert_eq!(routes.table_for_page("home"), constants::HOME_TABLE);
        assert_eq!(routes.table_for_page("term"), constants::TERM_TABLE);
        assert_eq!(routes.table_for_page("saving"), constants::SAVING_TABLE);
        assert_eq!(routes.table_for_page("nonsense"), constants::HOME_TABLE);
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let config = Config::load_from(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.tables.home, constants::HOME_TABLE);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[tables]\nhome = \"home-test\"\n\n[selector]\ndedup = \"loose\"\n"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.tables.home, "home-test");
        assert_eq!(config.tables.term, constants::TERM_TABLE);
        assert_eq!(config.selector.dedup, DedupMode::Loose);
    }
}
