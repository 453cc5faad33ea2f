//! Configuration file loader with multi-source merging.

use std::path::PathBuf;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};

use super::file_config::FileConfig;

/// Configuration loader that handles file discovery and merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority.
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./conclave.toml` or `./.conclave.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/conclave/config.toml`
    /// 4. Fallback: `~/.config/conclave/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path).nested());
            }
        }

        for filename in &["conclave.toml", ".conclave.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path).nested());
        }

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for `--no-config`).
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// XDG_CONFIG_HOME/conclave/config.toml if set, else ~/.config/conclave/config.toml.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("conclave").join("config.toml"))
    }

    /// The project-level config file path, if one exists.
    pub fn project_config_path() -> Option<PathBuf> {
        for filename in &["conclave.toml", ".conclave.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Print the config file locations being used (for `--show-config`).
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./conclave.toml or ./.conclave.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_defaults_matches_file_config_default() {
        let config = ConfigLoader::load_defaults();
        assert!(config.agents.agents.is_empty());
        assert_eq!(config.cost.threshold_usd, 1.0);
    }

    #[test]
    fn global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("conclave"));
    }
}
