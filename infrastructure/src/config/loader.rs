//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Configuration loader that handles file discovery and merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `AGENTRY_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./agentry.toml` or `./.agentry.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/agentry/config.toml` (or `~/.config/...`)
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        for filename in &["agentry.toml", ".agentry.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // AGENTRY_BACKEND__MODEL=... maps to [backend] model.
        figment = figment.merge(Env::prefixed("AGENTRY_").split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config).
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("agentry").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[backend]\nprovider = \"openai\"\nmodel = \"gpt-4o\"\n\n[workspace]\nroot = \"/srv/ws\""
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.backend.provider, "openai");
        assert_eq!(config.backend.model, "gpt-4o");
        assert_eq!(config.workspace.root, "/srv/ws");
        // Sections absent from the file keep defaults.
        assert_eq!(config.task.backend_timeout_secs, 120);
    }

    #[test]
    fn test_missing_optional_sources_fall_back_to_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.backend.provider, "anthropic");
    }
}
