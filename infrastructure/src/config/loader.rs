//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["secreview.toml", ".secreview.toml"];

/// Environment variables and the config keys they set.
const ENV_KEYS: [(&str, &str); 7] = [
    ("AI_PROVIDER", "provider.name"),
    ("AI_MODEL", "provider.model"),
    ("AI_TIMEOUT_SECONDS", "provider.timeout_seconds"),
    ("AI_MAX_RETRIES", "provider.max_retries"),
    ("AI_MAX_TOKENS", "provider.max_tokens"),
    ("AZURE_OPENAI_ENDPOINT", "azure_openai.endpoint"),
    ("AZURE_OPENAI_API_VERSION", "azure_openai.api_version"),
];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (`AI_PROVIDER`, `AI_MODEL`, ...)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./secreview.toml` or `./.secreview.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/secreview/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Self::env()).extract().map_err(Box::new)
    }

    /// Defaults plus environment variables only (for --no-config)
    pub fn load_without_files() -> Result<FileConfig, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Self::env())
            .extract()
            .map_err(Box::new)
    }

    fn env() -> Env {
        let names: Vec<&str> = ENV_KEYS.iter().map(|(name, _)| *name).collect();
        Env::raw().only(&names).map(|key| {
            ENV_KEYS
                .iter()
                .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                .map(|(_, path)| (*path).into())
                .unwrap_or_else(|| key.as_str().to_owned().into())
        })
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/secreview/config.toml if set,
    /// otherwise falls back to ~/.config/secreview/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("secreview").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        for (name, _) in ENV_KEYS {
            if std::env::var_os(name).is_some() {
                println!("  [SET  ] Env:     {}", name);
            }
        }

        if let Some(path) = config_path {
            println!("  [FOUND] Explicit: {}", path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./secreview.toml or ./.secreview.toml");
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
    use figment::Jail;

    /// Point the global config lookup into the jail.
    fn isolate(jail: &mut Jail) {
        let home = jail.directory().join("xdg");
        jail.set_env("XDG_CONFIG_HOME", home.display());
    }

    #[test]
    fn test_load_defaults() {
        Jail::expect_with(|jail| {
            isolate(jail);
            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config, FileConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_project_file_then_explicit_then_env() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file(
                "secreview.toml",
                r#"
[provider]
name = "openai"
model = "gpt-4o-mini"
max_retries = 2
"#,
            )?;
            jail.create_file(
                "override.toml",
                r#"
[provider]
model = "gpt-4.1"
"#,
            )?;
            jail.set_env("AI_MAX_RETRIES", "7");

            let config = ConfigLoader::load(Some(Path::new("override.toml"))).map_err(|e| *e)?;
            assert_eq!(config.provider.name, "openai");
            assert_eq!(config.provider.model.as_deref(), Some("gpt-4.1"));
            assert_eq!(config.provider.max_retries, 7);
            Ok(())
        });
    }

    #[test]
    fn test_global_config_is_lowest_file_priority() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_dir("xdg/secreview")?;
            jail.create_file(
                "xdg/secreview/config.toml",
                "[provider]\nname = \"openai\"\nmax_tokens = 4096\n",
            )?;
            jail.create_file(".secreview.toml", "[provider]\nname = \"anthropic\"\n")?;

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.provider.name, "anthropic");
            assert_eq!(config.provider.max_tokens, 4096);
            Ok(())
        });
    }

    #[test]
    fn test_env_mapping_for_azure() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.set_env("AI_PROVIDER", "azure_openai");
            jail.set_env("AI_MODEL", "my-deployment");
            jail.set_env("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com/");
            jail.set_env("AZURE_OPENAI_API_VERSION", "2024-10-21");
            jail.set_env("AI_TIMEOUT_SECONDS", "90");

            let config = ConfigLoader::load_without_files().map_err(|e| *e)?;
            assert_eq!(config.provider.name, "azure_openai");
            assert_eq!(config.provider.model.as_deref(), Some("my-deployment"));
            assert_eq!(config.provider.timeout_seconds, 90);
            assert_eq!(
                config.azure_openai.endpoint.as_deref(),
                Some("https://res.openai.azure.com/")
            );
            assert_eq!(config.azure_openai.api_version(), Some("2024-10-21"));
            assert!(config.validate().is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_no_config_ignores_project_file() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("secreview.toml", "[provider]\nname = \"openai\"\n")?;
            let config = ConfigLoader::load_without_files().map_err(|e| *e)?;
            assert_eq!(config.provider.name, "anthropic");
            Ok(())
        });
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("secreview"));
    }
}
