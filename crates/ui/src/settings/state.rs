use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};
use zova_llm::BackendConfig;

pub const DEFAULT_DEVELOPMENT_URL: &str = "http://localhost:3000";
pub const SETTINGS_DIRECTORY_NAME: &str = "zova";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SETTINGS_ENV_PREFIX: &str = "ZOVA_";

/// Deployment the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_development_url")]
    pub development_url: String,
    #[serde(default)]
    pub production_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            development_url: default_development_url(),
            production_url: String::new(),
        }
    }
}

impl ClientSettings {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".zova"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    /// Defaults, then the JSON file (if present), then `ZOVA_*` variables.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX))
    }

    pub fn load_from(path: &Path) -> SettingsResult<Self> {
        Self::figment(path)
            .extract::<Self>()
            .map(Self::normalized)
            .context(ExtractSettingsSnafu {
                stage: "extract-settings",
                path: path.to_path_buf(),
            })
    }

    /// Loads from the default path, falling back to defaults on a broken file.
    pub fn load() -> Self {
        let path = Self::default_config_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(
                    "failed to load settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                Self::default()
            }
        }
    }

    pub fn normalized(mut self) -> Self {
        self.development_url = if self.development_url.trim().is_empty() {
            default_development_url()
        } else {
            self.development_url.trim().to_string()
        };
        self.production_url = self.production_url.trim().to_string();
        self
    }

    /// Resolves the backend origin for the configured environment.
    pub fn base_url(&self) -> SettingsResult<String> {
        let url = match self.environment {
            Environment::Development => self.development_url.trim(),
            Environment::Production => {
                ensure!(
                    !self.production_url.trim().is_empty(),
                    MissingProductionUrlSnafu {
                        stage: "resolve-base-url",
                    }
                );
                self.production_url.trim()
            }
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    pub fn backend_config(&self) -> SettingsResult<BackendConfig> {
        Ok(BackendConfig::new(self.base_url()?))
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to load settings from {path:?} on `{stage}`: {source}"))]
    ExtractSettings {
        stage: &'static str,
        path: PathBuf,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
    #[snafu(display(
        "production environment selected but no production_url is configured (`{stage}`)"
    ))]
    MissingProductionUrl { stage: &'static str },
}

fn default_development_url() -> String {
    DEFAULT_DEVELOPMENT_URL.to_string()
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    fn load(jail: &Jail) -> ClientSettings {
        let path = jail.directory().join(SETTINGS_FILE_NAME);
        match ClientSettings::load_from(&path) {
            Ok(settings) => settings,
            Err(error) => panic!("settings should load: {error}"),
        }
    }

    #[test]
    fn missing_file_uses_development_defaults() {
        Jail::expect_with(|jail| {
            let settings = load(jail);

            assert_eq!(settings, ClientSettings::default());
            assert_eq!(settings.base_url().ok().as_deref(), Some(DEFAULT_DEVELOPMENT_URL));
            Ok(())
        });
    }

    #[test]
    fn file_selects_production_origin() {
        Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE_NAME,
                r#"{ "environment": "production", "production_url": "https://chat.example.com/" }"#,
            )?;

            let settings = load(jail);

            assert_eq!(settings.environment, Environment::Production);
            assert_eq!(
                settings.base_url().ok().as_deref(),
                Some("https://chat.example.com")
            );
            Ok(())
        });
    }

    #[test]
    fn environment_variables_override_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE_NAME,
                r#"{ "development_url": "http://localhost:4000" }"#,
            )?;
            jail.set_env("ZOVA_DEVELOPMENT_URL", "http://127.0.0.1:5000");

            let settings = load(jail);

            assert_eq!(
                settings.base_url().ok().as_deref(),
                Some("http://127.0.0.1:5000")
            );
            Ok(())
        });
    }

    #[test]
    fn production_without_origin_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("ZOVA_ENVIRONMENT", "production");

            let settings = load(jail);

            assert!(matches!(
                settings.base_url(),
                Err(SettingsError::MissingProductionUrl { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_reported() {
        Jail::expect_with(|jail| {
            jail.create_file(SETTINGS_FILE_NAME, "{ not json")?;
            let path = jail.directory().join(SETTINGS_FILE_NAME);

            assert!(matches!(
                ClientSettings::load_from(&path),
                Err(SettingsError::ExtractSettings { .. })
            ));
            Ok(())
        });
    }
}
