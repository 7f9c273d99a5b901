use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config, read_config_from};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

use crate::progress::PointsPolicy;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    progress: PointsPolicy,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let text = read_config(use_local)?;
                    Self::parse(&text)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn parse(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn progress(&self) -> &PointsPolicy {
        &self.progress
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::progress::{DEFAULT_LESSON_POINTS, DEFAULT_QUIZ_POINTS_PER_SCORE};

    #[tokio::test]
    async fn config_test() {
        let config = Config::get_or_init(true).await;
        assert_eq!(config.host().bindto(), "127.0.0.1:5000"); // defaults
    }

    #[test]
    fn config_progress_defaults() {
        let config = Config::parse(
            r#"
            [host]
            bindto = "0.0.0.0:8080"
            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/test"
            "#,
        )
        .unwrap();

        assert!(!config.app().docs());
        assert_eq!(config.progress().lesson_points(), DEFAULT_LESSON_POINTS);
        assert_eq!(
            config.progress().quiz_points_per_score(),
            DEFAULT_QUIZ_POINTS_PER_SCORE
        );
    }

    #[test]
    fn config_progress_overrides() {
        let config = Config::parse(
            r#"
            [host]
            bindto = "0.0.0.0:8080"
            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/test"
            docs = true
            [progress]
            lesson_points = 25
            quiz_points_per_score = 3
            "#,
        )
        .unwrap();

        assert!(config.app().docs());
        assert_eq!(*config.progress(), PointsPolicy::new(25, 3));
    }

    #[test]
    fn config_missing_section() {
        assert!(Config::parse("[host]\nbindto = \"x\"").is_err());
    }
}
