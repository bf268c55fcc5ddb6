use crate::cli::Cli;
use crate::client::LookupOptions;
use crate::logging::LoggingOptions;
use anyhow::{anyhow, Result};
use etcetera::{choose_app_strategy, AppStrategy, AppStrategyArgs};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_PREFIX: &str = "PINCODE_";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,
    pub main: MainConfig,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct MainConfig {
    pub state_dir: PathBuf,
    pub lookup: LookupOptions,
    pub logging: LoggingOptions,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            state_dir: Config::default_dirs().state.clone(),
            lookup: LookupOptions::default(),
            logging: LoggingOptions::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let mut path = PathBuf::from(&Self::default_dirs().config);
        path.push("config.yml");
        path
    }

    pub fn default_dirs() -> &'static DefaultDirs {
        DEFAULT_DIRS.get_or_init(|| match choose_app_strategy(AppStrategyArgs {
            top_level_domain: "org".to_string(),
            author: "sublipri".to_string(),
            app_name: "Pin Buddy".to_string(),
        }) {
            Ok(strategy) => DefaultDirs {
                config: strategy.config_dir(),
                state: strategy.state_dir().unwrap_or(strategy.data_dir()),
            },
            // No home directory, fall back to the working directory
            Err(_) => DefaultDirs {
                config: PathBuf::from("."),
                state: PathBuf::from("."),
            },
        })
    }

    /// Defaults, then the YAML file, then `PINCODE_` variables.
    fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(MainConfig::default()))
            .merge(Yaml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_path(config_path: &Path) -> Result<Self> {
        let main = Self::figment(config_path).extract()?;
        Ok(Self {
            config_path: config_path.to_owned(),
            main,
        })
    }

    pub fn from_cli(args: &Cli) -> Result<Self> {
        let config_path = if let Some(path) = &args.config_path {
            path.to_owned()
        } else {
            Self::default_path()
        };

        let mut config = Self::from_path(&config_path)?;
        if let Some(api_base) = &args.api_base {
            config.main.lookup.api_base = api_base.clone();
        }
        if let Some(level) = args.log_level {
            config.main.logging.console_level = level;
        }
        Ok(config)
    }

    pub fn write_config_file(&self) -> Result<()> {
        let Some(dir) = self.config_path.parent() else {
            return Err(anyhow!("{} has no parent directory", self.config_path.display()));
        };
        if !dir.as_os_str().is_empty() && !dir.exists() {
            create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(&self.main)?;
        fs::write(&self.config_path, yaml)?;
        info!("Wrote config to {}", self.config_path.display());
        Ok(())
    }

    pub fn log_dir(&self) -> &Path {
        &self.main.state_dir
    }
}

static DEFAULT_DIRS: OnceCell<DefaultDirs> = OnceCell::new();

#[derive(Debug, Deserialize, Serialize)]
pub struct DefaultDirs {
    pub config: PathBuf,
    pub state: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::URL_BASE;
    use crate::logging::LogLevel;
    use figment::Jail;

    // Every test runs in a Jail so environment changes never leak between them

    #[test]
    fn missing_file_gives_defaults() {
        Jail::expect_with(|jail| {
            let config =
                Config::from_path(&jail.directory().join("config.yml")).map_err(|e| e.to_string())?;
            assert_eq!(config.main.lookup.api_base, URL_BASE);
            assert_eq!(config.main.lookup.timeout_secs, None);
            assert_eq!(config.main.logging.console_level, LogLevel::Warn);
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yml",
                "lookup:\n  api_base: http://localhost:9000/pincode\n  timeout_secs: 10\n\
                 logging:\n  console_level: debug\n",
            )?;
            let config = Config::from_path(Path::new("config.yml")).map_err(|e| e.to_string())?;
            assert_eq!(config.main.lookup.api_base, "http://localhost:9000/pincode");
            assert_eq!(config.main.lookup.timeout_secs, Some(10));
            assert_eq!(config.main.logging.console_level, LogLevel::Debug);
            // Keys not in the file keep their defaults
            assert!(!config.main.logging.file_enabled);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yml", "lookup:\n  api_base: http://localhost:9000/pincode\n")?;
            jail.set_env("PINCODE_LOOKUP__API_BASE", "http://127.0.0.1:8080/pincode");
            jail.set_env("PINCODE_LOOKUP__TIMEOUT_SECS", "7");
            jail.set_env("PINCODE_LOGGING__CONSOLE_LEVEL", "trace");
            let config = Config::from_path(Path::new("config.yml")).map_err(|e| e.to_string())?;
            assert_eq!(config.main.lookup.api_base, "http://127.0.0.1:8080/pincode");
            assert_eq!(config.main.lookup.timeout_secs, Some(7));
            assert_eq!(config.main.logging.console_level, LogLevel::Trace);
            Ok(())
        });
    }

    #[test]
    fn written_file_reads_back() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.yml");
            let mut config = Config::from_path(&path).map_err(|e| e.to_string())?;
            config.main.lookup.timeout_secs = Some(3);
            config.write_config_file().map_err(|e| e.to_string())?;
            let read = Config::from_path(&path).map_err(|e| e.to_string())?;
            assert_eq!(read.main, config.main);
            Ok(())
        });
    }

    #[test]
    fn bad_yaml_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yml", "lookup: [1, 2")?;
            assert!(Config::from_path(Path::new("config.yml")).is_err());
            Ok(())
        });
    }
}
