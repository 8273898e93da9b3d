use anyhow::{Result, bail};
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 8000;

#[derive(Parser, Debug)]
#[command(name = "bookmarks")]
#[command(about = "Runs the bookmarks service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookmarks")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

/// Deployment mode. Anything that is not `production` is treated as development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
        }
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Environment::parse(&raw))
    }
}

#[derive(Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    pub environment: Environment,
    api_token: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Hand-written so the token never ends up in a log line.
impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("api_token", &"[redacted]")
            .finish()
    }
}

impl App {
    pub fn new(port: u16, environment: Environment, api_token: &str) -> Self {
        App {
            port,
            environment,
            api_token: api_token.to_owned(),
        }
    }

    pub fn get_port(&self) -> u16 {
        return self.port;
    }

    pub fn get_api_token(&self) -> &str {
        return &self.api_token;
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: App,
}

impl Config {
    /// Loads configuration from `path` if given, else from the default config file when
    /// it exists, else from `PORT`, `APP_ENV` and `API_TOKEN`.
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(path) => Config::load_config(path)?,
            None => {
                let default = default_config_path();
                if default.is_file() {
                    Config::load_config(&default)?
                } else {
                    Config::from_env()?
                }
            }
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.app.port = port;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.app.api_token.trim().is_empty() {
            bail!("api_token must be set and non-empty");
        }
        Ok(())
    }

    fn from_env() -> Result<Config> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>()?,
            Err(_) => DEFAULT_PORT,
        };
        let environment = env::var("APP_ENV")
            .map(|raw| Environment::parse(&raw))
            .unwrap_or_default();
        let api_token = env::var("API_TOKEN").unwrap_or_default();

        Ok(Config {
            app: App::new(port, environment, &api_token),
        })
    }

    fn load_config(path: &Path) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!(variable = %var_name, "environment variable not found");
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse(" Production "), Environment::Production);
        assert_eq!(Environment::parse("staging"), Environment::Development);
        assert_eq!(Environment::parse(""), Environment::Development);
    }

    #[test]
    fn test_yaml_defaults_with_substitution() {
        let yaml = "app:\n  api_token: ${BOOKMARKS_TEST_UNSET_TOKEN:-s3cret}\n";
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.app.get_api_token(), "s3cret");
        assert_eq!(cfg.app.get_port(), DEFAULT_PORT);
        assert_eq!(cfg.app.environment, Environment::Development);
    }

    #[test]
    fn test_yaml_full() {
        let yaml = "app:\n  port: 9090\n  environment: production\n  api_token: abc\n";
        let cfg = Config::from_yaml(yaml).unwrap().with_port(Some(7070));
        assert_eq!(cfg.app.get_port(), 7070);
        assert!(cfg.app.environment.is_production());
    }

    #[test]
    fn test_empty_token_rejected() {
        let cfg = Config {
            app: App::new(8000, Environment::Development, "  "),
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let app = App::new(8000, Environment::Production, "hunter2");
        let rendered = format!("{:?}", app);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[redacted]"));
    }
}
