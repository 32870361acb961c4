use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use serde::Deserialize;

/// Command line flags. Each one overrides the matching environment variable.
#[derive(Debug, Default, Parser)]
#[command(name = "client-hub", version, about = "Projects, invoices and messages in the terminal")]
pub struct Args {
    /// Postgres connection URL
    #[arg(long)]
    pub database_url: Option<String>,

    /// File the application log is written to
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Apply the bundled schema migrations on startup
    #[arg(long)]
    pub migrate: bool,

    /// Name shown on messages sent from this terminal
    #[arg(long)]
    pub sender: Option<String>,
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default)]
    pub run_migrations: bool,

    /// Sender name that marks messages as our own
    #[serde(default = "default_local_sender")]
    pub local_sender: String,

    pub support_phone: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("client_hub.log")
}

fn default_local_sender() -> String {
    "You".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Parse configuration from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Config>(vars)?)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Fold command line overrides into the loaded configuration.
    pub fn apply(mut self, args: &Args) -> Self {
        if let Some(url) = &args.database_url {
            self.database_url = url.clone();
        }
        if let Some(path) = &args.log_file {
            self.log_file = path.clone();
        }
        if args.migrate {
            self.run_migrations = true;
        }
        if let Some(sender) = &args.sender {
            self.local_sender = sender.clone();
        }
        self
    }
}

/// Load configuration, letting command line flags win over the environment.
///
/// Variables from a `.env` file are loaded first if it exists.
pub fn init(args: &Args) -> Result<Config> {
    dotenv().ok();

    // A URL on the command line makes DATABASE_URL optional.
    let mut vars: Vec<(String, String)> = std::env::vars().collect();
    if let Some(url) = &args.database_url {
        vars.retain(|(key, _)| key != "DATABASE_URL");
        vars.push(("DATABASE_URL".to_string(), url.clone()));
    }

    let config = Config::from_vars(vars)?.apply(args);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = Config::from_vars(vars(&[("DATABASE_URL", "postgres://localhost/hub")])).unwrap();

        assert_eq!(config.database_url(), "postgres://localhost/hub");
        assert_eq!(config.log_file, PathBuf::from("client_hub.log"));
        assert_eq!(config.local_sender, "You");
        assert_eq!(config.max_connections, 5);
        assert!(!config.run_migrations);
        assert!(config.support_phone.is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert!(Config::from_vars(vars(&[("LOG_FILE", "hub.log")])).is_err());
    }

    #[test]
    fn environment_values_are_parsed() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://db/hub"),
            ("RUN_MIGRATIONS", "true"),
            ("LOCAL_SENDER", "Client"),
            ("SUPPORT_PHONE", "09099996659"),
            ("MAX_CONNECTIONS", "2"),
        ]))
        .unwrap();

        assert!(config.run_migrations);
        assert_eq!(config.local_sender, "Client");
        assert_eq!(config.support_phone.as_deref(), Some("09099996659"));
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn flags_override_environment() {
        let config = Config::from_vars(vars(&[("DATABASE_URL", "postgres://env/hub")])).unwrap();
        let args = Args {
            database_url: Some("postgres://flag/hub".to_string()),
            log_file: Some(PathBuf::from("/tmp/hub.log")),
            migrate: true,
            sender: Some("Studio".to_string()),
        };

        let config = config.apply(&args);

        assert_eq!(config.database_url(), "postgres://flag/hub");
        assert_eq!(config.log_file, PathBuf::from("/tmp/hub.log"));
        assert!(config.run_migrations);
        assert_eq!(config.local_sender, "Studio");
    }
}
