use crate::config::toml_config::TomlConfig;
use crate::config::StorageKind;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_positive_number, validate_socket_addr, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "car-insurance")]
#[command(about = "Car insurance records service")]
pub struct CliConfig {
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub bind: String,

    #[arg(long, value_enum, default_value = "sqlite")]
    pub storage: StorageKind,

    #[arg(long, default_value = "car-insurance.db", help = "SQLite file, or :memory:")]
    pub database: String,

    #[arg(long, help = "Optional TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "59")]
    pub check_interval_minutes: u64,

    #[arg(long, help = "Do not start the expiration poller")]
    pub disable_poller: bool,

    #[arg(long, help = "Insert sample owners, cars and policies into an empty store")]
    pub seed_demo_data: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// Values present in the file win over the command line.
    pub fn merge_file(&mut self, file: &TomlConfig) {
        if let Some(server) = &file.server {
            if let Some(bind) = &server.bind {
                self.bind = bind.clone();
            }
        }
        if let Some(storage) = &file.storage {
            if let Some(kind) = storage.kind {
                self.storage = kind;
            }
            if let Some(path) = &storage.database {
                self.database = path.clone();
            }
            if let Some(seed) = storage.seed_demo_data {
                self.seed_demo_data = seed;
            }
        }
        if let Some(poller) = &file.poller {
            if let Some(minutes) = poller.check_interval_minutes {
                self.check_interval_minutes = minutes;
            }
            if let Some(enabled) = poller.enabled {
                self.disable_poller = !enabled;
            }
        }
        if let Some(logging) = &file.logging {
            if let Some(verbose) = logging.verbose {
                self.verbose = verbose;
            }
            if let Some(json) = logging.json {
                self.log_json = json;
            }
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_socket_addr("bind", &self.bind)?;
        if self.storage == StorageKind::Sqlite {
            validate_path("database", &self.database)?;
        }
        validate_positive_number("check_interval_minutes", self.check_interval_minutes, 1)?;
        Ok(())
    }
}
