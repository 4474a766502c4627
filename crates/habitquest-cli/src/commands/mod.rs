pub mod campaign;
pub mod checkin;
pub mod config;
pub mod participation;
pub mod reward;

use chrono::{DateTime, NaiveDate, Utc};
use habitquest_core::{Config, ConfigError};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Per-invocation identity and clock.
pub struct Context {
    pub config: Config,
    user: Option<String>,
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

impl Context {
    /// Fails when `config.toml` exists but cannot be read or parsed.
    pub fn load(user: Option<String>, today: Option<NaiveDate>) -> Result<Self, ConfigError> {
        let config = Config::load()?;
        let now = Utc::now();
        let today = today.unwrap_or_else(|| config.today(now));
        Ok(Self {
            config,
            user,
            today,
            now,
        })
    }

    /// The acting user: `--user` first, then `identity.user_id`.
    pub fn user_id(&self) -> Result<&str, Box<dyn std::error::Error>> {
        self.user
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.config.user_id())
            .ok_or_else(|| {
                "no user: pass --user or run `habitquest config set identity.user_id <id>`".into()
            })
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
