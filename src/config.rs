use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub store_path: PathBuf,
    pub bcrypt_cost: u32,
    pub rust_log: String,
}

impl Config {
    // Read settings from the process environment, after loading .env if present
    pub fn from_env() -> AppResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                AppError::ConfigError(format!("BCRYPT_COST must be a number, got {:?}", raw))
            })?,
            None => bcrypt::DEFAULT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::ConfigError(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        Ok(Config {
            catalog_path: lookup("CATALOG_FIXTURE")
                .unwrap_or_else(|| "fixtures/catalog.json".to_string())
                .into(),
            store_path: lookup("PROFILE_STORE_PATH")
                .unwrap_or_else(|| "data/profiles.json".to_string())
                .into(),
            bcrypt_cost,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "cinema_booking=info".to_string()),
        })
    }
}
