use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use beanflow_core::{DEFAULT_CURRENCY, DEFAULT_UNKNOWN_ACCOUNT};

pub const TOKEN_ENV: &str = "UPBANK_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub upbank: UpbankSection,
    #[serde(default)]
    pub ledger: LedgerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpbankSection {
    /// Personal access token; the UPBANK_TOKEN env var takes precedence.
    pub token: Option<String>,
    pub bank_account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    pub bank_account: String,
    pub currency: String,
    pub unknown_account: String,
}

impl Default for UpbankSection {
    fn default() -> Self {
        UpbankSection {
            token: None,
            bank_account: "Assets:Bank:Upbank".to_string(),
        }
    }
}

impl Default for LedgerSection {
    fn default() -> Self {
        LedgerSection {
            bank_account: "Assets:Bank:Cheque".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            unknown_account: DEFAULT_UNKNOWN_ACCOUNT.to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".beanflow").join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

impl Config {
    /// Resolve the Up token, env var first. Commands that never touch the
    /// API never call this, so a missing token only fails where it matters.
    pub fn require_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Ok(token);
            }
        }
        match &self.upbank.token {
            Some(token) if !token.trim().is_empty() => Ok(token.clone()),
            _ => bail!(
                "no Up Bank token: set {} or `upbank.token` in {}",
                TOKEN_ENV,
                config_path()?.display()
            ),
        }
    }
}
