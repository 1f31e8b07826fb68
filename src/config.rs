use crate::env_file;
use crate::error::QrisError;
use chrono::NaiveDate;
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

/// The portal's own mobile browser user agent, sent unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Mobile Safari/537.36";

const ENV_COOKIE: &str = "MANDIRI_COOKIE";
const ENV_SECRET_ID: &str = "MANDIRI_SECRET_ID";
const ENV_SECRET_KEY: &str = "MANDIRI_SECRET_KEY";
const ENV_SECRET_TOKEN: &str = "MANDIRI_SECRET_TOKEN";
const ENV_SESSION_ITEM: &str = "MANDIRI_SESSION_ITEM";
const ENV_USER_AGENT: &str = "MANDIRI_USER_AGENT";

#[derive(Debug, Parser)]
#[command(name = "qris-fetch", about = "Fetch QRIS transaction data for the given date range.")]
pub struct Cli {
    /// Start date in YYYY-MM-DD or YYYYMMDD format.
    #[arg(long, value_parser = normalize_date)]
    start_date: NaiveDate,

    /// End date in YYYY-MM-DD or YYYYMMDD format.
    #[arg(long, value_parser = normalize_date)]
    end_date: NaiveDate,

    /// Exact Cookie header string; falls back to MANDIRI_COOKIE.
    #[arg(long, env = ENV_COOKIE)]
    cookie: Option<String>,

    /// Value of the secret-id header; falls back to MANDIRI_SECRET_ID.
    #[arg(long, env = ENV_SECRET_ID)]
    secret_id: Option<String>,

    /// Value of the secret-key header; falls back to MANDIRI_SECRET_KEY.
    #[arg(long, env = ENV_SECRET_KEY)]
    secret_key: Option<String>,

    /// Value of the secret-token header; falls back to MANDIRI_SECRET_TOKEN.
    #[arg(long, env = ENV_SECRET_TOKEN)]
    secret_token: Option<String>,

    /// Value of the session-item header; falls back to MANDIRI_SESSION_ITEM.
    #[arg(long, env = ENV_SESSION_ITEM)]
    session_item: Option<String>,

    /// User-Agent header to use. Defaults to the portal's mobile UA.
    #[arg(long, env = ENV_USER_AGENT)]
    user_agent: Option<String>,

    /// Optional path to write the JSON response.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Path to a .env file containing the required headers.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Call the portal refresh endpoint before fetching transactions.
    #[arg(long)]
    refresh: bool,
}

/// Resolved run configuration; immutable after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cookie: Option<String>,
    pub secret_id: Option<String>,
    pub secret_key: Option<String>,
    pub secret_token: Option<String>,
    pub session_item: Option<String>,
    pub user_agent: String,
    pub output: Option<PathBuf>,
    pub env_file: PathBuf,
    pub refresh: bool,
}

impl Cli {
    /// Load the env file and merge it below the flag/environment values.
    pub fn resolve(self) -> Result<Config, QrisError> {
        let file_vars = env_file::load(&self.env_file)?;
        Ok(self.merge(file_vars))
    }

    /// Precedence per option: flag > process environment (both already folded
    /// into the clap value) > env-file entry > built-in default. A present but
    /// empty flag/environment value still blocks the env-file fallback.
    fn merge(self, file_vars: HashMap<String, String>) -> Config {
        let fill =
            |value: Option<String>, key: &str| value.or_else(|| file_vars.get(key).cloned());

        let user_agent = fill(self.user_agent, ENV_USER_AGENT)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Config {
            start_date: self.start_date,
            end_date: self.end_date,
            cookie: fill(self.cookie, ENV_COOKIE),
            secret_id: fill(self.secret_id, ENV_SECRET_ID),
            secret_key: fill(self.secret_key, ENV_SECRET_KEY),
            secret_token: fill(self.secret_token, ENV_SECRET_TOKEN),
            session_item: fill(self.session_item, ENV_SESSION_ITEM)
                .filter(|item| !item.is_empty()),
            user_agent,
            output: self.output,
            env_file: self.env_file,
            refresh: self.refresh,
        }
    }
}

/// Accept a date in either `YYYYMMDD` or `YYYY-MM-DD` form.
fn normalize_date(raw: &str) -> Result<NaiveDate, QrisError> {
    let cleaned = raw.replace('-', "");
    if cleaned.len() != 8 || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QrisError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(&cleaned, "%Y%m%d")
        .map_err(|_| QrisError::InvalidDate(raw.to_string()))
}
