use std::path::PathBuf;
use std::time::Duration;

use crate::error::HarvestError;

pub const USERNAME_VAR: &str = "ISLANDSUN_USERNAME";
pub const PASSWORD_VAR: &str = "ISLANDSUN_PASSWORD";

const DEFAULT_BASE_URL: &str = "http://apps.islandsunindonesia.com:81/islandsun";
const LOGIN_PATH: &str = "/index.php/login";
const SEARCH_PATH: &str = "/samplerequest/getAjaxproduct/null";
const PRICE_PATH: &str = "/samplerequest/getMarketingPrice";

pub const MAX_CONCURRENCY: usize = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const OUTPUT_DIR: &str = "data";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both values must be present and non-empty.
    pub fn new(username: Option<String>, password: Option<String>) -> Result<Self, HarvestError> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Self { username, password })
            }
            _ => Err(HarvestError::MissingCredentials),
        }
    }

    pub fn from_env() -> Result<Self, HarvestError> {
        Self::new(
            std::env::var(USERNAME_VAR).ok(),
            std::env::var(PASSWORD_VAR).ok(),
        )
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub search: String,
    pub price: String,
}

impl Endpoints {
    /// Build all three endpoints against `base` (no trailing slash needed).
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            login: format!("{}{}", base, LOGIN_PATH),
            search: format!("{}{}", base, SEARCH_PATH),
            price: format!("{}{}", base, PRICE_PATH),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base(DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub max_concurrency: usize,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn new(max_concurrency: usize, timeout_secs: u64, output_dir: PathBuf) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            request_timeout: Duration::from_secs(timeout_secs),
            output_dir,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(MAX_CONCURRENCY, REQUEST_TIMEOUT_SECS, PathBuf::from(OUTPUT_DIR))
    }
}
