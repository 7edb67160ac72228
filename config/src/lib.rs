#[macro_use]
extern crate tracing;

mod args;
mod cadence;

pub use args::Args;
pub use cadence::Cadence;
use eyre::{
    eyre,
    Result,
};
use serde::{
    Deserialize,
    Deserializer,
};
use std::{
    fmt,
    path::PathBuf,
    time::Duration,
};
use url::Url;

/// WordPress.org authenticates every subsite through its central login form.
pub const DEFAULT_LOGIN_URL: &str = "https://login.wordpress.org/wp-login.php";
pub const DEFAULT_OUTPUT: &str = "output/stats.csv";
const DEFAULT_SCHEDULE: &str = "hourly";
const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
const ENV_PREFIX: &str = "WPORG_STATS";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub username: String,
    pub password: Password,
    pub site: Url,
    /// Resolved once while loading; unknown names become hourly.
    #[serde(deserialize_with = "deserialize_cadence")]
    pub schedule: Cadence,
    pub login_url: Url,
    pub output: PathBuf,
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,
}

impl Config {
    /// Layers defaults, the JSON config file, `WPORG_STATS_*` environment variables and command line overrides.
    /// The config file must exist.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let cfg: Self = config::Config::builder()
            .set_default("schedule", DEFAULT_SCHEDULE)?
            .set_default("login_url", DEFAULT_LOGIN_URL)?
            .set_default("output", DEFAULT_OUTPUT)?
            .set_default("request_timeout", DEFAULT_REQUEST_TIMEOUT)?
            .add_source(
                config::File::from(args.config.as_path())
                    .format(config::FileFormat::Json)
                    .required(true),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .add_source(args)
            .build()?
            .try_deserialize()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(eyre!("config.username must be non-empty"));
        }
        if self.password.expose().is_empty() {
            return Err(eyre!("config.password must be non-empty"));
        }
        if self.site.host_str().is_none() {
            return Err(eyre!("config.site must be an absolute URL with a host, got {}", self.site));
        }
        if self.login_url.host_str().is_none() {
            return Err(eyre!("config.login_url must be an absolute URL with a host, got {}", self.login_url));
        }
        if self.request_timeout.is_zero() {
            return Err(eyre!("config.request_timeout must be greater than zero"));
        }
        Ok(())
    }

    pub fn cadence(&self) -> Cadence {
        self.schedule
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

fn deserialize_cadence<'de, D>(deserializer: D) -> Result<Cadence, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Cadence::from_name)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    humantime::parse_duration(&value).map_err(serde::de::Error::custom)
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Password,
}

/// A password that stays out of logs and debug output.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(len = {})", self.0.len())
    }
}
