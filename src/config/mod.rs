use anyhow::Error;
use chrono::TimeDelta;
use confique::Config;
use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};
use thiserror::Error as ThisError;

use crate::datamodel::{EnergyUnit, Scale, ScaleError};

#[derive(Debug, Config)]
pub struct VueSyncConfig {
    /// VictoriaMetrics address, `host:port` or a URL.
    #[config(env = "VUESYNC_DESTINATION", default = "localhost:8428")]
    pub destination: String,

    #[config(env = "VUESYNC_LOOKBACK", default = "10d")]
    pub lookback: String,

    #[config(env = "VUESYNC_SCALE", default = "1MIN")]
    pub scale: String,

    #[config(env = "VUESYNC_ENERGY_UNIT", default = "KilowattHours")]
    pub energy_unit: String,

    #[config(env = "VUESYNC_FLUSH_THRESHOLD", default = 1000)]
    pub flush_threshold: usize,

    #[config(env = "VUESYNC_RATE_LIMIT_PER_SECOND", default = 10.0)]
    pub rate_limit_per_second: f64,

    #[config(env = "VUESYNC_HTTP_TIMEOUT_SECONDS", default = 30)]
    pub http_timeout_seconds: u64,

    #[config(env = "VUESYNC_API_BASE_URL", default = "https://api.emporiaenergy.com/")]
    pub api_base_url: String,

    #[config(env = "VUESYNC_COGNITO_REGION", default = "us-east-2")]
    pub cognito_region: String,

    #[config(env = "VUESYNC_COGNITO_CLIENT_ID", default = "4qte47jbstod8apnfic0bunmrq")]
    pub cognito_client_id: String,

    /// Defaults to `auth.json` in the user configuration directory.
    #[config(env = "VUESYNC_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    #[config(env = "VUESYNC_USERNAME")]
    pub username: Option<String>,

    #[config(env = "VUESYNC_PASSWORD")]
    pub password: Option<String>,

    #[config(env = "VUESYNC_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

#[derive(ThisError, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid lookback {0:?}, expected something like 10d or 1h30m")]
    InvalidLookback(String),

    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error("{0}")]
    EnergyUnit(String),
}

impl VueSyncConfig {
    pub fn load() -> Result<VueSyncConfig, Error> {
        let c = VueSyncConfig::builder()
            .env()
            .file("settings.toml")
            .load()?;

        Ok(c)
    }

    pub fn parse_lookback(&self) -> Result<TimeDelta, ConfigError> {
        parse_lookback(&self.lookback)
    }

    pub fn parse_scale(&self) -> Result<Scale, ConfigError> {
        Ok(self.scale.parse::<Scale>()?)
    }

    pub fn parse_energy_unit(&self) -> Result<EnergyUnit, ConfigError> {
        self.energy_unit
            .parse::<EnergyUnit>()
            .map_err(ConfigError::EnergyUnit)
    }
}

/// Parses durations such as `10d`, `240h`, `1h30m` or `2w`.
///
/// Any unit `humantime` understands is accepted, a day being 24 hours. The
/// result must be positive.
pub fn parse_lookback(input: &str) -> Result<TimeDelta, ConfigError> {
    let invalid = || ConfigError::InvalidLookback(input.to_string());
    let duration = humantime::parse_duration(input.trim()).map_err(|_| invalid())?;
    let lookback = TimeDelta::from_std(duration).map_err(|_| invalid())?;
    if lookback <= TimeDelta::zero() {
        return Err(invalid());
    }
    Ok(lookback)
}

static VUESYNC_CONFIG: OnceLock<Arc<VueSyncConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<VueSyncConfig>, Error> {
    VUESYNC_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    if VUESYNC_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = VueSyncConfig::load()?;
    VUESYNC_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_config() {
        temp_env::with_vars_unset(
            ["VUESYNC_DESTINATION", "VUESYNC_FLUSH_THRESHOLD", "VUESYNC_TOKEN_FILE"],
            || {
                let config = VueSyncConfig::load().unwrap();

                assert_eq!(config.destination, "localhost:8428");
                assert_eq!(config.flush_threshold, 1000);
                assert_eq!(config.rate_limit_per_second, 10.0);
                assert_eq!(config.parse_lookback().unwrap(), TimeDelta::days(10));
                assert_eq!(config.parse_scale().unwrap(), Scale::Minute);
                assert_eq!(
                    config.parse_energy_unit().unwrap(),
                    EnergyUnit::KilowattHours
                );
                assert_eq!(config.token_file, None);
            },
        );

        temp_env::with_vars(
            [
                ("VUESYNC_DESTINATION", Some("vm.local:9999")),
                ("VUESYNC_FLUSH_THRESHOLD", Some("250")),
                ("VUESYNC_SCALE", Some("1H")),
            ],
            || {
                let config = VueSyncConfig::load().unwrap();
                assert_eq!(config.destination, "vm.local:9999");
                assert_eq!(config.flush_threshold, 250);
                assert_eq!(config.parse_scale().unwrap(), Scale::Hour);
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_values() {
        temp_env::with_vars(
            [
                ("VUESYNC_SCALE", Some("2MIN")),
                ("VUESYNC_ENERGY_UNIT", Some("joules")),
            ],
            || {
                let config = VueSyncConfig::load().unwrap();
                assert!(matches!(
                    config.parse_scale(),
                    Err(ConfigError::Scale(ScaleError::Unknown(_)))
                ));
                assert!(matches!(
                    config.parse_energy_unit(),
                    Err(ConfigError::EnergyUnit(_))
                ));
            },
        );
    }

    #[test]
    fn test_parse_lookback() {
        assert_eq!(parse_lookback("10d").unwrap(), TimeDelta::days(10));
        assert_eq!(parse_lookback("240h").unwrap(), TimeDelta::hours(240));
        assert_eq!(
            parse_lookback("1h30m").unwrap(),
            TimeDelta::minutes(90)
        );
        assert_eq!(parse_lookback("2w").unwrap(), TimeDelta::days(14));
        assert_eq!(parse_lookback(" 45s ").unwrap(), TimeDelta::seconds(45));
        assert_eq!(parse_lookback("240h0m0s").unwrap(), TimeDelta::hours(240));
        assert_eq!(parse_lookback("1h 30m").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_lookback("3days").unwrap(), TimeDelta::days(3));
    }

    #[test]
    fn test_parse_lookback_errors() {
        for input in ["", "  ", "10", "d", "10x", "0s", "-1d", "1000000000000w"] {
            assert_eq!(
                parse_lookback(input),
                Err(ConfigError::InvalidLookback(input.to_string())),
                "{input:?}"
            );
        }
    }
}
