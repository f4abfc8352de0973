use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::entities::GeoLocation;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub metrics_port: u16,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub event_bus_capacity: usize,
    /// Fix reported by the technician's device when going online
    pub technician_gps: Option<GeoLocation>,
    pub dispatch: DispatchConfig,
}

/// What happens to a job whose offer the technician declines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclinePolicy {
    /// Back to SEARCHING with a fresh offer timer
    Requeue,
    /// Back to SEARCHING, then dropped from the active slot
    Discard,
}

impl FromStr for DeclinePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requeue" => Ok(DeclinePolicy::Requeue),
            "discard" => Ok(DeclinePolicy::Discard),
            other => Err(ConfigError::InvalidDeclinePolicy(other.to_string())),
        }
    }
}

/// Engine tuning; defaults are the reference values
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    pub offer_delay: Duration,
    pub tracking_tick: Duration,
    pub step_fraction: f64,
    pub arrival_threshold_deg: f64,
    pub km_per_degree: f64,
    pub average_speed_kmh: f64,
    pub technician_start_jitter_deg: f64,
    pub default_location: GeoLocation,
    pub technician_id: String,
    pub decline_policy: DeclinePolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            offer_delay: Duration::from_millis(3000),
            tracking_tick: Duration::from_millis(1000),
            step_fraction: 0.05,
            arrival_threshold_deg: 0.0005,
            km_per_degree: 111.0,
            average_speed_kmh: 20.0,
            technician_start_jitter_deg: 0.005,
            default_location: GeoLocation::new(31.5102, 74.3441),
            technician_id: "tech_001".to_string(),
            decline_policy: DeclinePolicy::Requeue,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DispatchConfig::default();

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let metrics_port = lookup("METRICS_PORT")
            .unwrap_or_else(|| "9000".to_string())
            .parse()
            .unwrap_or(9000);

        let otel_exporter_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT");

        let service_name = lookup("SERVICE_NAME").unwrap_or_else(|| "fixdispatch".to_string());

        let event_bus_capacity = parse_or(&lookup, "EVENT_BUS_CAPACITY", 1000usize)?;
        if event_bus_capacity == 0 {
            return Err(ConfigError::MustBePositive("EVENT_BUS_CAPACITY"));
        }

        let technician_gps = match (lookup("TECHNICIAN_GPS_LAT"), lookup("TECHNICIAN_GPS_LNG")) {
            (Some(lat), Some(lng)) => Some(GeoLocation::new(
                parse_finite("TECHNICIAN_GPS_LAT", &lat)?,
                parse_finite("TECHNICIAN_GPS_LNG", &lng)?,
            )),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTechnicianGps),
        };

        let step_fraction = parse_or(&lookup, "TRACKING_STEP_FRACTION", defaults.step_fraction)?;
        if !(step_fraction > 0.0 && step_fraction <= 1.0) {
            return Err(ConfigError::InvalidStepFraction(step_fraction));
        }

        let decline_policy = match lookup("DECLINE_POLICY") {
            Some(raw) => raw.parse()?,
            None => defaults.decline_policy,
        };

        let dispatch = DispatchConfig {
            offer_delay: millis_or(&lookup, "OFFER_DELAY_MS", defaults.offer_delay)?,
            tracking_tick: millis_or(&lookup, "TRACKING_TICK_MS", defaults.tracking_tick)?,
            step_fraction,
            arrival_threshold_deg: non_negative_or(
                &lookup,
                "ARRIVAL_THRESHOLD_DEG",
                defaults.arrival_threshold_deg,
            )?,
            km_per_degree: non_negative_or(&lookup, "KM_PER_DEGREE", defaults.km_per_degree)?,
            average_speed_kmh: non_negative_or(
                &lookup,
                "AVERAGE_SPEED_KMH",
                defaults.average_speed_kmh,
            )?,
            technician_start_jitter_deg: non_negative_or(
                &lookup,
                "TECHNICIAN_START_JITTER_DEG",
                defaults.technician_start_jitter_deg,
            )?,
            default_location: GeoLocation::new(
                finite_or(&lookup, "DEFAULT_LAT", defaults.default_location.lat)?,
                finite_or(&lookup, "DEFAULT_LNG", defaults.default_location.lng)?,
            ),
            technician_id: lookup("TECHNICIAN_ID").unwrap_or(defaults.technician_id),
            decline_policy,
        };

        Ok(Config {
            server_host,
            server_port,
            metrics_port,
            otel_exporter_endpoint,
            service_name,
            event_bus_capacity,
            technician_gps,
            dispatch,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

/// Millisecond duration that must be non-zero
fn millis_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let millis = match lookup(key) {
        Some(raw) => parse_value::<u64>(key, &raw)?,
        None => return Ok(default),
    };
    if millis == 0 {
        return Err(ConfigError::MustBePositive(key));
    }
    Ok(Duration::from_millis(millis))
}

fn finite_or<F>(lookup: &F, key: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_finite(key, &raw),
        None => Ok(default),
    }
}

fn non_negative_or<F>(lookup: &F, key: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = finite_or(lookup, key, default)?;
    if value < 0.0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Rejects NaN and infinities, which `f64::from_str` accepts
fn parse_finite(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = parse_value(key, raw)?;
    if !value.is_finite() {
        return Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Unknown DECLINE_POLICY '{0}' (expected requeue or discard)")]
    InvalidDeclinePolicy(String),

    #[error("TRACKING_STEP_FRACTION must be in (0, 1], got {0}")]
    InvalidStepFraction(f64),

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("TECHNICIAN_GPS_LAT and TECHNICIAN_GPS_LNG must be set together")]
    IncompleteTechnicianGps,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_address(), "127.0.0.1:3000");
        assert_eq!(config.dispatch.offer_delay, Duration::from_secs(3));
        assert_eq!(config.dispatch.tracking_tick, Duration::from_secs(1));
        assert_eq!(config.dispatch.decline_policy, DeclinePolicy::Requeue);
        assert_eq!(config.dispatch.default_location, GeoLocation::new(31.5102, 74.3441));
        assert!(config.technician_gps.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("OFFER_DELAY_MS", "500"),
            ("DECLINE_POLICY", "Discard"),
            ("TECHNICIAN_GPS_LAT", "31.6"),
            ("TECHNICIAN_GPS_LNG", "74.4"),
            ("TECHNICIAN_ID", "tech_042"),
        ])
        .unwrap();
        assert_eq!(config.dispatch.offer_delay, Duration::from_millis(500));
        assert_eq!(config.dispatch.decline_policy, DeclinePolicy::Discard);
        assert_eq!(config.technician_gps, Some(GeoLocation::new(31.6, 74.4)));
        assert_eq!(config.dispatch.technician_id, "tech_042");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load(&[("SERVER_PORT", "http")]),
            Err(ConfigError::InvalidPort)
        ));
        assert!(matches!(
            load(&[("OFFER_DELAY_MS", "soon")]),
            Err(ConfigError::InvalidValue {
                key: "OFFER_DELAY_MS",
                ..
            })
        ));
        assert!(matches!(
            load(&[("DECLINE_POLICY", "retry")]),
            Err(ConfigError::InvalidDeclinePolicy(_))
        ));
        assert!(matches!(
            load(&[("TRACKING_STEP_FRACTION", "1.5")]),
            Err(ConfigError::InvalidStepFraction(_))
        ));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for key in [
            "TECHNICIAN_START_JITTER_DEG",
            "ARRIVAL_THRESHOLD_DEG",
            "KM_PER_DEGREE",
            "AVERAGE_SPEED_KMH",
            "DEFAULT_LAT",
            "DEFAULT_LNG",
        ] {
            for raw in ["NaN", "inf", "-inf"] {
                match load(&[(key, raw)]) {
                    Err(ConfigError::InvalidValue { key: rejected, .. }) => {
                        assert_eq!(rejected, key)
                    }
                    other => panic!("{}={} accepted: {:?}", key, raw, other.map(|_| ())),
                }
            }
        }
        assert!(matches!(
            load(&[("TRACKING_STEP_FRACTION", "NaN")]),
            Err(ConfigError::InvalidStepFraction(_))
        ));
    }

    #[test]
    fn test_negative_jitter_rejected() {
        assert!(matches!(
            load(&[("TECHNICIAN_START_JITTER_DEG", "-0.01")]),
            Err(ConfigError::InvalidValue {
                key: "TECHNICIAN_START_JITTER_DEG",
                ..
            })
        ));
        let config = load(&[("TECHNICIAN_START_JITTER_DEG", "0")]).unwrap();
        assert_eq!(config.dispatch.technician_start_jitter_deg, 0.0);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(matches!(
            load(&[("EVENT_BUS_CAPACITY", "0")]),
            Err(ConfigError::MustBePositive("EVENT_BUS_CAPACITY"))
        ));
        assert!(matches!(
            load(&[("TRACKING_TICK_MS", "0")]),
            Err(ConfigError::MustBePositive("TRACKING_TICK_MS"))
        ));
        assert!(matches!(
            load(&[("OFFER_DELAY_MS", "0")]),
            Err(ConfigError::MustBePositive("OFFER_DELAY_MS"))
        ));
    }

    #[test]
    fn test_technician_gps_needs_both_coordinates() {
        assert!(matches!(
            load(&[("TECHNICIAN_GPS_LAT", "31.6")]),
            Err(ConfigError::IncompleteTechnicianGps)
        ));
        assert!(matches!(
            load(&[("TECHNICIAN_GPS_LNG", "74.4")]),
            Err(ConfigError::IncompleteTechnicianGps)
        ));
        assert!(matches!(
            load(&[("TECHNICIAN_GPS_LAT", "NaN"), ("TECHNICIAN_GPS_LNG", "74.4")]),
            Err(ConfigError::InvalidValue {
                key: "TECHNICIAN_GPS_LAT",
                ..
            })
        ));
    }
}
