use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::delay::DelayThresholds;
use crate::errors::Error;
use crate::orders::Services;
use crate::stations::{RouteRule, Station};

/// Runtime settings of a kitchen display, read from `KITCHEN_*` variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KitchenConfig {
    pub poll_interval: Duration,
    /// Station whose board this display renders
    pub station: Station,
    pub finishing_station: Station,
    pub thresholds: DelayThresholds,
    pub event_capacity: usize,
    pub seed_file: Option<PathBuf>,
    /// Extra routing rules appended after the built-in keyword table
    pub extra_routes: Vec<RouteRule>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            station: Station::All,
            finishing_station: Station::Prep,
            thresholds: DelayThresholds::default(),
            event_capacity: 64,
            seed_file: None,
            extra_routes: Vec::new(),
        }
    }
}

impl KitchenConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let poll_secs: u64 =
            parse_or(&get, "KITCHEN_POLL_INTERVAL_SECS", defaults.poll_interval.as_secs())?;
        if poll_secs == 0 {
            return Err(Error::Validation {
                message: "KITCHEN_POLL_INTERVAL_SECS must be positive".to_string(),
            });
        }

        let thresholds = DelayThresholds {
            warning_minutes: parse_or(
                &get,
                "KITCHEN_WARNING_MINUTES",
                defaults.thresholds.warning_minutes,
            )?,
            bottleneck_minutes: parse_or(
                &get,
                "KITCHEN_BOTTLENECK_MINUTES",
                defaults.thresholds.bottleneck_minutes,
            )?,
            critical_minutes: parse_or(
                &get,
                "KITCHEN_CRITICAL_MINUTES",
                defaults.thresholds.critical_minutes,
            )?,
        };
        thresholds.validate()?;

        let extra_routes = match get("KITCHEN_EXTRA_ROUTES") {
            None => Vec::new(),
            Some(raw) => raw
                .split(';')
                .filter(|r| !r.trim().is_empty())
                .map(|r| {
                    r.parse::<RouteRule>().map_err(|e| Error::Validation {
                        message: format!("KITCHEN_EXTRA_ROUTES: {e}"),
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?,
        };

        Ok(Self {
            poll_interval: Duration::from_secs(poll_secs),
            station: parse_or(&get, "KITCHEN_STATION", defaults.station)?,
            finishing_station: parse_or(
                &get,
                "KITCHEN_FINISHING_STATION",
                defaults.finishing_station,
            )?,
            thresholds,
            event_capacity: parse_or(&get, "KITCHEN_EVENT_CAPACITY", defaults.event_capacity)?,
            seed_file: get("KITCHEN_SEED_FILE").map(PathBuf::from),
            extra_routes,
        })
    }

    pub fn services(&self) -> Services {
        let mut services = Services {
            finishing_station: self.finishing_station,
            ..Services::default()
        };
        for rule in &self.extra_routes {
            services.router.push_rule(rule.clone());
        }
        services
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| Error::Validation {
            message: format!("{key}={raw}: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = KitchenConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, KitchenConfig::default());
        assert_eq!(config.services().finishing_station, Station::Prep);
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = KitchenConfig::from_lookup(lookup(&[
            ("KITCHEN_POLL_INTERVAL_SECS", "10"),
            ("KITCHEN_STATION", "fry"),
            ("KITCHEN_FINISHING_STATION", "ALL"),
            ("KITCHEN_CRITICAL_MINUTES", "45"),
            ("KITCHEN_SEED_FILE", "orders.json"),
        ]))
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.station, Station::Fry);
        assert_eq!(config.finishing_station, Station::All);
        assert_eq!(config.thresholds.critical_minutes, 45);
        assert_eq!(config.thresholds.warning_minutes, 15);
        assert_eq!(config.seed_file, Some(PathBuf::from("orders.json")));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let result = KitchenConfig::from_lookup(lookup(&[("KITCHEN_STATION", "grill")]));
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = KitchenConfig::from_lookup(lookup(&[("KITCHEN_POLL_INTERVAL_SECS", "0")]));
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = KitchenConfig::from_lookup(lookup(&[("KITCHEN_WARNING_MINUTES", "40")]));
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = KitchenConfig::from_lookup(lookup(&[("KITCHEN_EXTRA_ROUTES", "GRILL:naan")]));
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_thresholds_must_escalate() {
        // bottleneck past critical
        let result = KitchenConfig::from_lookup(lookup(&[("KITCHEN_BOTTLENECK_MINUTES", "35")]));
        assert!(matches!(result, Err(Error::Validation { .. })));

        // warning past bottleneck, still below critical
        let result = KitchenConfig::from_lookup(lookup(&[("KITCHEN_WARNING_MINUTES", "25")]));
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = KitchenConfig::from_lookup(lookup(&[("KITCHEN_WARNING_MINUTES", "-5")]));
        assert!(matches!(result, Err(Error::Validation { .. })));

        let config = KitchenConfig::from_lookup(lookup(&[
            ("KITCHEN_WARNING_MINUTES", "10"),
            ("KITCHEN_BOTTLENECK_MINUTES", "10"),
        ]))
        .unwrap();
        assert_eq!(config.thresholds.bottleneck_minutes, 10);
    }

    #[test]
    fn test_extra_routes_extend_the_router() {
        let config = KitchenConfig::from_lookup(lookup(&[(
            "KITCHEN_EXTRA_ROUTES",
            "PREP:naan,roti; DESSERT:kulfi;",
        )]))
        .unwrap();
        assert_eq!(config.extra_routes.len(), 2);

        let router = config.services().router;
        assert_eq!(router.route("Garlic Naan"), Station::Prep);
        assert_eq!(router.route("Mango Kulfi"), Station::Dessert);
        // built-in rules still take precedence
        assert_eq!(router.route("Dal Roti Combo"), Station::Curry);
    }
}
