//! Cache settings and their loader.
//!
//! Two scalars drive the factory:
//!
//! | Key         | YAML (`cache:` section) | Environment       | Required |
//! |-------------|-------------------------|-------------------|----------|
//! | `capacity`  | `cache.capacity`        | `CACHE_CAPACITY`  | yes      |
//! | `algorithm` | `cache.algorithm`       | `CACHE_ALGORITHM` | no       |
//!
//! Environment variables override the file. `capacity` is kept raw until
//! [`CacheSettings::validate`] so that a non-numeric value surfaces as
//! [`ConfigError::NonNumericCapacity`] rather than a deserialization failure.
//! `algorithm` accepts any scalar and is read as text; a value that is not
//! `"LFU"` (a number, a boolean, a list) selects LRU and is never an error.
//!
//! ```yaml
//! cache:
//!   capacity: 100
//!   algorithm: LFU
//! ```

use std::num::NonZeroUsize;
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::builder::CachePolicy;
use crate::error::ConfigError;

/// Section of the YAML document holding the cache settings.
pub const CONFIG_SECTION: &str = "cache";

/// Prefix of the overriding environment variables.
pub const ENV_PREFIX: &str = "CACHE_";

/// Capacity exactly as written in the configuration source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCapacity {
    Number(i64),
    Text(String),
}

impl RawCapacity {
    /// Parses into a positive capacity.
    pub fn parse(&self) -> Result<NonZeroUsize, ConfigError> {
        let number = match self {
            RawCapacity::Number(n) => *n,
            RawCapacity::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::NonNumericCapacity(text.clone()))?,
        };
        usize::try_from(number)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::NonPositiveCapacity(number))
    }
}

impl From<i64> for RawCapacity {
    fn from(value: i64) -> Self {
        RawCapacity::Number(value)
    }
}

impl From<i32> for RawCapacity {
    fn from(value: i32) -> Self {
        RawCapacity::Number(value.into())
    }
}

impl From<&str> for RawCapacity {
    fn from(value: &str) -> Self {
        RawCapacity::Text(value.to_string())
    }
}

impl From<String> for RawCapacity {
    fn from(value: String) -> Self {
        RawCapacity::Text(value)
    }
}

/// `algorithm` as written; scalars keep their text, anything else is dropped.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAlgorithm {
    Text(String),
    Flag(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Other(IgnoredAny),
}

fn algorithm_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawAlgorithm::deserialize(deserializer)? {
        RawAlgorithm::Text(text) => Some(text),
        RawAlgorithm::Flag(flag) => Some(flag.to_string()),
        RawAlgorithm::Signed(n) => Some(n.to_string()),
        RawAlgorithm::Unsigned(n) => Some(n.to_string()),
        RawAlgorithm::Float(n) => Some(n.to_string()),
        RawAlgorithm::Other(_) => {
            tracing::debug!("non-scalar cache algorithm ignored");
            None
        },
    })
}

/// Unvalidated cache settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub capacity: Option<RawCapacity>,
    #[serde(default, deserialize_with = "algorithm_text")]
    pub algorithm: Option<String>,
}

/// Settings that are known to build a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedSettings {
    pub capacity: NonZeroUsize,
    pub policy: CachePolicy,
}

impl CacheSettings {
    pub fn new(capacity: impl Into<RawCapacity>, algorithm: Option<&str>) -> Self {
        Self {
            capacity: Some(capacity.into()),
            algorithm: algorithm.map(str::to_string),
        }
    }

    /// Checks the capacity and resolves the algorithm name.
    pub fn validate(&self) -> Result<ValidatedSettings, ConfigError> {
        let capacity = self
            .capacity
            .as_ref()
            .ok_or(ConfigError::MissingCapacity)?
            .parse()?;
        Ok(ValidatedSettings {
            capacity,
            policy: CachePolicy::from_name(self.algorithm.as_deref()),
        })
    }
}

/// Figment reading the `cache` section of `path`, overridden by `CACHE_*`.
///
/// A missing file contributes nothing; the environment alone may then
/// supply the settings.
pub fn sources(path: impl AsRef<Path>) -> Figment {
    Figment::from(Yaml::file(path.as_ref()))
        .focus(CONFIG_SECTION)
        .merge(Env::prefixed(ENV_PREFIX).only(&["capacity", "algorithm"]))
}

/// Loads settings from a YAML file plus environment overrides.
pub fn load(path: impl AsRef<Path>) -> Result<CacheSettings, ConfigError> {
    let path = path.as_ref();
    let settings: CacheSettings = sources(path)
        .extract()
        .map_err(|err| ConfigError::Load(Box::new(err)))?;
    tracing::debug!(path = %path.display(), ?settings, "loaded cache settings");
    Ok(settings)
}

/// Parses settings from an in-memory YAML document, without the environment.
pub fn from_yaml_str(yaml: &str) -> Result<CacheSettings, ConfigError> {
    Figment::from(Yaml::string(yaml))
        .focus(CONFIG_SECTION)
        .extract()
        .map_err(|err| ConfigError::Load(Box::new(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod capacity_parsing {
        use super::*;

        #[test]
        fn positive_numbers_and_numeric_text_parse() {
            assert_eq!(RawCapacity::from(3).parse().unwrap().get(), 3);
            assert_eq!(RawCapacity::from(" 42 ").parse().unwrap().get(), 42);
        }

        #[test]
        fn zero_and_negative_are_rejected() {
            assert_eq!(
                RawCapacity::from(0).parse().unwrap_err(),
                ConfigError::NonPositiveCapacity(0)
            );
            assert_eq!(
                RawCapacity::from("-7").parse().unwrap_err(),
                ConfigError::NonPositiveCapacity(-7)
            );
        }

        #[test]
        fn non_numeric_text_is_rejected() {
            for bad in ["", "ten", "1.5", "12abc"] {
                assert_eq!(
                    RawCapacity::from(bad).parse().unwrap_err(),
                    ConfigError::NonNumericCapacity(bad.to_string())
                );
            }
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn missing_capacity_is_fatal() {
            let settings = CacheSettings {
                capacity: None,
                algorithm: Some("LFU".into()),
            };
            assert_eq!(settings.validate().unwrap_err(), ConfigError::MissingCapacity);
        }

        #[test]
        fn algorithm_defaults_to_lru() {
            let validated = CacheSettings::new(8, None).validate().unwrap();
            assert_eq!(validated.policy, CachePolicy::Lru);
            assert_eq!(validated.capacity.get(), 8);

            let validated = CacheSettings::new(8, Some("FIFO")).validate().unwrap();
            assert_eq!(validated.policy, CachePolicy::Lru);
        }

        #[test]
        fn lfu_is_selected_by_name() {
            let validated = CacheSettings::new("16", Some("LFU")).validate().unwrap();
            assert_eq!(validated.policy, CachePolicy::Lfu);
            assert_eq!(validated.capacity.get(), 16);
        }
    }

    mod yaml {
        use super::*;

        #[test]
        fn reads_cache_section() {
            let settings = from_yaml_str("cache:\n  capacity: 100\n  algorithm: LFU\n").unwrap();
            assert_eq!(settings, CacheSettings::new(100, Some("LFU")));
        }

        #[test]
        fn quoted_capacity_stays_text_until_validated() {
            let settings = from_yaml_str("cache:\n  capacity: \"abc\"\n").unwrap();
            assert_eq!(settings.capacity, Some(RawCapacity::Text("abc".into())));
            assert_eq!(
                settings.validate().unwrap_err(),
                ConfigError::NonNumericCapacity("abc".into())
            );
        }

        #[test]
        fn non_text_algorithms_are_read_as_text() {
            for (yaml, expected) in [
                ("42", Some("42")),
                ("-3", Some("-3")),
                ("true", Some("true")),
                ("1.5", Some("1.5")),
                ("[LFU]", None),
                ("{name: LFU}", None),
            ] {
                let doc = format!("cache:\n  capacity: 3\n  algorithm: {yaml}\n");
                let settings = from_yaml_str(&doc).unwrap();
                assert_eq!(settings.algorithm.as_deref(), expected, "algorithm: {yaml}");
                assert_eq!(settings.validate().unwrap().policy, CachePolicy::Lru);
            }
        }

        #[test]
        fn missing_section_yields_empty_settings() {
            let settings = from_yaml_str("server:\n  port: 8080\n").unwrap();
            assert_eq!(settings, CacheSettings::default());
        }

        #[test]
        fn malformed_yaml_is_a_load_error() {
            let err = from_yaml_str("cache: [unterminated").unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)));
        }
    }
}
