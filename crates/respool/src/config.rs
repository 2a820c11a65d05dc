//! Pool configuration.

use std::time::Duration;

use crate::error::PoolError;

/// Configuration for the resource pool.
///
/// This struct is marked `#[non_exhaustive]` to allow adding new fields
/// in future minor versions without breaking changes. Use the builder
/// pattern methods or [`Default::default()`] to construct instances.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PoolConfig {
    /// Maximum number of resources the pool may hold, idle and in use combined.
    pub max_size: usize,

    /// Time to wait for a resource before failing with `Exhausted`.
    pub acquire_timeout: Duration,

    /// Time a resource can sit idle before the reaper destroys it.
    pub idle_timeout: Duration,

    /// Maximum lifetime of a resource, regardless of use.
    pub max_lifetime: Option<Duration>,

    /// Period of the background idle reaper. `None` disables the task;
    /// sweeps can still be run with [`Pool::reap_idle`](crate::Pool::reap_idle).
    pub reap_interval: Option<Duration>,

    /// Whether to validate idle resources through the factory on checkout.
    pub test_on_checkout: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Some(Duration::from_secs(1800)),
            reap_interval: Some(Duration::from_secs(30)),
            test_on_checkout: true,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of resources.
    #[must_use]
    pub fn max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Set the default acquisition timeout.
    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the maximum resource lifetime. `None` keeps resources forever.
    #[must_use]
    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Set the reaper period. `None` disables the background reaper.
    #[must_use]
    pub fn reap_interval(mut self, interval: Option<Duration>) -> Self {
        self.reap_interval = interval;
        self
    }

    /// Enable or disable validation on checkout.
    #[must_use]
    pub fn test_on_checkout(mut self, enabled: bool) -> Self {
        self.test_on_checkout = enabled;
        self
    }

    /// Parse a configuration from a `key=value;key=value` properties string.
    ///
    /// Recognized keys (case-insensitive):
    ///
    /// | Key | Value |
    /// |-----|-------|
    /// | `max-size` | positive integer |
    /// | `acquire-timeout` | duration |
    /// | `idle-timeout` | duration |
    /// | `max-lifetime` | duration, or `none` |
    /// | `reap-interval` | duration, or `none` |
    /// | `test-on-checkout` | `true`/`false`/`yes`/`no`/`1`/`0` |
    ///
    /// Durations are whole seconds unless suffixed with `ms` or `s`.
    /// Keys not listed are rejected. The result is validated.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use respool::PoolConfig;
    ///
    /// let config = PoolConfig::from_properties("max-size=5;idle-timeout=2").unwrap();
    /// assert_eq!(config.max_size, 5);
    /// assert_eq!(config.idle_timeout, Duration::from_secs(2));
    /// ```
    pub fn from_properties(props: &str) -> Result<Self, PoolError> {
        let mut config = Self::default();

        for part in props.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| PoolError::Configuration(format!("invalid key-value: {part}")))?;

            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "max-size" | "max_size" => {
                    config.max_size = value.parse().map_err(|_| {
                        PoolError::Configuration(format!("invalid max-size: {value}"))
                    })?;
                }
                "acquire-timeout" | "acquire_timeout" => {
                    config.acquire_timeout = parse_duration(value)?;
                }
                "idle-timeout" | "idle_timeout" => {
                    config.idle_timeout = parse_duration(value)?;
                }
                "max-lifetime" | "max_lifetime" => {
                    config.max_lifetime = parse_optional_duration(value)?;
                }
                "reap-interval" | "reap_interval" => {
                    config.reap_interval = parse_optional_duration(value)?;
                }
                "test-on-checkout" | "test_on_checkout" => {
                    config.test_on_checkout = parse_bool(value)?;
                }
                _ => {
                    return Err(PoolError::Configuration(format!(
                        "unknown pool property: {key}"
                    )));
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_size == 0 {
            return Err(PoolError::Configuration(
                "max_size must be greater than 0".into(),
            ));
        }
        if self.reap_interval.is_some_and(|d| d.is_zero()) {
            return Err(PoolError::Configuration(
                "reap_interval must be greater than 0".into(),
            ));
        }
        if self.max_lifetime.is_some_and(|d| d.is_zero()) {
            return Err(PoolError::Configuration(
                "max_lifetime must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn parse_duration(value: &str) -> Result<Duration, PoolError> {
    let invalid = || PoolError::Configuration(format!("invalid duration: {value}"));

    if let Some(ms) = value.strip_suffix("ms") {
        return ms.trim().parse().map(Duration::from_millis).map_err(|_| invalid());
    }
    let secs = value.strip_suffix('s').unwrap_or(value);
    secs.trim().parse().map(Duration::from_secs).map_err(|_| invalid())
}

fn parse_optional_duration(value: &str) -> Result<Option<Duration>, PoolError> {
    if value.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        parse_duration(value).map(Some)
    }
}

fn parse_bool(value: &str) -> Result<bool, PoolError> {
    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") || value == "1" {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no") || value == "0"
    {
        Ok(false)
    } else {
        Err(PoolError::Configuration(format!("invalid boolean: {value}")))
    }
}
