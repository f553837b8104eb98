//! Engine configuration: load-time values (weights, thresholds, algorithm
//! choice, resolution policy, timeouts, alert cooldown) plus an atomically
//! swappable holder for the reconfigure path.
//!
//! Load order mirrors the workspace's original config manager (env vars,
//! then an optional file layered on top), collapsed to two layers since
//! there is no remote archetype source for this service.

use arc_swap::ArcSwap;
use crisis_common::{Algorithm, ResolutionPolicy, SourceName};
use crisis_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Non-increasing severity thresholds: `critical >= high >= medium >= low > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            critical: 0.85,
            high: 0.70,
            medium: 0.50,
            low: 0.30,
        }
    }
}

impl SeverityThresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.low <= 0.0 {
            return Err(ConfigError::LowThresholdNotPositive(self.low));
        }
        if !(self.critical >= self.high && self.high >= self.medium && self.medium >= self.low) {
            return Err(ConfigError::ThresholdsNotMonotonic {
                critical: self.critical,
                high: self.high,
                medium: self.medium,
                low: self.low,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub weights: HashMap<SourceName, f64>,
    pub thresholds: SeverityThresholds,
    pub algorithm: Algorithm,
    pub resolution_policy: ResolutionPolicy,
    pub request_timeout_ms: u64,
    pub alert_cooldown_seconds: u64,
    pub escalation_alert_cooldown_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut weights = HashMap::new();
        weights.insert(SourceName::Primary, 0.5);
        weights.insert(SourceName::Sentiment, 0.25);
        weights.insert(SourceName::Irony, 0.15);
        weights.insert(SourceName::Emotion, 0.10);

        Self {
            weights,
            thresholds: SeverityThresholds::default(),
            algorithm: Algorithm::default(),
            resolution_policy: ResolutionPolicy::default(),
            request_timeout_ms: 500,
            alert_cooldown_seconds: 300,
            escalation_alert_cooldown_seconds: 120,
        }
    }
}

impl EngineConfig {
    /// `sum(weights) > 0` and thresholds form a non-increasing sequence
    /// `critical >= high >= medium >= low > 0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum: f64 = self.weights.values().sum();
        if sum <= 0.0 {
            return Err(ConfigError::NonPositiveWeightSum(sum));
        }
        self.thresholds.validate()
    }

    pub fn weight_for(&self, source: SourceName) -> f64 {
        self.weights.get(&source).copied().unwrap_or(0.0)
    }

    /// Load from environment variables, then layer a JSON override file
    /// (`CRISIS_ENGINE_CONFIG_PATH`) on top if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = Self::load_from_env();

        if let Some(path) = env_nonempty("CRISIS_ENGINE_CONFIG_PATH") {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ParseError(format!("reading {path}: {e}")))?;
            let overrides: EngineConfigOverride = serde_json::from_str(&raw)
                .map_err(|e| ConfigError::ParseError(format!("parsing {path}: {e}")))?;
            overrides.apply(&mut config);
        }

        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Self {
        let mut config = Self::default();

        let weight_env = |key: &str| env_nonempty(key).and_then(|s| s.parse::<f64>().ok());
        if let Some(w) = weight_env("CRISIS_WEIGHT_PRIMARY") {
            config.weights.insert(SourceName::Primary, w);
        }
        if let Some(w) = weight_env("CRISIS_WEIGHT_SENTIMENT") {
            config.weights.insert(SourceName::Sentiment, w);
        }
        if let Some(w) = weight_env("CRISIS_WEIGHT_IRONY") {
            config.weights.insert(SourceName::Irony, w);
        }
        if let Some(w) = weight_env("CRISIS_WEIGHT_EMOTION") {
            config.weights.insert(SourceName::Emotion, w);
        }

        if let Some(ms) = env_nonempty("CRISIS_REQUEST_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            config.request_timeout_ms = ms;
        }
        if let Some(s) = env_nonempty("CRISIS_ALERT_COOLDOWN_SECONDS").and_then(|s| s.parse().ok())
        {
            config.alert_cooldown_seconds = s;
        }
        if let Some(s) =
            env_nonempty("CRISIS_ESCALATION_ALERT_COOLDOWN_SECONDS").and_then(|s| s.parse().ok())
        {
            config.escalation_alert_cooldown_seconds = s;
        }

        config
    }
}

/// Partial overlay used when loading a JSON override file; only present
/// fields replace the base config's values.
#[derive(Debug, Default, Deserialize)]
struct EngineConfigOverride {
    #[serde(default)]
    weights: Option<HashMap<SourceName, f64>>,
    #[serde(default)]
    thresholds: Option<SeverityThresholds>,
    #[serde(default)]
    algorithm: Option<Algorithm>,
    #[serde(default)]
    resolution_policy: Option<ResolutionPolicy>,
    #[serde(default)]
    request_timeout_ms: Option<u64>,
    #[serde(default)]
    alert_cooldown_seconds: Option<u64>,
    #[serde(default)]
    escalation_alert_cooldown_seconds: Option<u64>,
}

impl EngineConfigOverride {
    fn apply(self, config: &mut EngineConfig) {
        if let Some(w) = self.weights {
            config.weights = w;
        }
        if let Some(t) = self.thresholds {
            config.thresholds = t;
        }
        if let Some(a) = self.algorithm {
            config.algorithm = a;
        }
        if let Some(p) = self.resolution_policy {
            config.resolution_policy = p;
        }
        if let Some(v) = self.request_timeout_ms {
            config.request_timeout_ms = v;
        }
        if let Some(v) = self.alert_cooldown_seconds {
            config.alert_cooldown_seconds = v;
        }
        if let Some(v) = self.escalation_alert_cooldown_seconds {
            config.escalation_alert_cooldown_seconds = v;
        }
    }
}

/// Atomically-swappable holder for the live `EngineConfig`.
///
/// Readers observe either the old or the new config, never a torn mix of
/// the two; `reload` rejects an invalid config and leaves the previous one
/// in place.
pub struct SharedConfig {
    inner: ArcSwap<EngineConfig>,
}

impl SharedConfig {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(config)),
        }
    }

    pub fn current(&self) -> Arc<EngineConfig> {
        self.inner.load_full()
    }

    pub fn reload(&self, new_config: EngineConfig) -> Result<(), ConfigError> {
        new_config.validate()?;
        self.inner.store(Arc::new(new_config));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_weight_sum_rejected() {
        let mut c = EngineConfig::default();
        for w in c.weights.values_mut() {
            *w = 0.0;
        }
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonPositiveWeightSum(_))
        ));
    }

    #[test]
    fn non_monotonic_thresholds_rejected() {
        let mut c = EngineConfig::default();
        c.thresholds.high = 0.95;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ThresholdsNotMonotonic { .. })
        ));
    }

    #[test]
    fn shared_config_reload_keeps_previous_on_failure() {
        let shared = SharedConfig::new(EngineConfig::default());
        let mut bad = EngineConfig::default();
        bad.thresholds.low = 0.0;
        assert!(shared.reload(bad).is_err());
        assert!(shared.current().validate().is_ok());
    }

    #[test]
    fn shared_config_reload_applies_good_config() {
        let shared = SharedConfig::new(EngineConfig::default());
        let mut good = EngineConfig::default();
        good.request_timeout_ms = 750;
        shared.reload(good).unwrap();
        assert_eq!(shared.current().request_timeout_ms, 750);
    }

    #[test]
    fn env_override_applies_to_weight() {
        std::env::set_var("CRISIS_WEIGHT_PRIMARY", "0.9");
        let config = EngineConfig::load_from_env();
        assert_eq!(config.weight_for(SourceName::Primary), 0.9);
        std::env::remove_var("CRISIS_WEIGHT_PRIMARY");
    }
}
