//! Index configuration.

use std::time::Duration;

/// Configuration for an [`IndirectIndex`](crate::IndirectIndex).
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Name used in log lines and error messages.
    pub name: String,

    /// Whether to log a warning for records whose extractor yields no keys.
    pub warn_on_unreachable: bool,

    /// Rebuilds slower than this are logged at warn level (zero = never).
    pub slow_rebuild_threshold: Duration,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            warn_on_unreachable: true,
            slow_rebuild_threshold: Duration::from_millis(50),
        }
    }
}

impl IndexConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default configuration with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::default().name(name)
    }

    /// Sets the index name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets whether unreachable records are logged.
    #[must_use]
    pub const fn warn_on_unreachable(mut self, value: bool) -> Self {
        self.warn_on_unreachable = value;
        self
    }

    /// Sets the slow rebuild threshold.
    #[must_use]
    pub const fn slow_rebuild_threshold(mut self, threshold: Duration) -> Self {
        self.slow_rebuild_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.name, "unnamed");
        assert!(config.warn_on_unreachable);
        assert_eq!(config.slow_rebuild_threshold, Duration::from_millis(50));
    }

    #[test]
    fn builder_pattern() {
        let config = IndexConfig::named("fuels")
            .warn_on_unreachable(false)
            .slow_rebuild_threshold(Duration::ZERO);

        assert_eq!(config.name, "fuels");
        assert!(!config.warn_on_unreachable);
        assert_eq!(config.slow_rebuild_threshold, Duration::ZERO);
    }
}
