//! Storefront configuration
//!
//! Everything the core needs that is not read from the page: where the cart
//! lives, how long to wait for it, and the texts it writes into the form.

use crate::error::ConfigError;
use crate::validator::DEFAULT_MIN;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Storefront configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Storefront root the cart endpoints hang off
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Minimum fractional amount when the field carries no `min`
    pub default_min: f64,
    /// Integer quantity sent with every line change
    ///
    /// The fractional amount travels in the "Units" property; the line itself
    /// always represents one purchase.
    pub line_quantity: u32,
    /// Label of the injected update control
    pub update_label: String,
    /// Cart heading text after a successful update
    pub updated_heading: String,
}

impl StorefrontConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With storefront root
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With fallback minimum
    #[inline]
    #[must_use]
    pub fn with_default_min(mut self, min: f64) -> Self {
        self.default_min = min;
        self
    }

    /// With line quantity
    #[inline]
    #[must_use]
    pub fn with_line_quantity(mut self, quantity: u32) -> Self {
        self.line_quantity = quantity;
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` for out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - anything `from_toml_str` returns
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::invalid("base_url", e.to_string()))?;

        if !(self.default_min.is_finite() && self.default_min > 0.0) {
            return Err(ConfigError::invalid(
                "default_min",
                format!("must be a positive number, got {}", self.default_min),
            ));
        }
        if self.line_quantity == 0 {
            return Err(ConfigError::invalid("line_quantity", "must be at least 1"));
        }
        if self.update_label.trim().is_empty() {
            return Err(ConfigError::invalid("update_label", "must not be empty"));
        }
        if self.updated_heading.trim().is_empty() {
            return Err(ConfigError::invalid("updated_heading", "must not be empty"));
        }
        Ok(())
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9292/".to_string(),
            request_timeout_secs: 10,
            default_min: DEFAULT_MIN,
            line_quantity: 1,
            update_label: "Update".to_string(),
            updated_heading: "Item updated".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = StorefrontConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.line_quantity, 1);
        assert_eq!(config.update_label, "Update");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = StorefrontConfig::from_toml_str(
            r#"
            base_url = "https://cheese.example/"
            default_min = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://cheese.example/");
        assert_eq!(config.default_min, 0.25);
        assert_eq!(config.updated_heading, "Item updated");
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = StorefrontConfig::from_toml_str("line_quantity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "line_quantity", .. }));

        let err = StorefrontConfig::from_toml_str("default_min = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "default_min", .. }));

        let err = StorefrontConfig::from_toml_str(r#"base_url = "shop""#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "base_url", .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = StorefrontConfig::from_toml_str("line_quantity = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"update_label = "Save""#).unwrap();

        let config = StorefrontConfig::load(file.path()).unwrap();
        assert_eq!(config.update_label, "Save");
    }

    #[test]
    fn load_missing_file() {
        let err = StorefrontConfig::load("/nonexistent/fq.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn builder_methods() {
        let config = StorefrontConfig::new()
            .with_base_url("https://shop.example/")
            .with_timeout_secs(3)
            .with_default_min(0.5)
            .with_line_quantity(2);

        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.default_min, 0.5);
        assert_eq!(config.line_quantity, 2);
    }
}
