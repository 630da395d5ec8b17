//! Stage configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults; `from_vars` accepts an explicit map for tests.

use crate::layout::LayoutMode;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default capacity of the visible roster page.
pub const DEFAULT_MAX_PARTICIPANTS_PER_PAGE: usize = 10;

/// Stage configuration.
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Capacity of the visible roster page (must be at least 1).
    pub max_participants_per_page: usize,

    /// Keep participants on the roster even when they publish no tracks.
    pub show_non_publishing_participants: bool,

    /// User-selected rendering mode.
    pub layout_mode: LayoutMode,

    /// Background image URL, passed through to the render tree untouched.
    pub background_image: Option<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            max_participants_per_page: DEFAULT_MAX_PARTICIPANTS_PER_PAGE,
            show_non_publishing_participants: false,
            layout_mode: LayoutMode::Grid,
            background_image: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A recognized variable carried a value that cannot be used.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl StageConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let max_participants_per_page = vars
            .get("STAGE_MAX_PARTICIPANTS_PER_PAGE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_PARTICIPANTS_PER_PAGE);

        if max_participants_per_page == 0 {
            return Err(ConfigError::InvalidValue(
                "STAGE_MAX_PARTICIPANTS_PER_PAGE must be at least 1".to_string(),
            ));
        }

        let show_non_publishing_participants = vars
            .get("STAGE_SHOW_NON_PUBLISHING")
            .map(|s| matches!(s.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);

        let layout_mode = match vars.get("STAGE_LAYOUT_MODE") {
            Some(value) => value.parse().map_err(ConfigError::InvalidValue)?,
            None => LayoutMode::Grid,
        };

        let background_image = vars.get("STAGE_BACKGROUND_IMAGE").cloned();

        Ok(StageConfig {
            max_participants_per_page,
            show_non_publishing_participants,
            layout_mode,
            background_image,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_defaults() {
        let config = StageConfig::from_vars(&HashMap::new()).expect("defaults should load");

        assert_eq!(
            config.max_participants_per_page,
            DEFAULT_MAX_PARTICIPANTS_PER_PAGE
        );
        assert!(!config.show_non_publishing_participants);
        assert_eq!(config.layout_mode, LayoutMode::Grid);
        assert!(config.background_image.is_none());
    }

    #[test]
    fn test_from_vars_custom_values() {
        let vars = HashMap::from([
            ("STAGE_MAX_PARTICIPANTS_PER_PAGE".to_string(), "6".to_string()),
            ("STAGE_SHOW_NON_PUBLISHING".to_string(), "true".to_string()),
            ("STAGE_LAYOUT_MODE".to_string(), "speaker".to_string()),
            (
                "STAGE_BACKGROUND_IMAGE".to_string(),
                "https://example.com/bg.png".to_string(),
            ),
        ]);

        let config = StageConfig::from_vars(&vars).expect("config should load");

        assert_eq!(config.max_participants_per_page, 6);
        assert!(config.show_non_publishing_participants);
        assert_eq!(config.layout_mode, LayoutMode::SpeakerFocus);
        assert_eq!(
            config.background_image.as_deref(),
            Some("https://example.com/bg.png")
        );
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let vars = HashMap::from([(
            "STAGE_MAX_PARTICIPANTS_PER_PAGE".to_string(),
            "0".to_string(),
        )]);

        let result = StageConfig::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_unknown_layout_mode_rejected() {
        let vars = HashMap::from([("STAGE_LAYOUT_MODE".to_string(), "mosaic".to_string())]);

        let result = StageConfig::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_unparseable_page_size_falls_back_to_default() {
        let vars = HashMap::from([(
            "STAGE_MAX_PARTICIPANTS_PER_PAGE".to_string(),
            "plenty".to_string(),
        )]);

        let config = StageConfig::from_vars(&vars).expect("config should load");
        assert_eq!(
            config.max_participants_per_page,
            DEFAULT_MAX_PARTICIPANTS_PER_PAGE
        );
    }
}
