//! Per-match configuration.
//!
//! Every field has a default, so a RON file only needs the values it
//! changes:
//!
//! ```
//! use skirmish_core::config::MatchConfig;
//!
//! let config = MatchConfig::from_ron_str("(speed: 8, seed: 42)").unwrap();
//! assert_eq!(config.speed, 8);
//! assert_eq!(config.field_size, 400);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_SPEED;
use crate::economy::STARTING_COINS;
use crate::error::{GameError, Result};
use crate::victory::timeout_ticks;

/// Setup phase length in display ticks (five minutes of display seconds).
pub const SETUP_PHASE_TICKS: u64 = 5 * 60;

/// Timeout base in display ticks (six minutes), before speed scaling.
pub const TIMEOUT_BASE_TICKS: u64 = 6 * 60;

/// Side length of the square field.
pub const FIELD_SIZE: i32 = 400;

/// Match settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Ticks per wall-clock second. Zero means [`DEFAULT_SPEED`].
    pub speed: u32,
    /// Side length of the square field.
    pub field_size: i32,
    /// Coins each player starts with.
    pub starting_coins: u32,
    /// Display ticks after which the setup phase ends on its own.
    pub setup_phase_ticks: u64,
    /// Battle timeout before speed scaling.
    pub timeout_base_ticks: u64,
    /// Seed for spawn placement.
    pub seed: u64,
}

impl MatchConfig {
    /// Parse a config from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, source_name: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| GameError::ConfigParse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        Ok(config.normalized())
    }

    /// Replace out-of-range values with their defaults.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.speed == 0 {
            self.speed = DEFAULT_SPEED;
        }
        if self.field_size <= 0 {
            self.field_size = FIELD_SIZE;
        }
        self
    }

    /// Battle timeout in display ticks at this speed.
    #[must_use]
    pub fn timeout_ticks(&self) -> u64 {
        timeout_ticks(self.timeout_base_ticks, self.speed)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            field_size: FIELD_SIZE,
            starting_coins: STARTING_COINS,
            setup_phase_ticks: SETUP_PHASE_TICKS,
            timeout_base_ticks: TIMEOUT_BASE_TICKS,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.speed, 32);
        assert_eq!(config.starting_coins, 100);
        assert_eq!(config.setup_phase_ticks, 300);
        assert_eq!(config.timeout_ticks(), 720);
    }

    #[test]
    fn test_partial_ron() {
        let config = MatchConfig::from_ron_str("(speed: 1, starting_coins: 500)").unwrap();
        assert_eq!(config.speed, 1);
        assert_eq!(config.starting_coins, 500);
        assert_eq!(config.timeout_ticks(), 360);
    }

    #[test]
    fn test_zero_speed_normalized() {
        let config = MatchConfig::from_ron_str("(speed: 0)").unwrap();
        assert_eq!(config.speed, DEFAULT_SPEED);
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = MatchConfig::from_ron_str("(speed: \"fast\")").unwrap_err();
        match err {
            GameError::ConfigParse { source_name, .. } => assert_eq!(source_name, "<inline>"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = MatchConfig::load("/nonexistent/match.ron").unwrap_err();
        assert!(matches!(err, GameError::ConfigIo(_)));
    }
}
