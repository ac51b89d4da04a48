//! Engine configuration
//!
//! Every tunable of the ranking and experiment pipeline is an explicit
//! config field with a compiled default; nothing is hard-coded at use sites.
//! Loading resolves the config file with the usual priority order
//! (CLI arg > `CDX_CONFIG` env var > per-user config dir), and a missing
//! file means compiled defaults.

use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Recommendation engine tunables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecConfig {
    /// Result list length after ranking
    pub top_k: usize,

    /// Share of sessions assigned to Strategy A, in basis points of 10000.
    /// 5000 = 50/50 split.
    pub split_basis_points: u16,

    /// Strategy A: boost per matching requested genre
    pub w_genre: f64,

    /// Strategy A: cap on counted genre matches, so a long requested genre
    /// list cannot run the score away
    pub genre_boost_cap: u32,

    /// Strategy A: boost when any requested cast name matches
    pub w_cast: f64,

    /// Strategy A: boost per matching vibe tag
    pub w_vibe: f64,

    /// Strategy B: secondary boost per matching genre on top of cosine
    pub sim_genre_boost: f64,

    /// Strategy B: secondary boost when any requested cast name matches
    pub sim_cast_boost: f64,

    /// Minimum release year for queries asking for "recent" content.
    /// A fixed year rather than clock arithmetic keeps interpretation
    /// deterministic.
    pub recent_min_year: i32,

    /// Live event bus buffer per subscriber
    pub event_bus_capacity: usize,

    /// Durable event store location; `None` selects the in-memory store
    pub event_db_path: Option<PathBuf>,
}

impl Default for RecConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            split_basis_points: 5000,
            w_genre: 0.5,
            genre_boost_cap: 3,
            w_cast: 0.3,
            w_vibe: 0.4,
            sim_genre_boost: 0.3,
            sim_cast_boost: 0.2,
            recent_min_year: 2020,
            event_bus_capacity: 256,
            event_db_path: None,
        }
    }
}

impl RecConfig {
    /// Load configuration, falling back to compiled defaults when no config
    /// file resolves
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let config = match cdx_common::config::resolve_config_file(cli_path, "CDX_CONFIG", "cdx")
        {
            Some(path) => cdx_common::config::load_toml::<RecConfig>(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate ranges; called on load and on engine construction
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(crate::Error::Config("top_k must be at least 1".to_string()));
        }
        if self.split_basis_points > 10_000 {
            return Err(crate::Error::Config(format!(
                "split_basis_points must be <= 10000, got {}",
                self.split_basis_points
            )));
        }
        for (name, value) in [
            ("w_genre", self.w_genre),
            ("w_cast", self.w_cast),
            ("w_vibe", self.w_vibe),
            ("sim_genre_boost", self.sim_genre_boost),
            ("sim_cast_boost", self.sim_cast_boost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(crate::Error::Config(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RecConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 10);
        assert_eq!(config.split_basis_points, 5000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RecConfig = toml::from_str("top_k = 5\nw_genre = 1.5").unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.w_genre, 1.5);
        assert_eq!(config.split_basis_points, 5000);
        assert_eq!(config.genre_boost_cap, 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RecConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.top_k = 10;
        config.split_basis_points = 10_001;
        assert!(config.validate().is_err());

        config.split_basis_points = 5000;
        config.w_cast = -0.1;
        assert!(config.validate().is_err());
    }
}
