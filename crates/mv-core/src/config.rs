//! Engine configuration.
//!
//! Typically loaded from a TOML file by the application crate (see the
//! `corridor` demo) and handed to the movement engine at construction.

use crate::{MoveError, MoveResult};

/// Top-level movement-engine configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MoveConfig {
    /// Width of the environment; every LineFollower result is clamped into
    /// `[0, env_width]`.
    pub env_width: f64,

    /// Height of the environment.
    pub env_height: f64,

    /// Amplitude used by `wander` when the call gives none.  359 means
    /// "almost any direction"; 0 means "straight ahead".
    pub default_amplitude_deg: f64,

    /// Side of a grid cell for polygon discretisation.
    pub grid_cell_size: f64,

    /// Ratio between the coarse coverage partition and a grid cell.
    pub coarse_factor: usize,

    /// Route inside polygons through a triangulated corridor graph instead of
    /// a grid.
    pub triangulation: bool,

    /// Master RNG seed.  The same seed always produces identical wandering.
    pub seed: u64,

    /// Worker thread count for the `parallel` feature.  `None` uses all
    /// logical cores.
    pub parallel_threads: Option<usize>,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            env_width:             100.0,
            env_height:            100.0,
            default_amplitude_deg: 359.0,
            grid_cell_size:        1.0,
            coarse_factor:         10,
            triangulation:         false,
            seed:                  0,
            parallel_threads:      None,
        }
    }
}

impl MoveConfig {
    /// A default configuration for a `width × height` environment.
    pub fn with_env(width: f64, height: f64) -> Self {
        Self { env_width: width, env_height: height, ..Self::default() }
    }

    /// Reject extents and sizes that would make discretisation meaningless.
    pub fn validate(&self) -> MoveResult<()> {
        if !(self.env_width > 0.0 && self.env_height > 0.0) {
            return Err(MoveError::Config(format!(
                "environment extent must be positive, got {} x {}",
                self.env_width, self.env_height
            )));
        }
        if !(self.grid_cell_size > 0.0) || !self.grid_cell_size.is_finite() {
            return Err(MoveError::Config(format!(
                "grid_cell_size must be positive, got {}",
                self.grid_cell_size
            )));
        }
        if self.coarse_factor == 0 {
            return Err(MoveError::Config("coarse_factor must be at least 1".into()));
        }
        if self.parallel_threads == Some(0) {
            return Err(MoveError::Config("parallel_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.  Missing keys take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> MoveResult<Self> {
        let cfg: MoveConfig =
            toml::from_str(text).map_err(|e| MoveError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML configuration file.
    #[cfg(feature = "serde")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> MoveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
