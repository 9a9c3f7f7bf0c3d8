//! # Physics Configuration
//!
//! Tuning knobs for the collision core in a single serializable structure.
//! Values are loadable from TOML so a game can ship different tuning per
//! platform without recompiling.

use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// Configuration trait for serializable settings types
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a TOML file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to a TOML file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        if !path.ends_with(".toml") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// # Physics Core Configuration
///
/// All tunable constants used by body stepping, sleep bookkeeping, and the
/// triangle tree. Defaults reproduce the shipped engine behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// World-space gravity acceleration, applied to gravity-affected bodies
    pub gravity: Vec3,

    /// Fixed simulation step in seconds
    pub time_step: f32,

    /// Seconds of inactivity before a kinetic body is put to sleep
    pub sleep_timeout: f32,

    /// Squared position delta below which motion does not count as activity
    pub motion_epsilon: f32,

    /// Half-extent of the symmetric world box bodies are clamped into
    pub world_half_extent: f32,

    /// Padding applied to degenerate bounding-box axes
    pub bounds_epsilon: f32,

    /// Subdivision budget for triangle trees; 0 builds a single leaf
    pub tree_depth: u32,

    /// Triangle count below which a tree node stops subdividing
    pub tree_leaf_size: usize,

    /// Dilation factor applied to the query box while walking the tree
    pub tree_query_dilation: f32,

    /// Scale from raw separating-axis units into positional-correction units
    pub mesh_response_scale: f32,
}

impl PhysicsConfig {
    /// Create a configuration with the shipped defaults
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -9.81),
            time_step: 1.0 / 60.0,
            sleep_timeout: 10.0,
            motion_epsilon: 1.0e-6,
            world_half_extent: 1.0e6,
            bounds_epsilon: 0.01,
            tree_depth: 0,
            tree_leaf_size: 25,
            tree_query_dilation: 1.5,
            mesh_response_scale: 0.001_65,
        }
    }

    /// Set the gravity vector
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the fixed time step in seconds
    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    /// Set the sleep timeout in seconds
    pub fn with_sleep_timeout(mut self, timeout: f32) -> Self {
        self.sleep_timeout = timeout;
        self
    }

    /// Set the triangle tree subdivision budget
    pub fn with_tree_depth(mut self, depth: u32) -> Self {
        self.tree_depth = depth;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.time_step <= 0.0 {
            return Err("Time step must be positive".to_string());
        }

        if self.sleep_timeout <= 0.0 {
            return Err("Sleep timeout must be positive".to_string());
        }

        if self.world_half_extent <= 0.0 {
            return Err("World half-extent must be positive".to_string());
        }

        if self.bounds_epsilon <= 0.0 {
            return Err("Bounds epsilon must be positive".to_string());
        }

        if self.tree_query_dilation < 1.0 {
            return Err("Tree query dilation must not shrink the query box".to_string());
        }

        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PhysicsConfig {}
