//! Kitchen configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Any subset of the fields can be
//! overridden from a TOML file; missing keys keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{KitchenError, Result};
use crate::core::types::SimTime;

/// Configuration for one kitchen session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    // === VIEWPORT ===
    /// Width of the kitchen viewport (world units = pixels)
    pub viewport_width: f32,

    /// Height of the kitchen viewport
    pub viewport_height: f32,

    /// Width of the divider strip separating the two halves
    pub divider_width: f32,

    /// Left edge of the divider strip
    ///
    /// Defaults to centring the divider: (1280 - 40) / 2.
    pub divider_x: f32,

    // === AGENTS ===
    /// Movement speed in world units per second on each axis
    pub agent_speed: f32,

    /// Radius of the agent's interaction circle
    ///
    /// Independent of display size: a large sprite does not reach further.
    pub interaction_radius: f32,

    /// Display width of an agent sprite (only used to anchor held items)
    pub agent_display_width: f32,

    /// Display height of an agent sprite
    pub agent_display_height: f32,

    // === PROXIMITY ===
    /// Rounded-rectangle proximity radius for `is_near_zone`
    pub zone_proximity_radius: f32,

    /// Tighter proximity radius used for cutting boards
    ///
    /// Boards sit next to the divider; a smaller radius keeps an agent
    /// standing at the divider from being considered "at the board".
    pub cutting_board_proximity_radius: f32,

    /// Side of the square "ingredient zone" around each placed item or
    /// sidebar template
    pub ingredient_zone_size: f32,

    // === TIMINGS (seconds) ===
    /// Time a cut takes from drop-off to prepped ingredient
    pub cut_duration_secs: f32,

    /// Lifetime of an ingredient left in a divider slot
    pub divider_timeout_secs: f32,

    /// Time a completed meal waits at the cooking station before it spoils
    pub meal_pickup_timeout_secs: f32,

    /// Length of one round
    pub round_duration_secs: u32,

    // === SCORING ===
    /// Reward for satisfying the current recipe at the cooking station
    pub recipe_completion_points: i32,

    /// Reward for delivering a meal with no stored point value
    pub delivery_points: i32,

    /// Penalty for releasing the cut key before the cut completes
    pub cut_cancel_penalty: i32,

    /// Penalty for an ingredient expiring in a divider slot
    pub divider_timeout_penalty: i32,

    /// Penalty for a completed meal nobody picked up in time
    pub missed_meal_penalty: i32,

    /// Penalty for throwing an item in a trash bin
    pub trash_penalty: i32,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            // Viewport
            viewport_width: 1280.0,
            viewport_height: 720.0,
            divider_width: 40.0,
            divider_x: 620.0,

            // Agents
            agent_speed: 200.0,
            interaction_radius: 40.0,
            agent_display_width: 64.0,
            agent_display_height: 64.0,

            // Proximity
            zone_proximity_radius: 60.0,
            cutting_board_proximity_radius: 50.0,
            ingredient_zone_size: 40.0,

            // Timings
            cut_duration_secs: 5.0,
            divider_timeout_secs: 10.0,
            meal_pickup_timeout_secs: 15.0,
            round_duration_secs: 180,

            // Scoring
            recipe_completion_points: 50,
            delivery_points: 40,
            cut_cancel_penalty: -5,
            divider_timeout_penalty: -10,
            missed_meal_penalty: -20,
            trash_penalty: -5,
        }
    }
}

impl KitchenConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) config from a TOML string and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: KitchenConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn cut_duration(&self) -> SimTime {
        SimTime::from_secs_f32(self.cut_duration_secs)
    }

    pub fn divider_timeout(&self) -> SimTime {
        SimTime::from_secs_f32(self.divider_timeout_secs)
    }

    pub fn meal_pickup_timeout(&self) -> SimTime {
        SimTime::from_secs_f32(self.meal_pickup_timeout_secs)
    }

    pub fn round_duration(&self) -> SimTime {
        SimTime(self.round_duration_secs as u64 * 1000)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(KitchenError::InvalidConfig(format!(
                "viewport must be positive, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }

        if self.divider_width <= 0.0 {
            return Err(KitchenError::InvalidConfig(format!(
                "divider_width must be positive, got {}",
                self.divider_width
            )));
        }

        // The divider has to fit inside the viewport
        if self.divider_x < 0.0 || self.divider_x + self.divider_width > self.viewport_width {
            return Err(KitchenError::InvalidConfig(format!(
                "divider [{}, {}] lies outside viewport width {}",
                self.divider_x,
                self.divider_x + self.divider_width,
                self.viewport_width
            )));
        }

        if self.interaction_radius <= 0.0 || self.agent_speed < 0.0 {
            return Err(KitchenError::InvalidConfig(
                "interaction_radius must be positive and agent_speed non-negative".into(),
            ));
        }

        if self.cut_duration_secs <= 0.0
            || self.divider_timeout_secs <= 0.0
            || self.meal_pickup_timeout_secs <= 0.0
        {
            return Err(KitchenError::InvalidConfig("timer durations must be positive".into()));
        }

        if self.round_duration_secs == 0 {
            return Err(KitchenError::InvalidConfig("round_duration_secs must be > 0".into()));
        }

        Ok(())
    }
}
