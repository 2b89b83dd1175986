//! Agents - the two player-controlled characters
//!
//! Identity is an explicit tag on the value ([`AgentId`]), never inferred by
//! comparing references. The division of labour between the two agents is
//! encoded in [`AgentId::can_pick_up_from`] and [`AgentId::can_drop_at`].

use serde::{Deserialize, Serialize};

use crate::core::config::KitchenConfig;
use crate::core::types::{ItemId, Rect, Vec2};
use crate::kitchen::zones::ZoneId;

/// Which character an agent is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    /// Preps, assembles and delivers. May interact with every zone.
    Chef,
    /// Fetches and cuts. Limited to the sidebar, divider, its cutting board
    /// and the right trash bin.
    SousChef,
}

impl AgentId {
    /// Fixed processing order within a tick
    pub const ALL: [AgentId; 2] = [AgentId::Chef, AgentId::SousChef];

    /// Stable array index (Chef = 0, SousChef = 1)
    pub fn index(&self) -> usize {
        match self {
            AgentId::Chef => 0,
            AgentId::SousChef => 1,
        }
    }

    pub fn can_pick_up_from(&self, zone: ZoneId) -> bool {
        match self {
            AgentId::Chef => true,
            AgentId::SousChef => matches!(zone, ZoneId::Sidebar | ZoneId::Divider),
        }
    }

    pub fn can_drop_at(&self, zone: ZoneId) -> bool {
        match self {
            AgentId::Chef => matches!(
                zone,
                ZoneId::Divider
                    | ZoneId::CookingStation
                    | ZoneId::CuttingBoard
                    | ZoneId::LeftCuttingBoard
                    | ZoneId::LeftTrash
                    | ZoneId::ReadyTable
            ),
            AgentId::SousChef => {
                matches!(zone, ZoneId::Divider | ZoneId::RightTrash | ZoneId::CuttingBoard)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AgentId::Chef => "chef",
            AgentId::SousChef => "sousChef",
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which of the four directional keys are currently down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Key names bound to an agent's four directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub up: &'static str,
    pub down: &'static str,
    pub left: &'static str,
    pub right: &'static str,
}

impl KeyBindings {
    pub fn for_agent(id: AgentId) -> Self {
        match id {
            AgentId::Chef => Self { up: "w", down: "s", left: "a", right: "d" },
            AgentId::SousChef => Self {
                up: "up",
                down: "down",
                left: "left",
                right: "right",
            },
        }
    }

    /// Translate a set of pressed key names into movement state
    pub fn resolve<S: AsRef<str>>(&self, pressed: &[S]) -> MovementKeys {
        let is_down = |key: &str| pressed.iter().any(|p| p.as_ref().eq_ignore_ascii_case(key));
        MovementKeys {
            up: is_down(self.up),
            down: is_down(self.down),
            left: is_down(self.left),
            right: is_down(self.right),
        }
    }
}

/// One controllable character
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    /// Body centre; also the centre of the interaction circle
    pub position: Vec2,
    pub velocity: Vec2,
    /// Sprite size (width, height), only used to anchor held items
    pub display_size: (f32, f32),
    pub interaction_radius: f32,
    pub bindings: KeyBindings,
    /// At most one item, exclusively owned while held
    pub held: Option<ItemId>,
    /// Zone the agent is currently considered "in"
    pub current_zone: Option<ZoneId>,
    speed: f32,
}

impl Agent {
    pub fn new(id: AgentId, position: Vec2, config: &KitchenConfig) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::default(),
            display_size: (config.agent_display_width, config.agent_display_height),
            interaction_radius: config.interaction_radius,
            bindings: KeyBindings::for_agent(id),
            held: None,
            current_zone: None,
            speed: config.agent_speed,
        }
    }

    /// Starting position: middle of the agent's half of the kitchen
    pub fn spawn_point(id: AgentId, config: &KitchenConfig) -> Vec2 {
        let y = config.viewport_height / 2.0;
        match id {
            AgentId::Chef => Vec2::new(config.divider_x / 2.0, y),
            AgentId::SousChef => {
                let right_start = config.divider_x + config.divider_width;
                Vec2::new(right_start + (config.viewport_width - right_start) / 3.0, y)
            }
        }
    }

    /// Set velocity from the directional keys.
    ///
    /// No cancellation for opposite keys: each axis is last-write-wins, so
    /// down beats up and right beats left.
    pub fn handle_movement(&mut self, keys: MovementKeys) {
        self.velocity = Vec2::default();

        if keys.up {
            self.velocity.y = -self.speed;
        }
        if keys.down {
            self.velocity.y = self.speed;
        }
        if keys.left {
            self.velocity.x = -self.speed;
        }
        if keys.right {
            self.velocity.x = self.speed;
        }
    }

    /// Integrate velocity over `dt_secs` and keep the body inside `bounds`
    pub fn step(&mut self, dt_secs: f32, bounds: Rect) {
        self.position = bounds.clamp_point(self.position + self.velocity * dt_secs);
    }

    pub fn interaction_center(&self) -> Vec2 {
        self.position
    }

    /// Where a held item is drawn: top-centre of the body
    pub fn held_anchor(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.y - self.display_size.1 / 2.0)
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent::new(AgentId::Chef, Vec2::new(100.0, 100.0), &KitchenConfig::default())
    }

    #[test]
    fn test_opposite_keys_last_write_wins() {
        let mut a = agent();
        a.handle_movement(MovementKeys { up: true, down: true, left: true, right: true });
        assert_eq!(a.velocity, Vec2::new(200.0, 200.0));

        a.handle_movement(MovementKeys { up: true, left: true, ..Default::default() });
        assert_eq!(a.velocity, Vec2::new(-200.0, -200.0));

        a.handle_movement(MovementKeys::default());
        assert_eq!(a.velocity, Vec2::default());
    }

    #[test]
    fn test_step_moves_and_clamps() {
        let mut a = agent();
        a.handle_movement(MovementKeys { right: true, ..Default::default() });
        a.step(0.5, Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(a.position, Vec2::new(200.0, 100.0));

        a.handle_movement(MovementKeys { up: true, ..Default::default() });
        a.step(10.0, Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(a.position.y, 0.0);
    }

    #[test]
    fn test_held_anchor_tracks_top_center() {
        let mut a = agent();
        assert_eq!(a.held_anchor(), Vec2::new(100.0, 68.0));
        a.position = Vec2::new(300.0, 400.0);
        assert_eq!(a.held_anchor(), Vec2::new(300.0, 368.0));
    }

    #[test]
    fn test_permissions_are_asymmetric() {
        for zone in ZoneId::ALL {
            assert!(AgentId::Chef.can_pick_up_from(zone));
        }
        assert!(AgentId::SousChef.can_pick_up_from(ZoneId::Sidebar));
        assert!(!AgentId::SousChef.can_pick_up_from(ZoneId::CookingStation));
        assert!(!AgentId::SousChef.can_pick_up_from(ZoneId::CuttingBoard));

        assert!(AgentId::Chef.can_drop_at(ZoneId::ReadyTable));
        assert!(AgentId::Chef.can_drop_at(ZoneId::LeftTrash));
        assert!(!AgentId::Chef.can_drop_at(ZoneId::RightTrash));
        assert!(AgentId::SousChef.can_drop_at(ZoneId::RightTrash));
        assert!(!AgentId::SousChef.can_drop_at(ZoneId::CookingStation));
        assert!(!AgentId::SousChef.can_drop_at(ZoneId::ReadyTable));
    }

    #[test]
    fn test_key_bindings_resolve() {
        let chef = KeyBindings::for_agent(AgentId::Chef);
        let keys = chef.resolve(&["W", "d", "up"]);
        assert_eq!(keys, MovementKeys { up: true, right: true, ..Default::default() });

        let sous = KeyBindings::for_agent(AgentId::SousChef);
        assert_eq!(sous.resolve(&["w"]), MovementKeys::default());
    }
}
