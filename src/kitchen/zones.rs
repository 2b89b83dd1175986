//! Zone registry - static rectangular task regions of the kitchen
//!
//! Zones own no entities; they are spatial predicates the interaction layer
//! queries. The whole layout is rebuilt when the viewport changes size.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::KitchenConfig;
use crate::core::types::{Rect, Vec2};

/// Width of the ingredient sidebar on the right edge
const SIDEBAR_WIDTH: f32 = 100.0;
const CUTTING_BOARD_SIZE: (f32, f32) = (100.0, 60.0);
const TRASH_SIZE: f32 = 70.0;
const READY_TABLE_WIDTH: f32 = 60.0;
const COOKING_STATION_HEIGHT: f32 = 80.0;
/// Gap between the divider and the cutting board on each side
const BOARD_GAP: f32 = 40.0;

/// Named kitchen zones
///
/// Declaration order is the iteration order used when an agent overlaps
/// several zones at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneId {
    Sidebar,
    Divider,
    CookingStation,
    CuttingBoard,
    LeftCuttingBoard,
    LeftTrash,
    RightTrash,
    ReadyTable,
}

impl ZoneId {
    pub const ALL: [ZoneId; 8] = [
        ZoneId::Sidebar,
        ZoneId::Divider,
        ZoneId::CookingStation,
        ZoneId::CuttingBoard,
        ZoneId::LeftCuttingBoard,
        ZoneId::LeftTrash,
        ZoneId::RightTrash,
        ZoneId::ReadyTable,
    ];

    pub fn is_cutting_board(&self) -> bool {
        matches!(self, ZoneId::CuttingBoard | ZoneId::LeftCuttingBoard)
    }

    pub fn is_trash(&self) -> bool {
        matches!(self, ZoneId::LeftTrash | ZoneId::RightTrash)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZoneId::Sidebar => "sidebar",
            ZoneId::Divider => "divider",
            ZoneId::CookingStation => "cookingStation",
            ZoneId::CuttingBoard => "cuttingBoard",
            ZoneId::LeftCuttingBoard => "leftCuttingBoard",
            ZoneId::LeftTrash => "leftTrash",
            ZoneId::RightTrash => "rightTrash",
            ZoneId::ReadyTable => "readyTable",
        }
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lay out every zone for a viewport.
///
/// The Chef works the left half (ready table, cooking station, left board,
/// left trash); the SousChef works the right half (cutting board, right
/// trash) next to the ingredient sidebar.
pub fn create_zones(
    width: f32,
    height: f32,
    divider_width: f32,
    divider_x: f32,
) -> AHashMap<ZoneId, Rect> {
    let left_span = divider_x;
    let right_start = divider_x + divider_width;
    let right_span = (width - SIDEBAR_WIDTH - right_start).max(0.0);
    let board_y = height * 0.5 - CUTTING_BOARD_SIZE.1 / 2.0;

    let mut zones = AHashMap::with_capacity(ZoneId::ALL.len());
    zones.insert(ZoneId::Sidebar, Rect::new(width - SIDEBAR_WIDTH, 0.0, SIDEBAR_WIDTH, height));
    zones.insert(ZoneId::Divider, Rect::new(divider_x, 0.0, divider_width, height));
    zones.insert(
        ZoneId::CookingStation,
        Rect::new(left_span * 0.4, 0.0, left_span * 0.3, COOKING_STATION_HEIGHT),
    );
    zones.insert(
        ZoneId::CuttingBoard,
        Rect::new(right_start + BOARD_GAP, board_y, CUTTING_BOARD_SIZE.0, CUTTING_BOARD_SIZE.1),
    );
    zones.insert(
        ZoneId::LeftCuttingBoard,
        Rect::new(
            divider_x - BOARD_GAP - CUTTING_BOARD_SIZE.0,
            board_y,
            CUTTING_BOARD_SIZE.0,
            CUTTING_BOARD_SIZE.1,
        ),
    );
    zones.insert(
        ZoneId::LeftTrash,
        Rect::new(left_span * 0.4, height - TRASH_SIZE, TRASH_SIZE, TRASH_SIZE),
    );
    zones.insert(
        ZoneId::RightTrash,
        Rect::new(right_start + right_span / 2.0, height - TRASH_SIZE, TRASH_SIZE, TRASH_SIZE),
    );
    zones.insert(
        ZoneId::ReadyTable,
        Rect::new(0.0, height * 0.35, READY_TABLE_WIDTH, height * 0.3),
    );
    zones
}

/// Owned zone layout plus the proximity radii used to query it
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: AHashMap<ZoneId, Rect>,
    width: f32,
    height: f32,
    proximity_radius: f32,
    cutting_board_radius: f32,
}

impl ZoneRegistry {
    pub fn new(config: &KitchenConfig) -> Self {
        Self {
            zones: create_zones(
                config.viewport_width,
                config.viewport_height,
                config.divider_width,
                config.divider_x,
            ),
            width: config.viewport_width,
            height: config.viewport_height,
            proximity_radius: config.zone_proximity_radius,
            cutting_board_radius: config.cutting_board_proximity_radius,
        }
    }

    /// Rebuild the layout wholesale for a new viewport
    pub fn resize(&mut self, width: f32, height: f32, divider_width: f32, divider_x: f32) {
        self.zones = create_zones(width, height, divider_width, divider_x);
        self.width = width;
        self.height = height;
    }

    pub fn get_zone(&self, id: ZoneId) -> Option<Rect> {
        self.zones.get(&id).copied()
    }

    /// Zones in iteration (precedence) order
    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, Rect)> + '_ {
        ZoneId::ALL
            .iter()
            .filter_map(move |id| self.zones.get(id).map(|rect| (*id, *rect)))
    }

    /// Whole-viewport rectangle agents are confined to
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn proximity_radius_for(&self, zone: ZoneId) -> f32 {
        if zone.is_cutting_board() {
            self.cutting_board_radius
        } else {
            self.proximity_radius
        }
    }

    /// Rounded-rectangle proximity test.
    ///
    /// Near iff the clamped distance from `pos` to the zone rectangle is
    /// below the radius on both axes independently. Unknown zones are never
    /// near.
    pub fn is_near_zone(&self, pos: Vec2, zone: ZoneId) -> bool {
        let Some(rect) = self.get_zone(zone) else {
            return false;
        };
        let radius = self.proximity_radius_for(zone);
        let dx = (rect.x - pos.x).max(0.0).max(pos.x - rect.right());
        let dy = (rect.y - pos.y).max(0.0).max(pos.y - rect.bottom());
        dx < radius && dy < radius
    }
}
