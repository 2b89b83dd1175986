//! Ingredients and meals - the transformable units of the kitchen
//!
//! Every live item has exactly one [`Location`]: held by one agent or placed
//! in one zone. Sidebar entries are templates, not items, and are never
//! consumed.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::agent::AgentId;
use crate::core::error::KitchenError;
use crate::core::types::{ItemId, TimerId, Vec2};
use crate::kitchen::zones::ZoneId;

/// Fixed ingredient catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngredientKind {
    Tortilla,
    Cheese,
    Meat,
    Tomato,
    Avocado,
}

impl IngredientKind {
    /// Sidebar order, top to bottom
    pub const ALL: [IngredientKind; 5] = [
        IngredientKind::Tortilla,
        IngredientKind::Cheese,
        IngredientKind::Meat,
        IngredientKind::Tomato,
        IngredientKind::Avocado,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IngredientKind::Tortilla => "Tortilla",
            IngredientKind::Cheese => "Cheese",
            IngredientKind::Meat => "Meat",
            IngredientKind::Tomato => "Tomato",
            IngredientKind::Avocado => "Avocado",
        }
    }
}

impl FromStr for IngredientKind {
    type Err = KitchenError;

    /// Case-insensitive lookup by name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IngredientKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| KitchenError::UnknownIngredient(s.to_string()))
    }
}

impl std::fmt::Display for IngredientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngredientState {
    Raw,
    Prepped,
}

/// A finished dish waiting to be delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub recipe: String,
    pub result: String,
    /// Delivery value stored on the meal; `None` falls back to the default
    pub points: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Ingredient(IngredientKind),
    Meal(Meal),
}

/// Where a live item is. Exactly one variant applies at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Held(AgentId),
    Placed {
        zone: ZoneId,
        slot: Option<usize>,
        timer: Option<TimerId>,
    },
}

impl Location {
    pub fn placed(zone: ZoneId) -> Self {
        Location::Placed { zone, slot: None, timer: None }
    }

    pub fn zone(&self) -> Option<ZoneId> {
        match self {
            Location::Placed { zone, .. } => Some(*zone),
            Location::Held(_) => None,
        }
    }

    pub fn holder(&self) -> Option<AgentId> {
        match self {
            Location::Held(agent) => Some(*agent),
            Location::Placed { .. } => None,
        }
    }
}

/// A live item in the kitchen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub state: IngredientState,
    pub location: Location,
    /// On-screen anchor (slot position, station spot or agent top-centre)
    pub position: Vec2,
}

impl Item {
    pub fn name(&self) -> &str {
        match &self.kind {
            ItemKind::Ingredient(kind) => kind.name(),
            ItemKind::Meal(meal) => &meal.result,
        }
    }

    pub fn ingredient_kind(&self) -> Option<IngredientKind> {
        match self.kind {
            ItemKind::Ingredient(kind) => Some(kind),
            ItemKind::Meal(_) => None,
        }
    }

    pub fn meal(&self) -> Option<&Meal> {
        match &self.kind {
            ItemKind::Meal(meal) => Some(meal),
            ItemKind::Ingredient(_) => None,
        }
    }

    pub fn is_prepped(&self) -> bool {
        self.state == IngredientState::Prepped
    }

    /// Timer attached to a placed item, if any
    pub fn timer(&self) -> Option<TimerId> {
        match self.location {
            Location::Placed { timer, .. } => timer,
            Location::Held(_) => None,
        }
    }
}

/// Owner of every live item, keyed by id
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: AHashMap<ItemId, Item>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new raw ingredient from a sidebar template
    pub fn spawn_ingredient(&mut self, kind: IngredientKind, location: Location, position: Vec2) -> ItemId {
        self.insert(ItemKind::Ingredient(kind), IngredientState::Raw, location, position)
    }

    pub fn spawn_meal(&mut self, meal: Meal, location: Location, position: Vec2) -> ItemId {
        self.insert(ItemKind::Meal(meal), IngredientState::Prepped, location, position)
    }

    fn insert(&mut self, kind: ItemKind, state: IngredientState, location: Location, position: Vec2) -> ItemId {
        let id = ItemId::new();
        self.items.insert(id, Item { id, kind, state, location, position });
        id
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Destroy an item, returning it if it existed
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        self.items.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Items placed in a zone (unordered)
    pub fn placed_in(&self, zone: ZoneId) -> impl Iterator<Item = &Item> {
        self.items.values().filter(move |item| item.location.zone() == Some(zone))
    }

    pub fn held_by(&self, agent: AgentId) -> Option<&Item> {
        self.items.values().find(|item| item.location.holder() == Some(agent))
    }
}
