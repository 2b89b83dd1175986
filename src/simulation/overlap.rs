//! Interaction resolver - per-tick overlap sets
//!
//! Overlaps are a pure geometric query of an agent's interaction circle
//! against the zone rectangles and the small square around every placed
//! item and sidebar template. Sets are rebuilt from scratch every tick and
//! mean "overlapping now".

use ahash::AHashSet;
use ordered_float::OrderedFloat;

use crate::agent::{Agent, AgentId};
use crate::core::types::{ItemId, Rect, Vec2};
use crate::kitchen::ingredient::IngredientKind;
use crate::kitchen::zones::ZoneId;

/// Something an agent can grab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngredientTarget {
    /// Reusable sidebar entry
    Template(IngredientKind),
    Item(ItemId),
}

/// Interaction square around a grabbable target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngredientZone {
    pub target: IngredientTarget,
    pub zone: ZoneId,
    pub rect: Rect,
}

impl IngredientZone {
    pub fn new(target: IngredientTarget, zone: ZoneId, center: Vec2, size: f32) -> Self {
        Self { target, zone, rect: Rect::centered(center, size) }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlapSet {
    /// In zone iteration order
    pub zones: Vec<ZoneId>,
    pub ingredients: Vec<IngredientTarget>,
}

/// Which zones and ingredient zones a circle overlaps
pub fn compute_overlaps(
    center: Vec2,
    radius: f32,
    zones: impl IntoIterator<Item = (ZoneId, Rect)>,
    ingredient_zones: &[IngredientZone],
) -> OverlapSet {
    OverlapSet {
        zones: zones
            .into_iter()
            .filter(|(_, rect)| rect.overlaps_circle(center, radius))
            .map(|(id, _)| id)
            .collect(),
        ingredients: ingredient_zones
            .iter()
            .filter(|iz| iz.rect.overlaps_circle(center, radius))
            .map(|iz| iz.target)
            .collect(),
    }
}

/// Live overlap state for one agent
#[derive(Debug, Clone, Default)]
pub struct AgentOverlaps {
    pub active_zone_overlaps: Vec<ZoneId>,
    pub active_ingredient_overlaps: Vec<IngredientTarget>,
    /// Highlighted targets; cleared when the agent changes zone
    pub pulsing: AHashSet<IngredientTarget>,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionResolver {
    agents: [AgentOverlaps; 2],
}

impl InteractionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlaps(&self, agent: AgentId) -> &AgentOverlaps {
        &self.agents[agent.index()]
    }

    /// Rebuild one agent's overlap sets and update its current zone
    pub fn resolve(
        &mut self,
        agent: &mut Agent,
        zones: impl IntoIterator<Item = (ZoneId, Rect)>,
        ingredient_zones: &[IngredientZone],
    ) {
        let set = compute_overlaps(
            agent.interaction_center(),
            agent.interaction_radius,
            zones,
            ingredient_zones,
        );
        let state = &mut self.agents[agent.id.index()];

        if let Some(&first) = set.zones.first() {
            if agent.current_zone != Some(first) {
                if !state.pulsing.is_empty() {
                    tracing::trace!("{} entered {}, clearing highlights", agent.id, first);
                }
                state.pulsing.clear();
            }
            agent.current_zone = Some(first);
        }

        // Drop highlights on targets that no longer exist
        state
            .pulsing
            .retain(|target| ingredient_zones.iter().any(|iz| iz.target == *target));
        state.pulsing.extend(set.ingredients.iter().copied());

        state.active_zone_overlaps = set.zones;
        state.active_ingredient_overlaps = set.ingredients;
    }

    /// Nearest overlapped target satisfying `filter`
    pub fn nearest_target<F>(
        &self,
        agent: &Agent,
        ingredient_zones: &[IngredientZone],
        mut filter: F,
    ) -> Option<IngredientTarget>
    where
        F: FnMut(&IngredientZone) -> bool,
    {
        let active = &self.agents[agent.id.index()].active_ingredient_overlaps;
        let center = agent.interaction_center();
        ingredient_zones
            .iter()
            .filter(|iz| active.contains(&iz.target) && filter(iz))
            .min_by_key(|iz| OrderedFloat(iz.rect.center().distance(&center)))
            .map(|iz| iz.target)
    }

    pub fn clear(&mut self) {
        self.agents = Default::default();
    }
}
