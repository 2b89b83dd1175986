//! Game session - single owner of all kitchen state
//!
//! One tick runs, in order:
//! 1. Movement (Chef then SousChef)
//! 2. Overlap recomputation for both agents
//! 3. Release / interact commands (Chef then SousChef), against this tick's
//!    overlap sets. A successful interact refreshes the agents still to act.
//! 4. Cutting deadlines and scheduled timers
//! 5. Round countdown
//!
//! Every mutation happens inside one of these steps on a single thread, so a
//! pickup and a drop on the same zone list never interleave.

use ahash::AHashMap;
use std::time::Duration;

use crate::agent::{Agent, AgentId, MovementKeys};
use crate::core::config::KitchenConfig;
use crate::core::error::Result;
use crate::core::types::{ItemId, SimTime, Vec2};
use crate::kitchen::cutting::{CuttingBoard, FinishedCut};
use crate::kitchen::divider::DividerSlots;
use crate::kitchen::ingredient::{IngredientKind, IngredientState, Item, ItemStore, Location, Meal};
use crate::kitchen::recipe::{Recipe, RecipeCatalog, RecipeManager};
use crate::kitchen::score::{ScoreLedger, ScoreReason};
use crate::kitchen::zones::{ZoneId, ZoneRegistry};
use crate::simulation::effects::{Effect, EffectSink, NullEffects};
use crate::simulation::events::{EventBus, KitchenEvent, Scene, SubscriberId};
use crate::simulation::overlap::{AgentOverlaps, IngredientTarget, IngredientZone, InteractionResolver};
use crate::simulation::timers::{TimerKind, TimerQueue};

/// Horizontal spacing of items on the cooking station
const STATION_ITEM_SPACING: f32 = 36.0;

/// Commands from one agent's input binding for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentInput {
    pub movement: MovementKeys,
    /// Edge-triggered: true only on the tick the key went down
    pub interact: bool,
    /// The cutting key was released this tick
    pub release: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub chef: AgentInput,
    pub sous_chef: AgentInput,
}

impl TickInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn interact(agent: AgentId) -> Self {
        let mut input = Self::default();
        input.agent_mut(agent).interact = true;
        input
    }

    pub fn release(agent: AgentId) -> Self {
        let mut input = Self::default();
        input.agent_mut(agent).release = true;
        input
    }

    pub fn agent(&self, agent: AgentId) -> &AgentInput {
        match agent {
            AgentId::Chef => &self.chef,
            AgentId::SousChef => &self.sous_chef,
        }
    }

    pub fn agent_mut(&mut self, agent: AgentId) -> &mut AgentInput {
        match agent {
            AgentId::Chef => &mut self.chef,
            AgentId::SousChef => &mut self.sous_chef,
        }
    }
}

/// What an interaction did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractOutcome {
    PickedUp { item: ItemId, zone: ZoneId },
    Dropped { item: ItemId, zone: ZoneId },
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    NotStarted,
    Running,
    Over,
}

pub struct GameSession {
    config: KitchenConfig,
    zones: ZoneRegistry,
    agents: [Agent; 2],
    items: ItemStore,
    /// Ordered placed-lists for the divider, cooking station and boards
    placed: AHashMap<ZoneId, Vec<ItemId>>,
    /// Completed meals waiting at the cooking station
    ready_meals: Vec<ItemId>,
    divider: DividerSlots,
    boards: [CuttingBoard; 2],
    recipes: RecipeManager,
    score: ScoreLedger,
    timers: TimerQueue,
    events: EventBus,
    effects: Box<dyn EffectSink>,
    overlaps: InteractionResolver,
    ingredient_zones: Vec<IngredientZone>,
    now: SimTime,
    round_started: SimTime,
    last_announced_secs: Option<u32>,
    phase: RoundPhase,
}

impl GameSession {
    pub fn new(config: KitchenConfig, catalog: RecipeCatalog, seed: u64) -> Result<Self> {
        config.validate()?;
        let recipes = RecipeManager::new(catalog, seed)?;
        let zones = ZoneRegistry::new(&config);
        let divider_rect = zones.get_zone(ZoneId::Divider).unwrap_or_default();

        let agents = [
            Agent::new(AgentId::Chef, Agent::spawn_point(AgentId::Chef, &config), &config),
            Agent::new(AgentId::SousChef, Agent::spawn_point(AgentId::SousChef, &config), &config),
        ];

        let mut session = Self {
            divider: DividerSlots::new(divider_rect),
            boards: [
                CuttingBoard::new(ZoneId::CuttingBoard),
                CuttingBoard::new(ZoneId::LeftCuttingBoard),
            ],
            config,
            zones,
            agents,
            items: ItemStore::new(),
            placed: AHashMap::new(),
            ready_meals: Vec::new(),
            recipes,
            score: ScoreLedger::new(),
            timers: TimerQueue::new(),
            events: EventBus::new(),
            effects: Box::new(NullEffects),
            overlaps: InteractionResolver::new(),
            ingredient_zones: Vec::new(),
            now: SimTime::ZERO,
            round_started: SimTime::ZERO,
            last_announced_secs: None,
            phase: RoundPhase::NotStarted,
        };
        session.rebuild_ingredient_zones();
        Ok(session)
    }

    /// Session with the default config and built-in menu
    pub fn with_defaults(seed: u64) -> Result<Self> {
        Self::new(KitchenConfig::default(), RecipeCatalog::with_defaults(), seed)
    }

    pub fn with_effects(mut self, effects: Box<dyn EffectSink>) -> Self {
        self.effects = effects;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }

    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn held_item(&self, agent: AgentId) -> Option<&Item> {
        self.agent(agent).held.and_then(|id| self.items.get(id))
    }

    /// Placed-list of a zone, in placement order
    pub fn placed(&self, zone: ZoneId) -> &[ItemId] {
        self.placed.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ready_meals(&self) -> &[ItemId] {
        &self.ready_meals
    }

    pub fn divider(&self) -> &DividerSlots {
        &self.divider
    }

    pub fn board(&self, zone: ZoneId) -> Option<&CuttingBoard> {
        self.boards.iter().find(|b| b.zone == zone)
    }

    pub fn current_recipe(&self) -> Option<&Recipe> {
        self.recipes.current()
    }

    pub fn score(&self) -> i32 {
        self.score.score()
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.score
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn overlaps(&self, agent: AgentId) -> &AgentOverlaps {
        self.overlaps.overlaps(agent)
    }

    pub fn ingredient_zones(&self) -> &[IngredientZone] {
        &self.ingredient_zones
    }

    /// Seconds left in the running round
    pub fn time_remaining(&self) -> SimTime {
        self.config
            .round_duration()
            .saturating_sub(self.now.saturating_sub(self.round_started))
    }

    /// Time left before an item's divider or pickup timer fires
    pub fn item_time_remaining(&self, id: ItemId) -> Option<SimTime> {
        let timer = self.items.get(id)?.timer()?;
        self.timers.remaining(timer, self.now)
    }

    /// Sidebar template centre for an ingredient kind
    pub fn template_position(&self, kind: IngredientKind) -> Vec2 {
        let sidebar = self.zones.get_zone(ZoneId::Sidebar).unwrap_or_default();
        let index = IngredientKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        let step = sidebar.height / (IngredientKind::ALL.len() as f32 + 1.0);
        Vec2::new(sidebar.center().x, sidebar.y + step * (index as f32 + 1.0))
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&KitchenEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn event_log(&self) -> &[KitchenEvent] {
        self.events.log()
    }

    pub fn drain_events(&mut self) -> Vec<KitchenEvent> {
        self.events.drain()
    }

    fn play_effect(&mut self, effect: Effect) {
        if let Err(e) = self.effects.play(&effect) {
            tracing::warn!("effect {:?} failed, continuing: {}", effect, e);
        }
    }

    // ------------------------------------------------------------------
    // Round lifecycle
    // ------------------------------------------------------------------

    /// Begin a round: fresh recipe, countdown from the configured duration
    pub fn start_round(&mut self) {
        self.round_started = self.now;
        self.last_announced_secs = None;
        self.phase = RoundPhase::Running;

        self.events.emit(KitchenEvent::CurrentSceneReady(Scene::Kitchen));
        self.events.emit(KitchenEvent::RecipeReset);
        let recipe = self.recipes.select_random().clone();
        tracing::info!("Round started, first recipe: {}", recipe.name);
        self.events.emit(KitchenEvent::RecipeUpdated(Some(recipe)));
        self.announce_time();
    }

    /// Clear every item, timer and agent state. A full reset also zeroes
    /// the score. The round must be started again afterwards.
    pub fn reset(&mut self, full: bool) {
        self.items.clear();
        self.placed.clear();
        self.ready_meals.clear();
        self.timers.clear();
        self.divider.clear();
        for board in &mut self.boards {
            board.reset();
        }
        for agent in &mut self.agents {
            agent.position = Agent::spawn_point(agent.id, &self.config);
            agent.velocity = Vec2::default();
            agent.held = None;
            agent.current_zone = None;
        }
        self.overlaps.clear();
        self.rebuild_ingredient_zones();
        self.recipes.clear();
        self.phase = RoundPhase::NotStarted;
        self.last_announced_secs = None;

        self.events.emit(KitchenEvent::RecipeUpdated(None));
        self.events.emit(KitchenEvent::RecipeReset);
        if full {
            self.score.reset();
            self.events.emit(KitchenEvent::ScoreUpdated(self.score.score()));
        }
        tracing::info!("Session reset (full: {})", full);
        self.events.emit(KitchenEvent::GameReset(full));
    }

    fn end_round(&mut self) {
        self.phase = RoundPhase::Over;
        for board in &mut self.boards {
            board.reset();
        }
        let score = self.score.score();
        tracing::info!("Round over, final score {}", score);
        self.events.emit(KitchenEvent::RoundOver { score });
        self.events.emit(KitchenEvent::CurrentSceneReady(Scene::GameOver));
    }

    fn announce_time(&mut self) {
        let remaining = self.time_remaining().as_millis();
        let secs = remaining.div_ceil(1000) as u32;
        if self.last_announced_secs != Some(secs) {
            self.last_announced_secs = Some(secs);
            self.events.emit(KitchenEvent::TimeUpdated(secs));
        }
    }

    /// Replace the current recipe by name (debug/demo hook)
    pub fn force_recipe(&mut self, name: &str) -> bool {
        let Some(recipe) = self.recipes.catalog().get(name).cloned() else {
            return false;
        };
        self.recipes.set_current(recipe.clone());
        self.events.emit(KitchenEvent::RecipeUpdated(Some(recipe)));
        true
    }

    /// Rebuild the layout for a new viewport and re-anchor everything on it
    pub fn resize(&mut self, width: f32, height: f32, divider_width: f32, divider_x: f32) {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self.config.divider_width = divider_width;
        self.config.divider_x = divider_x;

        self.zones.resize(width, height, divider_width, divider_x);
        if let Some(rect) = self.zones.get_zone(ZoneId::Divider) {
            self.divider.reposition(rect);
        }

        let bounds = self.zones.bounds();
        for agent in &mut self.agents {
            agent.position = bounds.clamp_point(agent.position);
        }
        self.reanchor_items();
        self.rebuild_ingredient_zones();
        tracing::debug!("Resized kitchen to {}x{}", width, height);
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the simulation by `dt` with this tick's inputs
    pub fn tick(&mut self, dt: Duration, input: &TickInput) {
        if self.phase != RoundPhase::Running {
            return;
        }
        self.now = self.now + SimTime::from(dt);
        let dt_secs = dt.as_secs_f32();

        // Movement
        let bounds = self.zones.bounds();
        for id in AgentId::ALL {
            let agent = &mut self.agents[id.index()];
            agent.handle_movement(input.agent(id).movement);
            agent.step(dt_secs, bounds);
            let anchor = agent.held_anchor();
            if let Some(item) = agent.held.and_then(|held| self.items.get_mut(held)) {
                item.position = anchor;
            }
        }

        // Overlaps before any command handler
        self.refresh_overlaps();

        // Commands
        for (order, id) in AgentId::ALL.into_iter().enumerate() {
            let commands = *input.agent(id);
            if commands.release {
                self.cancel_cutting(id);
            }
            if commands.interact && self.interact(id) != InteractOutcome::Ignored {
                // Agents still to act this tick see the moved item
                self.rebuild_ingredient_zones();
                for later in &AgentId::ALL[order + 1..] {
                    self.overlaps.resolve(
                        &mut self.agents[later.index()],
                        self.zones.iter(),
                        &self.ingredient_zones,
                    );
                }
            }
        }

        // Timers
        self.poll_cutting();
        self.fire_timers();

        // Countdown
        self.announce_time();
        if self.time_remaining() == SimTime::ZERO {
            self.end_round();
        }
    }

    /// Rebuild both agents' overlap sets from current positions
    pub fn refresh_overlaps(&mut self) {
        self.rebuild_ingredient_zones();
        for id in AgentId::ALL {
            self.overlaps.resolve(
                &mut self.agents[id.index()],
                self.zones.iter(),
                &self.ingredient_zones,
            );
        }
    }

    fn rebuild_ingredient_zones(&mut self) {
        let size = self.config.ingredient_zone_size;
        let mut zones: Vec<IngredientZone> = IngredientKind::ALL
            .iter()
            .map(|kind| {
                IngredientZone::new(
                    IngredientTarget::Template(*kind),
                    ZoneId::Sidebar,
                    self.template_position(*kind),
                    size,
                )
            })
            .collect();

        for item in self.items.iter() {
            if let Location::Placed { zone, .. } = item.location {
                zones.push(IngredientZone::new(IngredientTarget::Item(item.id), zone, item.position, size));
            }
        }
        self.ingredient_zones = zones;
    }

    fn reanchor_items(&mut self) {
        for zone in [ZoneId::Divider, ZoneId::CookingStation, ZoneId::CuttingBoard, ZoneId::LeftCuttingBoard] {
            let ids = self.placed(zone).to_vec();
            for (index, id) in ids.into_iter().enumerate() {
                let slot = self.items.get(id).and_then(|item| match item.location {
                    Location::Placed { slot, .. } => slot,
                    Location::Held(_) => None,
                });
                let position = self.anchor_for(zone, slot.unwrap_or(index));
                if let Some(item) = self.items.get_mut(id) {
                    item.position = position;
                }
            }
        }
        let meal_anchor = self.meal_anchor();
        for id in &self.ready_meals {
            if let Some(item) = self.items.get_mut(*id) {
                item.position = meal_anchor;
            }
        }
        for agent in &self.agents {
            if let Some(item) = agent.held.and_then(|held| self.items.get_mut(held)) {
                item.position = agent.held_anchor();
            }
        }
    }

    /// Where the `index`-th item placed in `zone` sits
    fn anchor_for(&self, zone: ZoneId, index: usize) -> Vec2 {
        let rect = self.zones.get_zone(zone).unwrap_or_default();
        match zone {
            ZoneId::Divider => self.divider.position(index).unwrap_or_else(|| rect.center()),
            ZoneId::CookingStation => {
                let x = rect.x + STATION_ITEM_SPACING * (index as f32 + 0.5);
                Vec2::new(x.min(rect.right()), rect.center().y)
            }
            _ => rect.center(),
        }
    }

    fn meal_anchor(&self) -> Vec2 {
        self.zones
            .get_zone(ZoneId::CookingStation)
            .map(|rect| Vec2::new(rect.center().x, rect.bottom()))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Interact pulse: drop if holding, otherwise pick up, at the agent's
    /// current zone
    pub fn interact(&mut self, id: AgentId) -> InteractOutcome {
        if self.phase != RoundPhase::Running || self.is_cutting(id) {
            return InteractOutcome::Ignored;
        }
        let Some(zone) = self.target_zone(id) else {
            tracing::trace!("{} interacted outside any zone", id);
            return InteractOutcome::Ignored;
        };

        let outcome = if self.agent(id).is_holding() {
            self.handle_ingredient_drop_off(id, zone)
        } else {
            self.handle_ingredient_pickup(id, zone)
        };

        if outcome != InteractOutcome::Ignored {
            self.agents[id.index()].current_zone = None;
        }
        outcome
    }

    /// The agent's current zone, if it is still within reach
    fn target_zone(&self, id: AgentId) -> Option<ZoneId> {
        let agent = self.agent(id);
        agent.current_zone.filter(|zone| {
            self.overlaps(id).active_zone_overlaps.contains(zone)
                || self.zones.is_near_zone(agent.position, *zone)
        })
    }

    pub fn is_cutting(&self, id: AgentId) -> bool {
        self.boards.iter().any(|b| b.cutter() == Some(id))
    }

    /// Take an item from `zone`. No-op if the agent already holds something,
    /// may not pick up there, or nothing grabbable is in reach.
    pub fn handle_ingredient_pickup(&mut self, id: AgentId, zone: ZoneId) -> InteractOutcome {
        if self.agent(id).is_holding() || !id.can_pick_up_from(zone) {
            return InteractOutcome::Ignored;
        }

        let cutting_items: Vec<ItemId> = self.boards.iter().filter_map(|b| b.item()).collect();
        let target = self.overlaps.nearest_target(self.agent(id), &self.ingredient_zones, |iz| {
            iz.zone == zone
                && match iz.target {
                    IngredientTarget::Template(_) => zone == ZoneId::Sidebar,
                    IngredientTarget::Item(item) => !cutting_items.contains(&item),
                }
        });

        let anchor = self.agent(id).held_anchor();
        let item_id = match target {
            Some(IngredientTarget::Template(kind)) => {
                let item = self.items.spawn_ingredient(kind, Location::Held(id), anchor);
                tracing::debug!("{} took {} from the sidebar", id, kind);
                item
            }
            Some(IngredientTarget::Item(item)) => {
                if !self.detach_placed(item) {
                    return InteractOutcome::Ignored;
                }
                if let Some(it) = self.items.get_mut(item) {
                    it.location = Location::Held(id);
                    it.position = anchor;
                    tracing::debug!("{} picked up {} from {}", id, it.name(), zone);
                }
                item
            }
            None => return InteractOutcome::Ignored,
        };

        self.agents[id.index()].held = Some(item_id);
        InteractOutcome::PickedUp { item: item_id, zone }
    }

    /// Remove a placed item from its zone: placed-list, timer and divider
    /// slot go together. Returns false if the item is not placed.
    fn detach_placed(&mut self, item: ItemId) -> bool {
        let Some(Location::Placed { zone, slot, timer }) = self.items.get(item).map(|it| it.location) else {
            return false;
        };
        if let Some(timer) = timer {
            self.timers.cancel(timer);
        }
        if let Some(slot) = slot {
            self.divider.release(slot);
        }
        if let Some(list) = self.placed.get_mut(&zone) {
            list.retain(|id| *id != item);
        }
        self.ready_meals.retain(|id| *id != item);
        if zone == ZoneId::CookingStation || zone == ZoneId::Divider {
            self.reanchor_items();
        }
        true
    }

    fn place(&mut self, item: ItemId, location: Location) {
        let Location::Placed { zone, slot, .. } = location else {
            return;
        };
        let list = self.placed.entry(zone).or_default();
        list.push(item);
        let index = slot.unwrap_or(list.len() - 1);
        let position = self.anchor_for(zone, index);
        if let Some(it) = self.items.get_mut(item) {
            it.location = location;
            it.position = position;
        }
    }

    /// Put the held item down at `zone`. No-op if the agent holds nothing,
    /// may not drop there, or the zone refuses the item.
    pub fn handle_ingredient_drop_off(&mut self, id: AgentId, zone: ZoneId) -> InteractOutcome {
        let Some(item_id) = self.agent(id).held else {
            return InteractOutcome::Ignored;
        };
        if !id.can_drop_at(zone) {
            return InteractOutcome::Ignored;
        }
        let Some(item) = self.items.get(item_id) else {
            // Stale hand; clear it
            self.agents[id.index()].held = None;
            return InteractOutcome::Ignored;
        };
        let is_meal = item.meal().is_some();
        let is_raw = item.state == IngredientState::Raw;

        let dropped = match zone {
            ZoneId::Divider if !is_meal => self.drop_in_divider(id, item_id),
            ZoneId::CookingStation if !is_meal => {
                self.drop_on_cooking_station(id, item_id);
                true
            }
            ZoneId::CuttingBoard | ZoneId::LeftCuttingBoard if !is_meal => {
                // The SousChef only uses the board to start a cut
                let board_busy = self.board(zone).map(|b| b.is_cutting()).unwrap_or(true);
                if id == AgentId::SousChef && (board_busy || !is_raw) {
                    false
                } else {
                    self.drop_on_cutting_board(id, item_id, zone);
                    true
                }
            }
            bin if bin.is_trash() => {
                self.trash_held(id, bin);
                true
            }
            ZoneId::ReadyTable if is_meal => {
                self.deliver_meal(id, item_id);
                true
            }
            _ => false,
        };

        if dropped {
            InteractOutcome::Dropped { item: item_id, zone }
        } else {
            InteractOutcome::Ignored
        }
    }

    fn drop_in_divider(&mut self, id: AgentId, item: ItemId) -> bool {
        let Some(slot) = self.divider.free_slot() else {
            tracing::debug!("{} tried the divider but every slot is full", id);
            return false;
        };
        self.divider.occupy(slot);
        let due = self.now + self.config.divider_timeout();
        let timer = self.timers.schedule(due, TimerKind::DividerExpiry { item, slot });
        self.agents[id.index()].held = None;
        self.place(item, Location::Placed { zone: ZoneId::Divider, slot: Some(slot), timer: Some(timer) });
        tracing::debug!("{} placed item in divider slot {}", id, slot);
        true
    }

    fn drop_on_cooking_station(&mut self, id: AgentId, item: ItemId) {
        self.agents[id.index()].held = None;
        self.place(item, Location::placed(ZoneId::CookingStation));
        self.play_effect(Effect::CookingSound);

        if let Some(it) = self.items.get(item) {
            let counts_for_recipe = it.is_prepped()
                && it
                    .ingredient_kind()
                    .zip(self.recipes.current())
                    .map(|(kind, recipe)| recipe.requires(kind))
                    .unwrap_or(false);
            if counts_for_recipe {
                self.events.emit(KitchenEvent::IngredientCompleted(it.name().to_string()));
            }
        }

        self.check_recipe_completion();
    }

    fn drop_on_cutting_board(&mut self, id: AgentId, item: ItemId, zone: ZoneId) {
        let board_idle = self.board(zone).map(|b| !b.is_cutting()).unwrap_or(false);
        let is_raw = self.items.get(item).map(|it| it.state == IngredientState::Raw).unwrap_or(false);
        if board_idle && is_raw {
            self.start_cutting(id, zone);
        } else {
            self.agents[id.index()].held = None;
            self.place(item, Location::placed(zone));
        }
    }

    /// Put the agent's held raw ingredient on `board` and start cutting it.
    ///
    /// No-op (false) if the board is already cutting or the agent holds
    /// nothing.
    pub fn start_cutting(&mut self, id: AgentId, board: ZoneId) -> bool {
        let Some(item) = self.agent(id).held else {
            return false;
        };
        let duration = self.config.cut_duration();
        let now = self.now;
        let Some(state) = self.boards.iter_mut().find(|b| b.zone == board) else {
            return false;
        };
        if !state.start(id, item, now, duration) {
            return false;
        }

        self.agents[id.index()].held = None;
        self.place(item, Location::placed(board));
        let ingredient = self.items.get(item).map(|it| it.name().to_string()).unwrap_or_default();
        tracing::debug!("{} started cutting {} on {}", id, ingredient, board);
        self.events.emit(KitchenEvent::CuttingStarted { agent: id, board, ingredient });
        self.play_effect(Effect::ChopSound);
        true
    }

    fn poll_cutting(&mut self) {
        let now = self.now;
        let finished: Vec<FinishedCut> = self.boards.iter_mut().filter_map(|b| b.poll(now)).collect();
        for cut in finished {
            self.complete_cutting(cut);
        }
    }

    /// Flip the cut item to Prepped (same identity) and hand it back
    pub fn complete_cutting(&mut self, cut: FinishedCut) {
        if !self.items.contains(cut.item) {
            return;
        }
        self.detach_placed(cut.item);

        let agent = &mut self.agents[cut.agent.index()];
        let hands_free = agent.held.is_none();
        let anchor = agent.held_anchor();
        if hands_free {
            agent.held = Some(cut.item);
        }

        let mut ingredient = String::new();
        if let Some(item) = self.items.get_mut(cut.item) {
            item.state = IngredientState::Prepped;
            ingredient = item.name().to_string();
            if hands_free {
                item.location = Location::Held(cut.agent);
                item.position = anchor;
            }
        }
        if !hands_free {
            self.place(cut.item, Location::placed(cut.board));
        }

        tracing::debug!("{} finished cutting {}", cut.agent, ingredient);
        self.events.emit(KitchenEvent::CuttingCompleted {
            agent: cut.agent,
            board: cut.board,
            ingredient,
        });
        self.play_effect(Effect::StopChopSound);
    }

    /// Abort `id`'s cut: the ingredient is lost and the score penalized.
    /// Returns false if the agent was not cutting.
    pub fn cancel_cutting(&mut self, id: AgentId) -> bool {
        let now = self.now;
        let Some((board, item)) = self
            .boards
            .iter_mut()
            .find_map(|b| b.cancel(id, now).map(|item| (b.zone, item)))
        else {
            return false;
        };

        // The cut item sits on the board; whatever the agent holds is untouched
        self.detach_placed(item);
        let ingredient = self.items.remove(item).map(|it| it.name().to_string()).unwrap_or_default();

        tracing::debug!("{} released early, {} ruined", id, ingredient);
        self.add_points(self.config.cut_cancel_penalty, ScoreReason::CutCancelled);
        self.events.emit(KitchenEvent::CuttingCancelled { agent: id, board, ingredient });
        self.play_effect(Effect::StopChopSound);
        true
    }

    fn trash_held(&mut self, id: AgentId, bin: ZoneId) {
        let Some(item) = self.agents[id.index()].held.take() else {
            return;
        };
        let name = self.items.remove(item).map(|it| it.name().to_string()).unwrap_or_default();
        let position = self.zones.get_zone(bin).map(|r| r.center()).unwrap_or_default();

        tracing::debug!("{} threw {} in {}", id, name, bin);
        self.add_points(self.config.trash_penalty, ScoreReason::Trashed);
        self.events.emit(KitchenEvent::TrashEffect { position });
        self.play_effect(Effect::TrashPoof { position });
    }

    fn deliver_meal(&mut self, id: AgentId, item: ItemId) {
        self.agents[id.index()].held = None;
        let Some(meal) = self.items.remove(item).and_then(|it| it.meal().cloned()) else {
            return;
        };
        let points = meal.points.unwrap_or(self.config.delivery_points);

        tracing::info!("{} delivered {} for {} points", id, meal.result, points);
        self.add_points(points, ScoreReason::MealDelivered);
        self.events.emit(KitchenEvent::MealDelivered { result: meal.result, points });
        self.play_effect(Effect::DeliveryChime);
    }

    // ------------------------------------------------------------------
    // Recipe & score
    // ------------------------------------------------------------------

    /// Evaluate the cooking station against the current recipe and, on a
    /// match, consume it into a meal and move on to the next recipe
    pub fn check_recipe_completion(&mut self) -> bool {
        let placed: Vec<&Item> = self
            .placed(ZoneId::CookingStation)
            .iter()
            .filter_map(|id| self.items.get(*id))
            .collect();
        if !self.recipes.check_completion(&placed) {
            return false;
        }
        let Some(recipe) = self.recipes.current().cloned() else {
            return false;
        };

        tracing::info!("Recipe completed: {}", recipe.name);
        self.events.emit(KitchenEvent::RecipeCompleted {
            name: recipe.name.clone(),
            result: recipe.result.clone(),
        });
        self.add_points(self.config.recipe_completion_points, ScoreReason::RecipeCompleted);

        for id in self.placed.remove(&ZoneId::CookingStation).unwrap_or_default() {
            self.items.remove(id);
        }
        self.spawn_meal(&recipe);

        let next = self.recipes.select_next().clone();
        tracing::debug!("Next recipe: {}", next.name);
        self.events.emit(KitchenEvent::RecipeUpdated(Some(next)));
        true
    }

    fn spawn_meal(&mut self, recipe: &Recipe) {
        let meal = Meal {
            recipe: recipe.name.clone(),
            result: recipe.result.clone(),
            points: recipe.points,
        };
        let anchor = self.meal_anchor();
        let id = self.items.spawn_meal(meal, Location::placed(ZoneId::CookingStation), anchor);
        let due = self.now + self.config.meal_pickup_timeout();
        let timer = self.timers.schedule(due, TimerKind::MealPickup { item: id });
        if let Some(item) = self.items.get_mut(id) {
            item.location = Location::Placed { zone: ZoneId::CookingStation, slot: None, timer: Some(timer) };
        }
        self.ready_meals.push(id);
        self.events.emit(KitchenEvent::MealReady { result: recipe.result.clone() });
    }

    /// Apply a score delta and notify the display
    pub fn add_points(&mut self, delta: i32, reason: ScoreReason) {
        let score = self.score.add_points(delta, reason, self.now);
        self.events.emit(KitchenEvent::ScoreUpdated(score));
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    fn fire_timers(&mut self) {
        for timer in self.timers.pop_due(self.now) {
            // A timer only acts if its item is still where it left it
            let still_owned = self
                .items
                .get(match timer.kind {
                    TimerKind::DividerExpiry { item, .. } | TimerKind::MealPickup { item } => item,
                })
                .map(|it| it.timer() == Some(timer.id))
                .unwrap_or(false);
            if !still_owned {
                tracing::trace!("stale timer {:?} ignored", timer.id);
                continue;
            }

            match timer.kind {
                TimerKind::DividerExpiry { item, slot } => self.expire_divider_item(item, slot),
                TimerKind::MealPickup { item } => self.expire_meal(item),
            }
        }
    }

    fn expire_divider_item(&mut self, item: ItemId, slot: usize) {
        let position = self.divider.position(slot).unwrap_or_default();
        self.detach_placed(item);
        let name = self.items.remove(item).map(|it| it.name().to_string()).unwrap_or_default();

        tracing::debug!("{} spoiled in divider slot {}", name, slot);
        self.add_points(self.config.divider_timeout_penalty, ScoreReason::DividerTimeout);
        self.events.emit(KitchenEvent::TrashEffect { position });
        self.play_effect(Effect::TrashPoof { position });
    }

    fn expire_meal(&mut self, item: ItemId) {
        let position = self.items.get(item).map(|it| it.position).unwrap_or_default();
        self.detach_placed(item);
        let Some(meal) = self.items.remove(item).and_then(|it| it.meal().cloned()) else {
            return;
        };

        tracing::info!("{} was never picked up", meal.result);
        self.add_points(self.config.missed_meal_penalty, ScoreReason::MealMissed);
        self.events.emit(KitchenEvent::MealExpired { result: meal.result });
        self.events.emit(KitchenEvent::TrashEffect { position });
        self.play_effect(Effect::TrashPoof { position });
    }

    // ------------------------------------------------------------------
    // Debug hooks
    // ------------------------------------------------------------------

    /// Move an agent directly (demo scripting and tests)
    pub fn teleport(&mut self, id: AgentId, position: Vec2) {
        let bounds = self.zones.bounds();
        let agent = &mut self.agents[id.index()];
        agent.position = bounds.clamp_point(position);
        let anchor = agent.held_anchor();
        if let Some(item) = agent.held.and_then(|held| self.items.get_mut(held)) {
            item.position = anchor;
        }
    }

    /// Put a fresh ingredient straight into an empty-handed agent's hands
    pub fn give_item(&mut self, id: AgentId, kind: IngredientKind, state: IngredientState) -> Option<ItemId> {
        if self.agent(id).is_holding() {
            return None;
        }
        let anchor = self.agent(id).held_anchor();
        let item = self.items.spawn_ingredient(kind, Location::Held(id), anchor);
        if let Some(it) = self.items.get_mut(item) {
            it.state = state;
        }
        self.agents[id.index()].held = Some(item);
        Some(item)
    }

    /// Check the ownership invariants; used by tests and debug runs
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        for item in self.items.iter() {
            match item.location {
                Location::Held(agent) => {
                    if self.agent(agent).held != Some(item.id) {
                        return Err(format!("{} claims holder {} which does not hold it", item.name(), agent));
                    }
                }
                Location::Placed { zone, slot, .. } => {
                    let listed = self.placed(zone).contains(&item.id) || self.ready_meals.contains(&item.id);
                    if !listed {
                        return Err(format!("{} placed in {} but not listed there", item.name(), zone));
                    }
                    if self.agents.iter().any(|a| a.held == Some(item.id)) {
                        return Err(format!("{} is both placed and held", item.name()));
                    }
                    if let Some(slot) = slot {
                        if zone != ZoneId::Divider || !self.divider.is_occupied(slot) {
                            return Err(format!("{} references free or foreign slot {}", item.name(), slot));
                        }
                    }
                }
            }
        }

        for agent in &self.agents {
            if let Some(held) = agent.held {
                if !self.items.contains(held) {
                    return Err(format!("{} holds a destroyed item", agent.id));
                }
            }
        }

        let divider_items = self.placed(ZoneId::Divider);
        if divider_items.len() != self.divider.occupied_count() {
            return Err(format!(
                "divider has {} items but {} occupied slots",
                divider_items.len(),
                self.divider.occupied_count()
            ));
        }
        let mut slots: Vec<usize> = divider_items
            .iter()
            .filter_map(|id| match self.items.get(*id)?.location {
                Location::Placed { slot, .. } => slot,
                Location::Held(_) => None,
            })
            .collect();
        slots.sort_unstable();
        slots.dedup();
        if slots.len() != divider_items.len() {
            return Err("two divider items share a slot".into());
        }

        for (zone, list) in &self.placed {
            for id in list {
                match self.items.get(*id).map(|it| it.location.zone()) {
                    Some(Some(z)) if z == *zone => {}
                    _ => return Err(format!("{} list holds an item that is not placed there", zone)),
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("now", &self.now)
            .field("phase", &self.phase)
            .field("score", &self.score.score())
            .field("items", &self.items.len())
            .field("recipe", &self.recipes.current().map(|r| r.name.as_str()))
            .finish()
    }
}
