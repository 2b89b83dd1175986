//! Event boundary to rendering, audio and UI collaborators
//!
//! In-process publish/subscribe. `emit` fans out synchronously to every
//! subscriber registered at that moment, then appends the event to a log the
//! owner can drain (used by headless runs and tests).

use serde::Serialize;

use crate::agent::AgentId;
use crate::core::types::Vec2;
use crate::kitchen::recipe::Recipe;
use crate::kitchen::zones::ZoneId;

/// Screen the collaborators should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scene {
    Menu,
    Kitchen,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum KitchenEvent {
    /// New recipe selected, or `None` on reset
    RecipeUpdated(Option<Recipe>),
    RecipeCompleted { name: String, result: String },
    ScoreUpdated(i32),
    /// Whole seconds left in the round
    TimeUpdated(u32),
    /// A required ingredient reached the cooking station prepped
    IngredientCompleted(String),
    RecipeReset,
    CurrentSceneReady(Scene),
    /// `true` for a full reset (score included)
    GameReset(bool),
    /// Audio collaborator traffic; the core never emits these
    ToggleMusic(bool),
    MusicStateChanged(bool),
    TrashEffect { position: Vec2 },
    CuttingStarted { agent: AgentId, board: ZoneId, ingredient: String },
    CuttingCompleted { agent: AgentId, board: ZoneId, ingredient: String },
    CuttingCancelled { agent: AgentId, board: ZoneId, ingredient: String },
    MealReady { result: String },
    MealDelivered { result: String, points: i32 },
    MealExpired { result: String },
    RoundOver { score: i32 },
}

impl KitchenEvent {
    /// Wire name used by collaborators
    pub fn topic(&self) -> &'static str {
        match self {
            KitchenEvent::RecipeUpdated(_) => "recipe-updated",
            KitchenEvent::RecipeCompleted { .. } => "recipe-completed",
            KitchenEvent::ScoreUpdated(_) => "score-updated",
            KitchenEvent::TimeUpdated(_) => "time-updated",
            KitchenEvent::IngredientCompleted(_) => "ingredient-completed",
            KitchenEvent::RecipeReset => "recipe-reset",
            KitchenEvent::CurrentSceneReady(_) => "current-scene-ready",
            KitchenEvent::GameReset(_) => "game-reset",
            KitchenEvent::ToggleMusic(_) => "toggleMusic",
            KitchenEvent::MusicStateChanged(_) => "musicStateChanged",
            KitchenEvent::TrashEffect { .. } => "trash-effect",
            KitchenEvent::CuttingStarted { .. } => "cutting-started",
            KitchenEvent::CuttingCompleted { .. } => "cutting-completed",
            KitchenEvent::CuttingCancelled { .. } => "cutting-cancelled",
            KitchenEvent::MealReady { .. } => "meal-ready",
            KitchenEvent::MealDelivered { .. } => "meal-delivered",
            KitchenEvent::MealExpired { .. } => "meal-expired",
            KitchenEvent::RoundOver { .. } => "round-over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Handler = Box<dyn FnMut(&KitchenEvent)>;

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Handler)>,
    log: Vec<KitchenEvent>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&KitchenEvent) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: KitchenEvent) {
        tracing::trace!(topic = event.topic(), "emit");
        for (_, handler) in self.subscribers.iter_mut() {
            handler(&event);
        }
        self.log.push(event);
    }

    /// Events emitted since the last drain
    pub fn log(&self) -> &[KitchenEvent] {
        &self.log
    }

    pub fn drain(&mut self) -> Vec<KitchenEvent> {
        std::mem::take(&mut self.log)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("logged", &self.log.len())
            .finish()
    }
}
