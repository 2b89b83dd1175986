//! Simulation layer - tick loop, interaction resolution, timers and events

pub mod effects;
pub mod events;
pub mod overlap;
pub mod session;
pub mod timers;

pub use effects::{Effect, EffectError, EffectSink, NullEffects};
pub use events::{EventBus, KitchenEvent, Scene, SubscriberId};
pub use overlap::{compute_overlaps, AgentOverlaps, IngredientTarget, IngredientZone, InteractionResolver};
pub use session::{AgentInput, GameSession, InteractOutcome, RoundPhase, TickInput};
pub use timers::{ScheduledTimer, TimerKind, TimerQueue};
