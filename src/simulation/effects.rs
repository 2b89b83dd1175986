//! Presentation side effects (sounds, visual bursts)
//!
//! Effects are fire-and-forget requests to the audio/visual collaborator.
//! A failing effect never affects game state: the session logs the error
//! and carries on.

use thiserror::Error;

use crate::core::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Ambient sizzle when something lands on the cooking station
    CookingSound,
    ChopSound,
    StopChopSound,
    TrashPoof { position: Vec2 },
    DeliveryChime,
}

#[derive(Error, Debug)]
pub enum EffectError {
    #[error("missing resource: {0}")]
    MissingResource(String),

    #[error("effect backend unavailable: {0}")]
    Unavailable(String),
}

pub trait EffectSink {
    fn play(&mut self, effect: &Effect) -> Result<(), EffectError>;
}

/// Sink for headless runs; accepts and drops every effect
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEffects;

impl EffectSink for NullEffects {
    fn play(&mut self, _effect: &Effect) -> Result<(), EffectError> {
        Ok(())
    }
}
