//! Integration tests for session lifecycle and the division of labour
//!
//! Covers zone permissions for both agents, the round clock, resets,
//! viewport resizing, event subscriptions and degraded effect sinks.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use kitchen_duo::agent::{AgentId, MovementKeys};
use kitchen_duo::core::config::KitchenConfig;
use kitchen_duo::core::error::KitchenError;
use kitchen_duo::core::types::Vec2;
use kitchen_duo::kitchen::ingredient::{IngredientKind, IngredientState};
use kitchen_duo::kitchen::recipe::RecipeCatalog;
use kitchen_duo::kitchen::zones::ZoneId;
use kitchen_duo::simulation::effects::{Effect, EffectError, EffectSink};
use kitchen_duo::simulation::events::{KitchenEvent, Scene};
use kitchen_duo::simulation::session::{GameSession, InteractOutcome, RoundPhase, TickInput};

const TICK: Duration = Duration::from_millis(50);

fn running_session() -> GameSession {
    let mut session = GameSession::with_defaults(11).unwrap();
    session.start_round();
    session.drain_events();
    session
}

fn zone_center(session: &GameSession, zone: ZoneId) -> Vec2 {
    session.zones().get_zone(zone).unwrap().center()
}

fn act_at(session: &mut GameSession, agent: AgentId, position: Vec2) {
    session.teleport(agent, position);
    session.tick(TICK, &TickInput::interact(agent));
}

// ============================================================================
// Permissions
// ============================================================================

#[test]
fn test_sous_chef_cannot_use_cooking_station() {
    let mut session = running_session();
    let station = zone_center(&session, ZoneId::CookingStation);

    let item = session
        .give_item(AgentId::SousChef, IngredientKind::Cheese, IngredientState::Prepped)
        .unwrap();
    act_at(&mut session, AgentId::SousChef, station);
    assert_eq!(session.agent(AgentId::SousChef).held, Some(item));
    assert!(session.placed(ZoneId::CookingStation).is_empty());
}

#[test]
fn test_sous_chef_cannot_pick_up_from_station() {
    let mut session = running_session();
    let station = zone_center(&session, ZoneId::CookingStation);

    session.give_item(AgentId::Chef, IngredientKind::Cheese, IngredientState::Raw);
    act_at(&mut session, AgentId::Chef, station);
    assert_eq!(session.placed(ZoneId::CookingStation).len(), 1);

    let item_pos = session.item(session.placed(ZoneId::CookingStation)[0]).unwrap().position;
    act_at(&mut session, AgentId::SousChef, item_pos);
    assert!(!session.agent(AgentId::SousChef).is_holding());
    assert_eq!(session.placed(ZoneId::CookingStation).len(), 1);
}

#[test]
fn test_trash_bins_belong_to_one_side_each() {
    let mut session = running_session();
    let right_bin = zone_center(&session, ZoneId::RightTrash);
    let left_bin = zone_center(&session, ZoneId::LeftTrash);

    // Chef may not use the SousChef's bin
    let item = session
        .give_item(AgentId::Chef, IngredientKind::Tomato, IngredientState::Raw)
        .unwrap();
    act_at(&mut session, AgentId::Chef, right_bin);
    assert_eq!(session.agent(AgentId::Chef).held, Some(item));

    act_at(&mut session, AgentId::Chef, left_bin);
    assert!(!session.agent(AgentId::Chef).is_holding());
    assert!(session.item(item).is_none());
    assert_eq!(session.score(), -5);

    session.give_item(AgentId::SousChef, IngredientKind::Meat, IngredientState::Raw);
    act_at(&mut session, AgentId::SousChef, left_bin);
    assert!(session.agent(AgentId::SousChef).is_holding());
    act_at(&mut session, AgentId::SousChef, right_bin);
    assert!(!session.agent(AgentId::SousChef).is_holding());
    assert_eq!(session.score(), -10);

    let trash_events = session
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, KitchenEvent::TrashEffect { .. }))
        .count();
    assert_eq!(trash_events, 2);
}

#[test]
fn test_sidebar_pickup_spawns_fresh_raw_item() {
    let mut session = running_session();
    let template = session.template_position(IngredientKind::Avocado);

    act_at(&mut session, AgentId::SousChef, template);
    let first = session.held_item(AgentId::SousChef).unwrap();
    assert_eq!(first.ingredient_kind(), Some(IngredientKind::Avocado));
    assert_eq!(first.state, IngredientState::Raw);
    let first_id = first.id;

    // Templates are reusable; the Chef can take from the same entry
    act_at(&mut session, AgentId::Chef, template);
    let second = session.held_item(AgentId::Chef).unwrap();
    assert_eq!(second.ingredient_kind(), Some(IngredientKind::Avocado));
    assert_ne!(second.id, first_id);
    session.check_invariants().unwrap();
}

#[test]
fn test_holding_agent_cannot_pick_up_again() {
    let mut session = running_session();
    let template = session.template_position(IngredientKind::Cheese);

    let item = session
        .give_item(AgentId::SousChef, IngredientKind::Tomato, IngredientState::Raw)
        .unwrap();
    act_at(&mut session, AgentId::SousChef, template);
    assert_eq!(session.agent(AgentId::SousChef).held, Some(item));
    assert_eq!(session.items().len(), 1);
}

#[test]
fn test_sous_chef_drop_on_busy_board_ignored() {
    let mut session = running_session();
    let board = zone_center(&session, ZoneId::CuttingBoard);

    // Chef starts a cut on the right board
    session.give_item(AgentId::Chef, IngredientKind::Meat, IngredientState::Raw);
    act_at(&mut session, AgentId::Chef, board);
    assert!(session.is_cutting(AgentId::Chef));

    let item = session
        .give_item(AgentId::SousChef, IngredientKind::Tomato, IngredientState::Raw)
        .unwrap();
    act_at(&mut session, AgentId::SousChef, board);
    assert_eq!(session.agent(AgentId::SousChef).held, Some(item));
}

#[test]
fn test_chef_cuts_on_left_board() {
    let mut session = running_session();
    let board = zone_center(&session, ZoneId::LeftCuttingBoard);

    let item = session
        .give_item(AgentId::Chef, IngredientKind::Avocado, IngredientState::Raw)
        .unwrap();
    act_at(&mut session, AgentId::Chef, board);
    assert_eq!(session.board(ZoneId::LeftCuttingBoard).unwrap().item(), Some(item));

    for _ in 0..100 {
        session.tick(TICK, &TickInput::idle());
    }
    assert_eq!(session.agent(AgentId::Chef).held, Some(item));
    assert!(session.item(item).unwrap().is_prepped());
}

#[test]
fn test_interact_outside_any_zone_is_ignored() {
    let mut session = running_session();
    session.teleport(AgentId::Chef, Vec2::new(150.0, 200.0));
    session.refresh_overlaps();
    assert_eq!(session.interact(AgentId::Chef), InteractOutcome::Ignored);
}

// ============================================================================
// Movement
// ============================================================================

#[test]
fn test_agents_move_with_keys_and_stay_in_bounds() {
    let mut session = running_session();
    let start = session.agent(AgentId::Chef).position;

    let mut input = TickInput::idle();
    input.chef.movement = MovementKeys { right: true, ..Default::default() };
    for _ in 0..20 {
        session.tick(TICK, &input);
    }
    // 200 px/s for one second
    let moved = session.agent(AgentId::Chef).position;
    assert!((moved.x - start.x - 200.0).abs() < 0.5);
    assert_eq!(moved.y, start.y);

    let mut input = TickInput::idle();
    input.sous_chef.movement = MovementKeys { up: true, left: true, ..Default::default() };
    for _ in 0..400 {
        session.tick(TICK, &input);
    }
    let corner = session.agent(AgentId::SousChef).position;
    assert_eq!(corner, Vec2::new(0.0, 0.0));
}

#[test]
fn test_held_item_follows_agent() {
    let mut session = running_session();
    let item = session
        .give_item(AgentId::Chef, IngredientKind::Cheese, IngredientState::Raw)
        .unwrap();

    let mut input = TickInput::idle();
    input.chef.movement = MovementKeys { down: true, ..Default::default() };
    for _ in 0..5 {
        session.tick(TICK, &input);
    }
    let anchor = session.agent(AgentId::Chef).held_anchor();
    assert_eq!(session.item(item).unwrap().position, anchor);
}

// ============================================================================
// Round Lifecycle
// ============================================================================

#[test]
fn test_start_round_announces_scene_and_recipe() {
    let mut session = GameSession::with_defaults(3).unwrap();
    assert_eq!(session.phase(), RoundPhase::NotStarted);
    session.start_round();

    let events = session.drain_events();
    assert_eq!(events[0], KitchenEvent::CurrentSceneReady(Scene::Kitchen));
    assert_eq!(events[1], KitchenEvent::RecipeReset);
    assert!(matches!(events[2], KitchenEvent::RecipeUpdated(Some(_))));
    assert_eq!(events[3], KitchenEvent::TimeUpdated(180));
    assert_eq!(session.phase(), RoundPhase::Running);
}

#[test]
fn test_round_clock_ends_round() {
    let config = KitchenConfig { round_duration_secs: 2, ..Default::default() };
    let mut session = GameSession::new(config, RecipeCatalog::with_defaults(), 1).unwrap();
    session.start_round();

    for _ in 0..40 {
        session.tick(TICK, &TickInput::idle());
    }
    assert_eq!(session.phase(), RoundPhase::Over);

    let events = session.drain_events();
    let seconds: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            KitchenEvent::TimeUpdated(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(seconds, vec![2, 1, 0]);
    assert!(events.contains(&KitchenEvent::RoundOver { score: 0 }));
    assert_eq!(events.last(), Some(&KitchenEvent::CurrentSceneReady(Scene::GameOver)));

    // Nothing moves once the round is over
    let now = session.now();
    session.give_item(AgentId::Chef, IngredientKind::Meat, IngredientState::Raw);
    let bin = zone_center(&session, ZoneId::LeftTrash);
    act_at(&mut session, AgentId::Chef, bin);
    assert_eq!(session.now(), now);
    assert!(session.agent(AgentId::Chef).is_holding());
}

#[test]
fn test_reset_clears_kitchen() {
    let mut session = running_session();
    let divider = zone_center(&session, ZoneId::Divider);
    let bin = zone_center(&session, ZoneId::LeftTrash);

    session.give_item(AgentId::SousChef, IngredientKind::Meat, IngredientState::Raw);
    act_at(&mut session, AgentId::SousChef, divider);
    session.give_item(AgentId::Chef, IngredientKind::Meat, IngredientState::Raw);
    act_at(&mut session, AgentId::Chef, bin);
    session.give_item(AgentId::Chef, IngredientKind::Cheese, IngredientState::Raw);
    assert_eq!(session.score(), -5);

    session.reset(false);
    assert!(session.items().is_empty());
    assert_eq!(session.divider().occupied_count(), 0);
    assert!(!session.agent(AgentId::Chef).is_holding());
    assert!(session.current_recipe().is_none());
    assert_eq!(session.score(), -5, "partial reset keeps the score");

    session.reset(true);
    assert_eq!(session.score(), 0);
    let events = session.drain_events();
    assert!(events.contains(&KitchenEvent::GameReset(false)));
    assert_eq!(events.last(), Some(&KitchenEvent::GameReset(true)));
    assert!(events.contains(&KitchenEvent::RecipeUpdated(None)));
    session.check_invariants().unwrap();
}

#[test]
fn test_stale_divider_timer_after_reset_is_harmless() {
    let mut session = running_session();
    let divider = zone_center(&session, ZoneId::Divider);
    session.give_item(AgentId::SousChef, IngredientKind::Meat, IngredientState::Raw);
    act_at(&mut session, AgentId::SousChef, divider);

    session.reset(false);
    session.start_round();
    for _ in 0..250 {
        session.tick(TICK, &TickInput::idle());
    }
    assert_eq!(session.score(), 0);
}

#[test]
fn test_invalid_config_rejected() {
    let config = KitchenConfig { divider_width: -1.0, ..Default::default() };
    let err = GameSession::new(config, RecipeCatalog::with_defaults(), 0).unwrap_err();
    assert!(matches!(err, KitchenError::InvalidConfig(_)));

    let err = GameSession::new(KitchenConfig::default(), RecipeCatalog::new(), 0).unwrap_err();
    assert!(matches!(err, KitchenError::EmptyCatalog));
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn test_resize_moves_zones_and_divider_items() {
    let mut session = running_session();
    let divider = zone_center(&session, ZoneId::Divider);
    let item = session
        .give_item(AgentId::SousChef, IngredientKind::Tomato, IngredientState::Raw)
        .unwrap();
    act_at(&mut session, AgentId::SousChef, divider);
    assert_eq!(session.item(item).unwrap().position, Vec2::new(640.0, 144.0));

    session.resize(1920.0, 1080.0, 40.0, 940.0);
    let rect = session.zones().get_zone(ZoneId::Divider).unwrap();
    assert_eq!(rect.x, 940.0);
    assert_eq!(rect.height, 1080.0);
    assert_eq!(session.item(item).unwrap().position, Vec2::new(960.0, 216.0));
    assert_eq!(session.divider().position(0), Some(Vec2::new(960.0, 216.0)));

    let sidebar = session.zones().get_zone(ZoneId::Sidebar).unwrap();
    assert_eq!(sidebar.right(), 1920.0);
    assert!(sidebar.contains(session.template_position(IngredientKind::Tortilla)));
}

#[test]
fn test_resize_clamps_agents() {
    let mut session = running_session();
    session.teleport(AgentId::SousChef, Vec2::new(1200.0, 700.0));
    session.resize(800.0, 600.0, 40.0, 380.0);
    let pos = session.agent(AgentId::SousChef).position;
    assert!(pos.x <= 800.0 && pos.y <= 600.0);
}

// ============================================================================
// Events & Effects
// ============================================================================

#[test]
fn test_subscribers_receive_events_in_order() {
    let mut session = GameSession::with_defaults(5).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = session.subscribe(move |event| sink.borrow_mut().push(event.topic()));

    session.start_round();
    assert_eq!(
        *seen.borrow(),
        vec!["current-scene-ready", "recipe-reset", "recipe-updated", "time-updated"]
    );

    assert!(session.unsubscribe(id));
    session.reset(true);
    assert_eq!(seen.borrow().len(), 4);
}

/// Effect backend that always fails
struct BrokenSpeaker {
    attempts: Rc<RefCell<Vec<Effect>>>,
}

impl EffectSink for BrokenSpeaker {
    fn play(&mut self, effect: &Effect) -> Result<(), EffectError> {
        self.attempts.borrow_mut().push(*effect);
        Err(EffectError::MissingResource("chop.wav".into()))
    }
}

#[test]
fn test_failing_effects_do_not_block_gameplay() {
    let attempts = Rc::new(RefCell::new(Vec::new()));
    let mut session = GameSession::with_defaults(9)
        .unwrap()
        .with_effects(Box::new(BrokenSpeaker { attempts: Rc::clone(&attempts) }));
    session.start_round();

    let board = zone_center(&session, ZoneId::CuttingBoard);
    let bin = zone_center(&session, ZoneId::RightTrash);
    session.give_item(AgentId::SousChef, IngredientKind::Cheese, IngredientState::Raw);
    act_at(&mut session, AgentId::SousChef, board);
    for _ in 0..100 {
        session.tick(TICK, &TickInput::idle());
    }
    assert!(session.held_item(AgentId::SousChef).unwrap().is_prepped());

    act_at(&mut session, AgentId::SousChef, bin);
    assert_eq!(session.score(), -5);

    let attempts = attempts.borrow();
    assert_eq!(attempts[0], Effect::ChopSound);
    assert_eq!(attempts[1], Effect::StopChopSound);
    assert!(matches!(attempts[2], Effect::TrashPoof { .. }));
}
