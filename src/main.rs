//! Kitchen Duo - Entry Point
//!
//! Line-oriented driver for the kitchen simulation. Holds the keyboard state
//! for both agents between commands, advances the session in fixed ticks and
//! prints what happened.

use kitchen_duo::agent::{AgentId, KeyBindings, MovementKeys};
use kitchen_duo::core::config::KitchenConfig;
use kitchen_duo::core::error::Result;
use kitchen_duo::kitchen::ingredient::{IngredientKind, IngredientState};
use kitchen_duo::kitchen::recipe::RecipeCatalog;
use kitchen_duo::kitchen::zones::ZoneId;
use kitchen_duo::simulation::events::KitchenEvent;
use kitchen_duo::simulation::session::{GameSession, RoundPhase, TickInput};

use std::io::{self, Write};
use std::time::Duration;

/// Fixed simulation step
const TICK: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kitchen_duo=debug".into()),
        )
        .init();

    tracing::info!("Kitchen Duo starting...");

    let config = match std::env::var("KITCHEN_CONFIG") {
        Ok(path) => KitchenConfig::load(std::path::Path::new(&path))?,
        Err(_) => KitchenConfig::default(),
    };
    let seed = std::env::var("KITCHEN_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let mut session = GameSession::new(config, RecipeCatalog::with_defaults(), seed)?;
    let mut held = [MovementKeys::default(); 2];

    println!("\n=== KITCHEN DUO ===");
    println!("Two cooks, one kitchen, one divider.");
    println!();
    println!("Commands:");
    println!("  start                      - Start the round");
    println!("  tick / t                   - Advance one tick ({} ms)", TICK.as_millis());
    println!("  run <n>                    - Run n ticks");
    println!("  keys <key>...              - Hold keys (w/a/s/d chef, up/down/left/right sous)");
    println!("  stop                       - Release all movement keys");
    println!("  goto <agent> <zone>        - Move an agent onto a zone");
    println!("  interact / i <agent>       - Interact pulse");
    println!("  release <agent>            - Release the cutting key");
    println!("  give <agent> <ingredient> [prepped]");
    println!("  recipe <name>              - Force the current recipe");
    println!("  resize <w> <h>             - Resize the viewport");
    println!("  status / s                 - Show detailed status");
    println!("  reset [full]               - Reset the kitchen");
    println!("  quit / q                   - Exit");
    println!();

    session.start_round();
    print_events(&mut session);

    loop {
        display_status(&session);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let mut words = input.split_whitespace();
        let command = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        match command {
            "quit" | "q" => break,
            "start" => {
                if session.phase() == RoundPhase::Over {
                    session.reset(false);
                }
                session.start_round();
            }
            "tick" | "t" => {
                session.tick(TICK, &movement_input(&held));
            }
            "run" => match args.first().and_then(|n| n.parse::<u32>().ok()) {
                Some(n) => {
                    println!("Running {} ticks...", n);
                    for _ in 0..n {
                        session.tick(TICK, &movement_input(&held));
                    }
                }
                None => println!("Usage: run <number>"),
            },
            "keys" => {
                for id in AgentId::ALL {
                    held[id.index()] = KeyBindings::for_agent(id).resolve(&args);
                }
            }
            "stop" => held = [MovementKeys::default(); 2],
            "goto" => match (args.first().and_then(|a| parse_agent(a)), args.get(1).and_then(|z| parse_zone(z))) {
                (Some(agent), Some(zone)) => {
                    if let Some(rect) = session.zones().get_zone(zone) {
                        session.teleport(agent, rect.center());
                        session.refresh_overlaps();
                    }
                }
                _ => println!("Usage: goto <chef|sous> <zone>"),
            },
            "interact" | "i" => match args.first().and_then(|a| parse_agent(a)) {
                Some(agent) => {
                    let mut tick = movement_input(&held);
                    tick.agent_mut(agent).interact = true;
                    session.tick(TICK, &tick);
                }
                None => println!("Usage: interact <chef|sous>"),
            },
            "release" => match args.first().and_then(|a| parse_agent(a)) {
                Some(agent) => {
                    let mut tick = movement_input(&held);
                    tick.agent_mut(agent).release = true;
                    session.tick(TICK, &tick);
                }
                None => println!("Usage: release <chef|sous>"),
            },
            "give" => {
                let agent = args.first().and_then(|a| parse_agent(a));
                let kind = args.get(1).and_then(|k| k.parse::<IngredientKind>().ok());
                let state = if args.get(2) == Some(&"prepped") {
                    IngredientState::Prepped
                } else {
                    IngredientState::Raw
                };
                match (agent, kind) {
                    (Some(agent), Some(kind)) => {
                        if session.give_item(agent, kind, state).is_none() {
                            println!("{} already holds something", agent);
                        }
                    }
                    _ => println!("Usage: give <chef|sous> <ingredient> [prepped]"),
                }
            }
            "recipe" => match args.first() {
                Some(name) => {
                    if !session.force_recipe(name) {
                        println!("No recipe named {}", name);
                    }
                }
                None => println!("Usage: recipe <name>"),
            },
            "resize" => {
                let w = args.first().and_then(|v| v.parse::<f32>().ok());
                let h = args.get(1).and_then(|v| v.parse::<f32>().ok());
                match (w, h) {
                    (Some(w), Some(h)) if w > 0.0 && h > 0.0 => {
                        let divider_width = session.config().divider_width;
                        session.resize(w, h, divider_width, (w - divider_width) / 2.0);
                    }
                    _ => println!("Usage: resize <width> <height>"),
                }
            }
            "status" | "s" => display_detailed_status(&session),
            "reset" => {
                session.reset(args.first() == Some(&"full"));
                session.start_round();
            }
            _ => println!("Unknown command. Type quit to exit."),
        }

        print_events(&mut session);
    }

    println!(
        "\nGoodbye! Final score: {} after {:.1}s.",
        session.score(),
        session.now().as_secs_f32()
    );
    Ok(())
}

fn movement_input(held: &[MovementKeys; 2]) -> TickInput {
    let mut input = TickInput::idle();
    for id in AgentId::ALL {
        input.agent_mut(id).movement = held[id.index()];
    }
    input
}

fn parse_agent(name: &str) -> Option<AgentId> {
    match name.to_ascii_lowercase().as_str() {
        "chef" | "c" => Some(AgentId::Chef),
        "sous" | "souschef" | "sous_chef" => Some(AgentId::SousChef),
        _ => None,
    }
}

fn parse_zone(name: &str) -> Option<ZoneId> {
    ZoneId::ALL
        .into_iter()
        .find(|zone| zone.name().eq_ignore_ascii_case(name))
}

/// Print everything emitted since the last call, skipping the countdown
fn print_events(session: &mut GameSession) {
    for event in session.drain_events() {
        match event {
            KitchenEvent::TimeUpdated(_) => {}
            KitchenEvent::RecipeUpdated(Some(recipe)) => {
                let needs: Vec<&str> = recipe.ingredients.iter().map(|i| i.name()).collect();
                println!("  * New recipe: {} ({})", recipe.name, needs.join(", "));
            }
            other => println!("  * {:?}", other),
        }
    }
}

/// Display a brief status summary
fn display_status(session: &GameSession) {
    let recipe = session
        .current_recipe()
        .map(|r| r.name.as_str())
        .unwrap_or("-");
    println!();
    println!(
        "--- {:.1}s | {}s left | Score: {} | Recipe: {} ---",
        session.now().as_secs_f32(),
        session.time_remaining().as_secs_f32().ceil(),
        session.score(),
        recipe
    );

    for id in AgentId::ALL {
        let agent = session.agent(id);
        let held = session.held_item(id).map(|i| i.name().to_string()).unwrap_or_else(|| "nothing".into());
        let zone = agent.current_zone.map(|z| z.name()).unwrap_or("-");
        println!(
            "  {} at ({:.0}, {:.0}) in {} holding {}",
            id, agent.position.x, agent.position.y, zone, held
        );
    }
}

/// Display detailed status of every station
fn display_detailed_status(session: &GameSession) {
    println!();
    println!("=== Kitchen ({:?}) ===", session.phase());

    for zone in [ZoneId::CookingStation, ZoneId::Divider, ZoneId::CuttingBoard, ZoneId::LeftCuttingBoard] {
        let names: Vec<String> = session
            .placed(zone)
            .iter()
            .filter_map(|id| session.item(*id))
            .map(|item| {
                let state = if item.is_prepped() { "prepped" } else { "raw" };
                match session.item_time_remaining(item.id) {
                    Some(left) => format!("{} ({}, {:.1}s)", item.name(), state, left.as_secs_f32()),
                    None => format!("{} ({})", item.name(), state),
                }
            })
            .collect();
        println!("  {}: [{}]", zone, names.join(", "));
    }

    for board in [ZoneId::CuttingBoard, ZoneId::LeftCuttingBoard] {
        if let Some(readout) = session.board(board).and_then(|b| b.readout(session.now())) {
            println!("  {} cutting: {}s left", board, readout);
        }
    }

    for id in session.ready_meals() {
        if let Some(meal) = session.item(*id) {
            let left = session.item_time_remaining(*id).map(|t| t.as_secs_f32()).unwrap_or(0.0);
            println!("  Meal waiting: {} ({:.1}s to pick up)", meal.name(), left);
        }
    }

    println!("  Score history:");
    for entry in session.ledger().history() {
        println!("    {:>+4} {:?} at {:.1}s", entry.delta, entry.reason, entry.at.as_secs_f32());
    }
    println!();
}
