//! Kitchen layer - zones, items, stations, recipes and score

pub mod cutting;
pub mod divider;
pub mod ingredient;
pub mod recipe;
pub mod score;
pub mod zones;

pub use cutting::{CuttingBoard, CuttingState, FinishedCut};
pub use divider::{DividerSlot, DividerSlots, DIVIDER_SLOT_COUNT};
pub use ingredient::{IngredientKind, IngredientState, Item, ItemKind, ItemStore, Location, Meal};
pub use recipe::{check_recipe_completion, Recipe, RecipeCatalog, RecipeManager};
pub use score::{ScoreEntry, ScoreLedger, ScoreReason};
pub use zones::{create_zones, ZoneId, ZoneRegistry};
