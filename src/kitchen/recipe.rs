//! Recipes - what the cooking station has to assemble
//!
//! The recipe manager owns the current target recipe and a seeded RNG so a
//! round's sequence of recipes is reproducible.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{KitchenError, Result};
use crate::kitchen::ingredient::{IngredientKind, Item};

/// A target dish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    /// Required ingredients; order is irrelevant
    pub ingredients: Vec<IngredientKind>,
    /// Identifier of the produced meal
    pub result: String,
    /// Delivery value carried by the produced meal
    pub points: Option<i32>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, ingredients: Vec<IngredientKind>, result: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients,
            result: result.into(),
            points: None,
        }
    }

    pub fn with_points(mut self, points: i32) -> Self {
        self.points = Some(points);
        self
    }

    pub fn requires(&self, kind: IngredientKind) -> bool {
        self.ingredients.contains(&kind)
    }
}

/// Does the cooking station's content satisfy `recipe`?
///
/// True iff every placed item is prepped, every required ingredient has a
/// placed item with the same (case-insensitive) name, and the counts match.
/// Multiplicity beyond the count check is not verified.
pub fn check_recipe_completion(recipe: &Recipe, placed: &[&Item]) -> bool {
    if !placed.iter().all(|item| item.is_prepped()) {
        return false;
    }

    let all_present = recipe.ingredients.iter().all(|required| {
        placed
            .iter()
            .any(|item| item.name().eq_ignore_ascii_case(required.name()))
    });

    all_present && placed.len() == recipe.ingredients.len()
}

/// Catalog of all available recipes
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in menu
    pub fn with_defaults() -> Self {
        use IngredientKind::*;

        let mut catalog = Self::new();
        catalog.add(Recipe::new("Taco", vec![Tortilla, Meat, Tomato], "taco"));
        catalog.add(Recipe::new("Quesadilla", vec![Tortilla, Cheese], "quesadilla"));
        catalog.add(Recipe::new("Guacamole", vec![Avocado, Tomato], "guacamole"));
        catalog.add(
            Recipe::new("Burrito", vec![Tortilla, Meat, Cheese, Avocado], "burrito").with_points(60),
        );
        catalog
    }

    pub fn add(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }

    /// Get a recipe by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Load recipes from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse recipes from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let toml_data: TomlRecipes = toml::from_str(content)?;

        let mut catalog = Self::new();
        for recipe in toml_data.recipes {
            catalog.add(recipe.into_recipe()?);
        }
        if catalog.is_empty() {
            return Err(KitchenError::EmptyCatalog);
        }
        Ok(catalog)
    }
}

/// TOML representation of a recipes file
#[derive(Debug, Deserialize)]
struct TomlRecipes {
    #[serde(default)]
    recipes: Vec<TomlRecipe>,
}

#[derive(Debug, Deserialize)]
struct TomlRecipe {
    name: String,
    ingredients: Vec<String>,
    result: String,
    points: Option<i32>,
}

impl TomlRecipe {
    fn into_recipe(self) -> Result<Recipe> {
        if self.ingredients.is_empty() {
            return Err(KitchenError::InvalidRecipe {
                name: self.name,
                reason: "no ingredients".into(),
            });
        }

        let ingredients = self
            .ingredients
            .iter()
            .map(|name| name.parse::<IngredientKind>())
            .collect::<Result<Vec<_>>>()?;

        Ok(Recipe {
            name: self.name,
            ingredients,
            result: self.result,
            points: self.points,
        })
    }
}

/// Owns the current target recipe
#[derive(Debug, Clone)]
pub struct RecipeManager {
    catalog: RecipeCatalog,
    current: Option<Recipe>,
    rng: ChaCha8Rng,
}

impl RecipeManager {
    pub fn new(catalog: RecipeCatalog, seed: u64) -> Result<Self> {
        if catalog.is_empty() {
            return Err(KitchenError::EmptyCatalog);
        }
        Ok(Self {
            catalog,
            current: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    pub fn current(&self) -> Option<&Recipe> {
        self.current.as_ref()
    }

    /// Pick a recipe uniformly at random, ignoring the previous one
    pub fn select_random(&mut self) -> &Recipe {
        let index = self.rng.gen_range(0..self.catalog.len());
        self.current.insert(self.catalog.recipes[index].clone())
    }

    /// Replace the current recipe with a different one whenever the catalog
    /// has more than one entry (rejection sampling)
    pub fn select_next(&mut self) -> &Recipe {
        let previous = self.current.as_ref().map(|r| r.name.clone());
        let mut index = self.rng.gen_range(0..self.catalog.len());
        if self.catalog.len() > 1 {
            while Some(&self.catalog.recipes[index].name) == previous.as_ref() {
                index = self.rng.gen_range(0..self.catalog.len());
            }
        }
        self.current.insert(self.catalog.recipes[index].clone())
    }

    /// Force a specific recipe as the target
    pub fn set_current(&mut self, recipe: Recipe) {
        self.current = Some(recipe);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Check `placed` against the current recipe (false when there is none)
    pub fn check_completion(&self, placed: &[&Item]) -> bool {
        self.current
            .as_ref()
            .map(|recipe| check_recipe_completion(recipe, placed))
            .unwrap_or(false)
    }
}
