use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitchenError {
    #[error("Unknown ingredient: {0}")]
    UnknownIngredient(String),

    #[error("Recipe catalog is empty")]
    EmptyCatalog,

    #[error("Invalid recipe {name}: {reason}")]
    InvalidRecipe { name: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KitchenError>;
