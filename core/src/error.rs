//! Error values returned across the core boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecipeError {
    /// Caller-correctable input: blank title, missing ingredients, bad target mass.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No ingredient is both flour-named and in a basis group.
    #[error("No basis flour found: nothing to scale against")]
    NoBasisFlour,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl RecipeError {
    /// Stable category name for collaborators that need to tell errors apart.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NoBasisFlour => "no_basis_flour",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage",
        }
    }
}
