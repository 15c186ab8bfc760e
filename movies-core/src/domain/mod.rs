mod ids;
mod movie;
mod person;
mod related;

pub use ids::{MovieId, PersonId};
pub use movie::Movie;
pub use person::Person;
pub use related::Related;

use crate::common::error::{MovieError, Result};

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn required_text(field: &str, value: impl Into<String>) -> Result<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MovieError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
