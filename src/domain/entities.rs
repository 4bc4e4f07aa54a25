//! Catalog entities and the rules a rating must satisfy before it is stored.

pub use reelshelf_api_types::{CatalogItem, NewRating, Rating};

use crate::domain::error::DomainError;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;
pub const MAX_COMMENT_CHARS: usize = 2000;

/// Check score bounds and comment length. Item existence is the store's concern.
pub fn validate_new_rating(rating: &NewRating) -> Result<(), DomainError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&rating.score) {
        return Err(DomainError::validation(format!(
            "score {} is outside {MIN_SCORE}..={MAX_SCORE}",
            rating.score
        )));
    }

    let comment_chars = rating.comment.chars().count();
    if comment_chars > MAX_COMMENT_CHARS {
        return Err(DomainError::validation(format!(
            "comment has {comment_chars} characters, limit is {MAX_COMMENT_CHARS}"
        )));
    }

    Ok(())
}
