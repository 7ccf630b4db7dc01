//! Core traits for the ranking pipeline.
//!
//! This module defines the Filter trait that lets query engines compose
//! film selections (genre, release year, director) before ranking.

use catalog::{Film, Result};

/// Core trait for narrowing a set of films.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared between request threads
/// - Filters take ownership of the Vec<Film> and return the kept films
///   in their original order
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of films.
    ///
    /// # Returns
    /// * `Ok(Vec<Film>)` - The films that pass the filter
    /// * `Err` - If filtering fails
    fn apply(&self, films: Vec<Film>) -> Result<Vec<Film>>;
}
