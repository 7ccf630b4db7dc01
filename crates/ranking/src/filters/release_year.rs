//! Filter to keep only films released in a given calendar year.

use crate::traits::Filter;
use catalog::{Film, Result};

/// Keeps films whose release date falls in `year`.
pub struct ReleaseYearFilter {
    year: i32,
}

impl ReleaseYearFilter {
    pub fn new(year: i32) -> Self {
        Self { year }
    }
}

impl Filter for ReleaseYearFilter {
    fn name(&self) -> &str {
        "ReleaseYearFilter"
    }

    fn apply(&self, films: Vec<Film>) -> Result<Vec<Film>> {
        Ok(films
            .into_iter()
            .filter(|film| film.release_year() == self.year)
            .collect())
    }
}
