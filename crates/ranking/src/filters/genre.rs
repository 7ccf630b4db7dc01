//! Filter to keep only films tagged with a given genre.

use crate::traits::Filter;
use catalog::{Film, GenreId, Result};

/// Keeps films whose genre set contains `genre_id`.
pub struct GenreFilter {
    genre_id: GenreId,
}

impl GenreFilter {
    pub fn new(genre_id: GenreId) -> Self {
        Self { genre_id }
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply(&self, films: Vec<Film>) -> Result<Vec<Film>> {
        Ok(films
            .into_iter()
            .filter(|film| film.has_genre(self.genre_id))
            .collect())
    }
}
