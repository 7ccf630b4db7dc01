//! The FilterPipeline chains filters with AND semantics.
//!
//! A film survives the pipeline only if every filter keeps it.

use crate::traits::Filter;
use catalog::{Film, Result};
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(GenreFilter::new(1))
///     .add_filter(ReleaseYearFilter::new(1990));
///
/// let films = pipeline.apply(store.all_films())?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Add a filter only when one is given
    pub fn add_optional(self, filter: Option<impl Filter + 'static>) -> Self {
        match filter {
            Some(filter) => self.add_filter(filter),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the films.
    ///
    /// # Returns
    /// * `Ok(Vec<Film>)` - The films that passed every filter
    /// * `Err` - If any filter fails
    pub fn apply(&self, films: Vec<Film>) -> Result<Vec<Film>> {
        let mut current = films;
        for filter in &self.filters {
            debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current)?;
            debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{GenreFilter, ReleaseYearFilter};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn film(id: u32, year: i32, genres: &[u32]) -> Film {
        Film {
            id,
            title: format!("Film{}", id),
            description: String::new(),
            release_date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            duration: 100,
            mpa: 1,
            genres: genres.iter().copied().collect(),
            directors: BTreeSet::new(),
        }
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let films = vec![film(1, 1990, &[1]), film(2, 1991, &[2])];

        let filtered = pipeline.apply(films).unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_filters_combine_with_and() {
        let pipeline = FilterPipeline::new()
            .add_filter(GenreFilter::new(2))
            .add_filter(ReleaseYearFilter::new(1990));

        let films = vec![
            film(1, 1990, &[1]),    // wrong genre
            film(2, 1990, &[2, 3]), // both match
            film(3, 1991, &[2]),    // wrong year
        ];

        let filtered = pipeline.apply(films).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_optional_filters() {
        let pipeline = FilterPipeline::new()
            .add_optional(None::<GenreFilter>)
            .add_optional(Some(ReleaseYearFilter::new(1990)));

        assert_eq!(pipeline.len(), 1);
    }
}
