//! Filter to keep only films made by a given director.

use crate::traits::Filter;
use catalog::{DirectorId, Film, Result};

pub struct DirectorFilter {
    director_id: DirectorId,
}

impl DirectorFilter {
    pub fn new(director_id: DirectorId) -> Self {
        Self { director_id }
    }
}

impl Filter for DirectorFilter {
    fn name(&self) -> &str {
        "DirectorFilter"
    }

    fn apply(&self, films: Vec<Film>) -> Result<Vec<Film>> {
        Ok(films
            .into_iter()
            .filter(|film| film.has_director(self.director_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    #[test]
    fn test_director_filter() {
        let make = |id: u32, directors: &[DirectorId]| Film {
            id,
            title: format!("Film{}", id),
            description: String::new(),
            release_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            duration: 100,
            mpa: 1,
            genres: BTreeSet::new(),
            directors: directors.iter().copied().collect(),
        };

        let films = vec![make(1, &[1]), make(2, &[1, 2]), make(3, &[2])];
        let filtered = DirectorFilter::new(2).apply(films).unwrap();

        let ids: Vec<u32> = filtered.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
