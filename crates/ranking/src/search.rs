//! # Search Engine
//!
//! Case-insensitive substring search over film titles and director names.
//!
//! ## Algorithm
//! 1. Lower-case the query once
//! 2. If directors are in scope, resolve and lower-case the names of every
//!    director referenced by a film
//! 3. Keep a film if the query is a substring of its title (title scope) or
//!    of any of its directors' names (director scope); the combined scope is
//!    the union of both
//! 4. Rank the matches by like count, ties by ascending film id

use crate::popularity::{RankedFilm, rank_by_likes};
use catalog::{CatalogError, DirectorId, EntityStore, Film, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use social::LikeIndex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Which film fields a search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchScope {
    Title,
    Director,
    TitleAndDirector,
}

impl SearchScope {
    pub fn includes_title(self) -> bool {
        matches!(self, SearchScope::Title | SearchScope::TitleAndDirector)
    }

    pub fn includes_director(self) -> bool {
        matches!(self, SearchScope::Director | SearchScope::TitleAndDirector)
    }
}

impl FromStr for SearchScope {
    type Err = CatalogError;

    /// Accepts `title`, `director` and either order of `title,director`,
    /// ignoring case and whitespace around each part.
    fn from_str(s: &str) -> Result<Self> {
        let mut title = false;
        let mut director = false;
        for part in s.split(',') {
            match part.trim().to_lowercase().as_str() {
                "title" => title = true,
                "director" => director = true,
                _ => {
                    return Err(CatalogError::invalid(format!(
                        "unknown search field selector '{}'",
                        s
                    )));
                }
            }
        }
        Ok(match (title, director) {
            (true, true) => SearchScope::TitleAndDirector,
            (true, false) => SearchScope::Title,
            _ => SearchScope::Director,
        })
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchScope::Title => f.write_str("title"),
            SearchScope::Director => f.write_str("director"),
            SearchScope::TitleAndDirector => f.write_str("title,director"),
        }
    }
}

/// Substring search over films, popularity ordered
pub struct SearchEngine {
    store: Arc<dyn EntityStore>,
    likes: Arc<LikeIndex>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn EntityStore>, likes: Arc<LikeIndex>) -> Self {
        Self { store, likes }
    }

    #[instrument(skip(self))]
    pub fn search(&self, query: &str, scope: SearchScope) -> Result<Vec<RankedFilm>> {
        let needle = query.to_lowercase();
        let films = self.store.all_films();

        let director_names = if scope.includes_director() {
            self.director_names(&films)
        } else {
            HashMap::new()
        };

        let matched: Vec<Film> = films
            .into_par_iter()
            .filter(|film| {
                let by_title =
                    scope.includes_title() && film.title.to_lowercase().contains(&needle);
                by_title
                    || (scope.includes_director()
                        && film.directors.iter().any(|id| {
                            director_names
                                .get(id)
                                .is_some_and(|name| name.contains(&needle))
                        }))
            })
            .collect();

        debug!("Search '{}' by {} matched {} films", query, scope, matched.len());
        Ok(rank_by_likes(matched, &self.likes))
    }

    /// Lower-cased names of every director referenced by `films`.
    ///
    /// Ids the store no longer knows are skipped: they cannot match anything.
    fn director_names(&self, films: &[Film]) -> HashMap<DirectorId, String> {
        let mut names = HashMap::new();
        for id in films.iter().flat_map(|film| film.directors.iter()) {
            if names.contains_key(id) {
                continue;
            }
            if let Ok(director) = self.store.get_director(*id) {
                names.insert(*id, director.name.to_lowercase());
            }
        }
        names
    }
}
