//! # Ranking Engine
//!
//! Answers "most popular films" queries: select the films that pass every
//! requested filter, attach their like counts and order by popularity.
//!
//! ## Ordering
//! Like count descending, ties broken by ascending film id. Every ordered
//! result in this crate goes through [`rank_by_likes`], so the same films
//! always come back in the same order.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{GenreFilter, ReleaseYearFilter};
use catalog::{EntityStore, Film, FilmId, GenreId, Result};
use serde::{Deserialize, Serialize};
use social::LikeIndex;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A film together with its like count at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedFilm {
    #[serde(flatten)]
    pub film: Film,
    pub likes: usize,
}

impl RankedFilm {
    pub fn id(&self) -> FilmId {
        self.film.id
    }
}

/// Attach like counts without reordering
pub(crate) fn with_like_counts(films: Vec<Film>, likes: &LikeIndex) -> Vec<RankedFilm> {
    let ids: Vec<FilmId> = films.iter().map(|f| f.id).collect();
    let counts = likes.like_counts(&ids);
    films
        .into_iter()
        .map(|film| {
            let likes = counts.get(&film.id).copied().unwrap_or(0);
            RankedFilm { film, likes }
        })
        .collect()
}

/// Attach like counts and sort by (likes desc, id asc)
pub fn rank_by_likes(films: Vec<Film>, likes: &LikeIndex) -> Vec<RankedFilm> {
    let mut ranked = with_like_counts(films, likes);
    ranked.sort_by_key(|r| (Reverse(r.likes), r.film.id));
    ranked
}

/// Parameters of a popularity query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopularQuery {
    /// Maximum number of films to return; 0 returns nothing
    pub limit: usize,
    pub genre_id: Option<GenreId>,
    /// Calendar year of release
    pub year: Option<i32>,
}

impl PopularQuery {
    pub fn top(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn with_genre(mut self, genre_id: GenreId) -> Self {
        self.genre_id = Some(genre_id);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    fn pipeline(&self) -> FilterPipeline {
        FilterPipeline::new()
            .add_optional(self.genre_id.map(GenreFilter::new))
            .add_optional(self.year.map(ReleaseYearFilter::new))
    }
}

/// Computes popularity-ordered film lists
pub struct RankingEngine {
    store: Arc<dyn EntityStore>,
    likes: Arc<LikeIndex>,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn EntityStore>, likes: Arc<LikeIndex>) -> Self {
        Self { store, likes }
    }

    /// Top `query.limit` films by like count among those matching every filter.
    ///
    /// A zero limit or an unregistered genre yields an empty list rather
    /// than an error: the query simply matches nothing.
    #[instrument(skip(self))]
    pub fn popular(&self, query: &PopularQuery) -> Result<Vec<RankedFilm>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        if let Some(genre_id) = query.genre_id {
            if !self.store.genre_exists(genre_id) {
                debug!("Genre {} is not registered, nothing to rank", genre_id);
                return Ok(Vec::new());
            }
        }

        let films = query.pipeline().apply(self.store.all_films())?;
        let mut ranked = rank_by_likes(films, &self.likes);
        ranked.truncate(query.limit);

        debug!("Returning {} popular films", ranked.len());
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    fn ids(ranked: &[RankedFilm]) -> Vec<FilmId> {
        ranked.iter().map(RankedFilm::id).collect()
    }

    #[test]
    fn test_popular_orders_by_likes() {
        let fx = Fixture::new();
        let users = fx.users(3);
        let a = fx.film("A", "1970-01-01", &[], &[]);
        let b = fx.film("B", "1980-01-01", &[], &[]);
        let c = fx.film("C", "1990-01-01", &[], &[]);
        fx.like(a, &users[..1]);
        fx.like(b, &users);
        fx.like(c, &users[..2]);

        let engine = RankingEngine::new(fx.store.clone(), fx.likes.clone());
        let ranked = engine.popular(&PopularQuery::top(10)).unwrap();

        assert_eq!(ids(&ranked), vec![b, c, a]);
        assert_eq!(ranked[0].likes, 3);
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let fx = Fixture::new();
        let users = fx.users(1);
        let first = fx.film("First", "1970-01-01", &[], &[]);
        let second = fx.film("Second", "1970-01-01", &[], &[]);
        let third = fx.film("Third", "1970-01-01", &[], &[]);
        fx.like(third, &users);

        let engine = RankingEngine::new(fx.store.clone(), fx.likes.clone());
        let ranked = engine.popular(&PopularQuery::top(10)).unwrap();

        assert_eq!(ids(&ranked), vec![third, first, second]);
    }

    #[test]
    fn test_genre_filter_and_limit() {
        let fx = Fixture::new();
        let users = fx.users(3);
        // Genre 1 = Comedy, 2 = Drama
        let a = fx.film("A", "1970-01-01", &[1], &[]);
        let b = fx.film("B", "1980-01-01", &[1], &[]);
        let c = fx.film("C", "1990-01-01", &[2], &[]);
        fx.like(a, &users);
        fx.like(b, &users[..2]);
        fx.like(c, &users[..1]);

        let engine = RankingEngine::new(fx.store.clone(), fx.likes.clone());

        let comedies = engine.popular(&PopularQuery::top(10).with_genre(1)).unwrap();
        assert_eq!(ids(&comedies), vec![a, b]);

        let top_comedy = engine.popular(&PopularQuery::top(1).with_genre(1)).unwrap();
        assert_eq!(ids(&top_comedy), vec![a]);
    }

    #[test]
    fn test_genre_and_year_combine() {
        let fx = Fixture::new();
        let users = fx.users(3);
        fx.film("Old drama", "1970-01-01", &[2], &[]);
        let d1 = fx.film("Drama 1990", "1990-10-01", &[2], &[]);
        let d2 = fx.film("Drama 1990 b", "1990-10-10", &[2], &[]);
        let comedy = fx.film("Comedy 1990", "1990-01-01", &[1], &[]);
        fx.like(d1, &users[..2]);
        fx.like(d2, &users);
        fx.like(comedy, &users);

        let engine = RankingEngine::new(fx.store.clone(), fx.likes.clone());
        let ranked = engine
            .popular(&PopularQuery::top(10).with_genre(2).with_year(1990))
            .unwrap();

        assert_eq!(ids(&ranked), vec![d2, d1]);
    }

    #[test]
    fn test_degenerate_queries_are_empty() {
        let fx = Fixture::new();
        fx.film("A", "1970-01-01", &[1], &[]);
        let engine = RankingEngine::new(fx.store.clone(), fx.likes.clone());

        assert!(engine.popular(&PopularQuery::top(0)).unwrap().is_empty());
        assert!(engine.popular(&PopularQuery::top(5).with_genre(42)).unwrap().is_empty());
        assert!(engine.popular(&PopularQuery::top(5).with_year(2100)).unwrap().is_empty());
    }
}
