//! # Overlap Engine
//!
//! Set-intersection queries between users, plus the director filmography
//! query that shares its ranking rules:
//! - common friends of two users
//! - films liked by both of two users, most liked first
//! - a director's films ordered by release date or by likes

use crate::filter_pipeline::FilterPipeline;
use crate::filters::DirectorFilter;
use crate::popularity::{RankedFilm, rank_by_likes, with_like_counts};
use catalog::{CatalogError, DirectorId, Entity, EntityStore, Film, Result, User, UserId};
use serde::{Deserialize, Serialize};
use social::{FriendshipGraph, LikeIndex};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ordering of a director's films
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortMode {
    /// Release date ascending
    ByYear,
    /// Like count descending
    ByLikes,
}

impl FromStr for SortMode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(SortMode::ByYear),
            "likes" => Ok(SortMode::ByLikes),
            _ => Err(CatalogError::invalid(format!("unknown sort mode '{}'", s))),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::ByYear => f.write_str("year"),
            SortMode::ByLikes => f.write_str("likes"),
        }
    }
}

pub struct OverlapEngine {
    store: Arc<dyn EntityStore>,
    friends: Arc<FriendshipGraph>,
    likes: Arc<LikeIndex>,
}

impl OverlapEngine {
    pub fn new(
        store: Arc<dyn EntityStore>,
        friends: Arc<FriendshipGraph>,
        likes: Arc<LikeIndex>,
    ) -> Self {
        Self {
            store,
            friends,
            likes,
        }
    }

    fn ensure_user(&self, user_id: UserId) -> Result<()> {
        if self.store.user_exists(user_id) {
            Ok(())
        } else {
            Err(CatalogError::not_found(Entity::User, user_id))
        }
    }

    /// Users who are friends with both, ordered by id
    #[instrument(skip(self))]
    pub fn common_friends(&self, user_id: UserId, other_id: UserId) -> Result<Vec<User>> {
        let ids = self.friends.common_friends(user_id, other_id)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| self.store.get_user(id).ok())
            .collect())
    }

    /// Films both users liked, most liked first, ties by ascending id
    #[instrument(skip(self))]
    pub fn common_films(&self, user_id: UserId, other_id: UserId) -> Result<Vec<RankedFilm>> {
        self.ensure_user(user_id)?;
        self.ensure_user(other_id)?;

        let shared = self.likes.films_liked_by_both(user_id, other_id);
        let films: Vec<Film> = shared
            .into_iter()
            .filter_map(|id| self.store.get_film(id).ok())
            .collect();

        debug!("Users {} and {} both liked {} films", user_id, other_id, films.len());
        Ok(rank_by_likes(films, &self.likes))
    }

    /// Films of a registered director in the requested order.
    ///
    /// Ties (same release date, or same like count) fall back to ascending id.
    #[instrument(skip(self))]
    pub fn films_by_director(&self, director_id: DirectorId, sort: SortMode) -> Result<Vec<RankedFilm>> {
        self.store.get_director(director_id)?;

        let films = FilterPipeline::new()
            .add_filter(DirectorFilter::new(director_id))
            .apply(self.store.all_films())?;

        let ranked = match sort {
            SortMode::ByLikes => rank_by_likes(films, &self.likes),
            SortMode::ByYear => {
                let mut ranked = with_like_counts(films, &self.likes);
                ranked.sort_by_key(|r| (r.film.release_date, r.film.id));
                ranked
            }
        };

        debug!("Director {} has {} films", director_id, ranked.len());
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use catalog::{ErrorKind, FilmId};

    fn ids(ranked: &[RankedFilm]) -> Vec<FilmId> {
        ranked.iter().map(RankedFilm::id).collect()
    }

    fn engine(fx: &Fixture) -> OverlapEngine {
        OverlapEngine::new(fx.store.clone(), fx.friends.clone(), fx.likes.clone())
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("YEAR".parse::<SortMode>().unwrap(), SortMode::ByYear);
        assert_eq!("likes".parse::<SortMode>().unwrap(), SortMode::ByLikes);
        assert_eq!(
            "rating".parse::<SortMode>().unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_common_films_ranked_by_total_likes() {
        let fx = Fixture::new();
        let users = fx.users(3);
        let f1 = fx.film("Film1", "1970-01-01", &[], &[]);
        let f2 = fx.film("Film2", "1980-01-01", &[], &[]);
        let f3 = fx.film("Film3", "1990-01-01", &[], &[]);
        fx.like(f1, &users[..2]);
        fx.like(f2, &users);
        fx.like(f3, &users[..1]);

        let common = engine(&fx).common_films(users[0], users[1]).unwrap();

        assert_eq!(ids(&common), vec![f2, f1]);
        assert_eq!(common[0].likes, 3);
        assert_eq!(common[1].likes, 2);
    }

    #[test]
    fn test_common_films_requires_registered_users() {
        let fx = Fixture::new();
        let users = fx.users(1);
        let err = engine(&fx).common_films(users[0], 77).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_common_friends_returns_users() {
        let fx = Fixture::new();
        let users = fx.users(4);
        fx.friends.add_friend(users[0], users[2]).unwrap();
        fx.friends.add_friend(users[1], users[2]).unwrap();
        fx.friends.add_friend(users[0], users[3]).unwrap();

        let common = engine(&fx).common_friends(users[0], users[1]).unwrap();

        assert_eq!(common.len(), 1);
        assert_eq!(common[0].id, users[2]);
        assert_eq!(common[0].login, "Login3");
    }

    #[test]
    fn test_director_films_by_year_and_likes() {
        let fx = Fixture::new();
        let users = fx.users(3);
        let director = fx.director("DirectorName");
        let other = fx.director("DirectorName2");
        let f1 = fx.film("Film1", "1970-01-01", &[], &[director]);
        let f2 = fx.film("Film2", "1960-01-01", &[], &[director]);
        let f3 = fx.film("Film3", "1990-01-01", &[], &[other]);
        fx.like(f1, &users);
        fx.like(f2, &users[..1]);
        fx.like(f3, &users);

        let by_year = engine(&fx).films_by_director(director, SortMode::ByYear).unwrap();
        assert_eq!(ids(&by_year), vec![f2, f1]);

        let by_likes = engine(&fx).films_by_director(director, SortMode::ByLikes).unwrap();
        assert_eq!(ids(&by_likes), vec![f1, f2]);
    }

    #[test]
    fn test_unknown_director_is_not_found() {
        let fx = Fixture::new();
        let err = engine(&fx).films_by_director(9, SortMode::ByYear).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { entity: Entity::Director, id: 9 }));
    }
}
