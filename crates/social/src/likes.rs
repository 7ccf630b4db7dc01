//! Like Index - the bipartite relation between users and the films they like.
//!
//! A like is a (film, user) membership: liking twice counts once. Both
//! directions (film -> users, user -> films) are kept under one lock so that
//! a like count and a user's liked set always agree.

use catalog::{CatalogError, Entity, EntityStore, FilmId, Result, UserId};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
struct LikeTables {
    /// Users who liked each film
    by_film: HashMap<FilmId, HashSet<UserId>>,
    /// Films liked by each user
    by_user: HashMap<UserId, HashSet<FilmId>>,
}

impl LikeTables {
    fn unlink(&mut self, film_id: FilmId, user_id: UserId) -> bool {
        let removed = remove_member(&mut self.by_film, film_id, user_id);
        remove_member(&mut self.by_user, user_id, film_id);
        removed
    }
}

fn remove_member(map: &mut HashMap<u32, HashSet<u32>>, key: u32, member: u32) -> bool {
    let Some(members) = map.get_mut(&key) else {
        return false;
    };
    let removed = members.remove(&member);
    if members.is_empty() {
        map.remove(&key);
    }
    removed
}

/// Membership index of likes, with derived per-film counts
pub struct LikeIndex {
    store: Arc<dyn EntityStore>,
    tables: RwLock<LikeTables>,
}

impl LikeIndex {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            tables: RwLock::new(LikeTables::default()),
        }
    }

    /// Record that a user likes a film. Adding the same like twice is a no-op.
    #[instrument(skip(self))]
    pub fn add_like(&self, film_id: FilmId, user_id: UserId) -> Result<()> {
        if !self.store.film_exists(film_id) {
            return Err(CatalogError::not_found(Entity::Film, film_id));
        }
        if !self.store.user_exists(user_id) {
            return Err(CatalogError::not_found(Entity::User, user_id));
        }

        let mut tables = self.tables.write();
        let added = tables.by_film.entry(film_id).or_default().insert(user_id);
        tables.by_user.entry(user_id).or_default().insert(film_id);

        if added {
            info!("User {} liked film {}", user_id, film_id);
        }
        Ok(())
    }

    /// Withdraw a like. Returns whether a like was actually removed.
    #[instrument(skip(self))]
    pub fn remove_like(&self, film_id: FilmId, user_id: UserId) -> bool {
        let removed = self.tables.write().unlink(film_id, user_id);
        if removed {
            info!("User {} no longer likes film {}", user_id, film_id);
        } else {
            debug!("User {} had not liked film {}", user_id, film_id);
        }
        removed
    }

    /// Number of distinct users who liked a film (0 if none)
    pub fn like_count(&self, film_id: FilmId) -> usize {
        self.tables
            .read()
            .by_film
            .get(&film_id)
            .map_or(0, HashSet::len)
    }

    /// Like counts for many films, read under a single guard
    pub fn like_counts(&self, film_ids: &[FilmId]) -> HashMap<FilmId, usize> {
        let tables = self.tables.read();
        film_ids
            .iter()
            .map(|id| (*id, tables.by_film.get(id).map_or(0, HashSet::len)))
            .collect()
    }

    pub fn films_liked_by(&self, user_id: UserId) -> BTreeSet<FilmId> {
        self.tables
            .read()
            .by_user
            .get(&user_id)
            .map(|films| films.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Films liked by both users, read under a single guard
    pub fn films_liked_by_both(&self, user_id: UserId, other_id: UserId) -> BTreeSet<FilmId> {
        let tables = self.tables.read();
        match (tables.by_user.get(&user_id), tables.by_user.get(&other_id)) {
            (Some(first), Some(second)) => first.intersection(second).copied().collect(),
            _ => BTreeSet::new(),
        }
    }

    pub fn has_liked(&self, film_id: FilmId, user_id: UserId) -> bool {
        self.tables
            .read()
            .by_film
            .get(&film_id)
            .is_some_and(|users| users.contains(&user_id))
    }

    /// Drop every like a user gave. Returns how many were removed.
    pub fn forget_user(&self, user_id: UserId) -> usize {
        let mut tables = self.tables.write();
        let Some(films) = tables.by_user.remove(&user_id) else {
            return 0;
        };
        for &film_id in &films {
            remove_member(&mut tables.by_film, film_id, user_id);
        }
        films.len()
    }

    /// Drop every like a film received. Returns how many were removed.
    pub fn forget_film(&self, film_id: FilmId) -> usize {
        let mut tables = self.tables.write();
        let Some(users) = tables.by_film.remove(&film_id) else {
            return 0;
        };
        for &user_id in &users {
            remove_member(&mut tables.by_user, user_id, film_id);
        }
        users.len()
    }

    pub fn total_likes(&self) -> usize {
        self.tables.read().by_film.values().map(HashSet::len).sum()
    }
}
