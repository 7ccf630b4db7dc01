//! Populate a service from a catalog directory.
//!
//! Seed files are parsed by `catalog::CatalogSeed` and then applied through
//! the service operations, so loaded data obeys the same rules as live
//! traffic: films reference known ratings, genres and directors, likes and
//! friendships reference registered users, and friendships are symmetric.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use catalog::{CatalogIndex, CatalogSeed, Result};

use crate::service::FilmorateService;

/// What a load applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub directors: usize,
    pub users: usize,
    pub films: usize,
    pub likes: usize,
    pub friendships: usize,
}

impl FilmorateService {
    /// Build a service over the standard reference data and load a catalog
    /// directory into it
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let start = Instant::now();
        let seed = CatalogSeed::load_from_dir(data_dir)?;

        let service = Self::new(Arc::new(CatalogIndex::with_reference_data()));
        let summary = service.apply_seed(seed)?;

        info!(
            "Loaded {} users, {} films, {} likes and {} friendships in {:.2?}",
            summary.users,
            summary.films,
            summary.likes,
            summary.friendships,
            start.elapsed()
        );
        Ok(service)
    }

    /// Apply parsed seed records in dependency order. The first record that
    /// breaks a rule aborts the load.
    pub fn apply_seed(&self, seed: CatalogSeed) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();

        for director in seed.directors {
            self.restore_director(director);
            summary.directors += 1;
        }
        for user in seed.users {
            self.restore_user(user)?;
            summary.users += 1;
        }
        for film in seed.films {
            self.restore_film(film)?;
            summary.films += 1;
        }
        for like in seed.likes {
            self.add_like(like.film_id, like.user_id)?;
            summary.likes += 1;
        }
        for friendship in seed.friendships {
            self.add_friend(friendship.user_id, friendship.friend_id)?;
            summary.friendships += 1;
        }

        Ok(summary)
    }
}
