//! The storage contract the relation and query components read through.
//!
//! Relations (friendships, likes) and query engines never touch tables
//! directly. They hold an `Arc<dyn EntityStore>` and ask it whether ids
//! are registered and for entity snapshots.

use crate::error::Result;
use crate::types::{Director, DirectorId, Film, FilmId, GenreId, User, UserId};

/// Narrow read interface over the entity tables.
///
/// Methods return owned snapshots rather than references: an implementation
/// may sit behind a lock or a connection, and callers must not keep a view
/// into its internals.
pub trait EntityStore: Send + Sync {
    fn get_user(&self, id: UserId) -> Result<User>;

    fn get_film(&self, id: FilmId) -> Result<Film>;

    fn genre_exists(&self, id: GenreId) -> bool;

    fn get_director(&self, id: DirectorId) -> Result<Director>;

    fn all_users(&self) -> Vec<User>;

    fn all_films(&self) -> Vec<Film>;

    fn user_exists(&self, id: UserId) -> bool {
        self.get_user(id).is_ok()
    }

    fn film_exists(&self, id: FilmId) -> bool {
        self.get_film(id).is_ok()
    }

    fn director_exists(&self, id: DirectorId) -> bool {
        self.get_director(id).is_ok()
    }
}
