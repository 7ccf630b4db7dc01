//! CatalogIndex - the in-memory entity store.
//!
//! Holds every entity table behind one `RwLock`. Readers take snapshots
//! (clones) so no lock guard ever escapes this module. A film update swaps
//! the whole record, genre and director sets included, under a single
//! write guard: readers see the old film or the new one, never a mix.

use crate::error::{CatalogError, Entity, Result};
use crate::store::EntityStore;
use crate::types::*;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    // Primary data stores
    users: HashMap<UserId, User>,
    films: HashMap<FilmId, Film>,

    // Reference data, small and usually listed in id order
    genres: BTreeMap<GenreId, Genre>,
    directors: BTreeMap<DirectorId, Director>,
    mpa: BTreeMap<MpaId, Mpa>,

    // Last id handed out per table
    last_user_id: UserId,
    last_film_id: FilmId,
    last_director_id: DirectorId,
}

/// Thread-safe in-memory implementation of [`EntityStore`].
#[derive(Debug, Default)]
pub struct CatalogIndex {
    tables: RwLock<Tables>,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Creates a CatalogIndex preloaded with the standard genres and Mpa ratings
    pub fn with_reference_data() -> Self {
        let index = Self::new();
        for (id, name) in (1..).zip(STANDARD_GENRES) {
            index.insert_genre(Genre {
                id,
                name: name.to_string(),
            });
        }
        for (id, name) in (1..).zip(STANDARD_MPA) {
            index.insert_mpa(Mpa {
                id,
                name: name.to_string(),
            });
        }
        index
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Register a new user under the next free id
    pub fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.tables.write();
        let id = next_id(&mut tables.last_user_id, Entity::User)?;
        let user = new_user.into_user(id);
        tables.users.insert(user.id, user.clone());
        debug!("Created user {}", user.id);
        Ok(user)
    }

    /// Insert a user under its own id, returning the record it replaced
    pub fn insert_user(&self, user: User) -> Option<User> {
        let mut tables = self.tables.write();
        tables.last_user_id = tables.last_user_id.max(user.id);
        tables.users.insert(user.id, user)
    }

    pub fn update_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write();
        match tables.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(CatalogError::not_found(Entity::User, user.id)),
        }
    }

    pub fn remove_user(&self, id: UserId) -> Result<User> {
        self.tables
            .write()
            .users
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found(Entity::User, id))
    }

    // -------------------------------------------------------------------------
    // Films
    // -------------------------------------------------------------------------

    /// Add a new film under the next free id
    pub fn create_film(&self, new_film: NewFilm) -> Result<Film> {
        let mut tables = self.tables.write();
        let id = next_id(&mut tables.last_film_id, Entity::Film)?;
        let film = new_film.into_film(id);
        tables.films.insert(film.id, film.clone());
        debug!("Created film {}", film.id);
        Ok(film)
    }

    /// Insert a film under its own id, returning the record it replaced
    pub fn insert_film(&self, film: Film) -> Option<Film> {
        let mut tables = self.tables.write();
        tables.last_film_id = tables.last_film_id.max(film.id);
        tables.films.insert(film.id, film)
    }

    /// Replace a film record as one unit, genre and director sets included
    pub fn update_film(&self, film: Film) -> Result<Film> {
        let mut tables = self.tables.write();
        match tables.films.get_mut(&film.id) {
            Some(existing) => {
                *existing = film.clone();
                Ok(film)
            }
            None => Err(CatalogError::not_found(Entity::Film, film.id)),
        }
    }

    pub fn remove_film(&self, id: FilmId) -> Result<Film> {
        self.tables
            .write()
            .films
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found(Entity::Film, id))
    }

    // -------------------------------------------------------------------------
    // Reference data
    // -------------------------------------------------------------------------

    pub fn insert_genre(&self, genre: Genre) -> Option<Genre> {
        self.tables.write().genres.insert(genre.id, genre)
    }

    pub fn insert_mpa(&self, mpa: Mpa) -> Option<Mpa> {
        self.tables.write().mpa.insert(mpa.id, mpa)
    }

    pub fn insert_director(&self, director: Director) -> Option<Director> {
        let mut tables = self.tables.write();
        tables.last_director_id = tables.last_director_id.max(director.id);
        tables.directors.insert(director.id, director)
    }

    /// Register a director under the next free id
    pub fn create_director(&self, name: impl Into<String>) -> Result<Director> {
        let mut tables = self.tables.write();
        let director = Director {
            id: next_id(&mut tables.last_director_id, Entity::Director)?,
            name: name.into(),
        };
        tables.directors.insert(director.id, director.clone());
        Ok(director)
    }

    pub fn get_genre(&self, id: GenreId) -> Result<Genre> {
        self.tables
            .read()
            .genres
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(Entity::Genre, id))
    }

    pub fn get_mpa(&self, id: MpaId) -> Result<Mpa> {
        self.tables
            .read()
            .mpa
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(Entity::Mpa, id))
    }

    pub fn mpa_exists(&self, id: MpaId) -> bool {
        self.tables.read().mpa.contains_key(&id)
    }

    pub fn all_genres(&self) -> Vec<Genre> {
        self.tables.read().genres.values().cloned().collect()
    }

    pub fn all_mpa(&self) -> Vec<Mpa> {
        self.tables.read().mpa.values().cloned().collect()
    }

    pub fn all_directors(&self) -> Vec<Director> {
        self.tables.read().directors.values().cloned().collect()
    }

    /// Get (users, films) counts for debugging/validation
    pub fn counts(&self) -> (usize, usize) {
        let tables = self.tables.read();
        (tables.users.len(), tables.films.len())
    }
}

/// Advance an id counter, failing once the id space is used up
fn next_id(last: &mut u32, entity: Entity) -> Result<u32> {
    let id = last
        .checked_add(1)
        .ok_or_else(|| CatalogError::invalid(format!("no {} ids left after {}", entity, last)))?;
    *last = id;
    Ok(id)
}

impl EntityStore for CatalogIndex {
    fn get_user(&self, id: UserId) -> Result<User> {
        self.tables
            .read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(Entity::User, id))
    }

    fn get_film(&self, id: FilmId) -> Result<Film> {
        self.tables
            .read()
            .films
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(Entity::Film, id))
    }

    fn genre_exists(&self, id: GenreId) -> bool {
        self.tables.read().genres.contains_key(&id)
    }

    fn get_director(&self, id: DirectorId) -> Result<Director> {
        self.tables
            .read()
            .directors
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(Entity::Director, id))
    }

    fn all_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.tables.read().users.values().cloned().collect();
        users.sort_unstable_by_key(|u| u.id);
        users
    }

    fn all_films(&self) -> Vec<Film> {
        let mut films: Vec<Film> = self.tables.read().films.values().cloned().collect();
        films.sort_unstable_by_key(|f| f.id);
        films
    }

    fn user_exists(&self, id: UserId) -> bool {
        self.tables.read().users.contains_key(&id)
    }

    fn film_exists(&self, id: FilmId) -> bool {
        self.tables.read().films.contains_key(&id)
    }

    fn director_exists(&self, id: DirectorId) -> bool {
        self.tables.read().directors.contains_key(&id)
    }
}
