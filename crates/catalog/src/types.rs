//! Core domain types for the film catalog.
//!
//! Users and films are the two owned entities; genres, directors and
//! Mpa ratings are reference values that films point to by id. Relations
//! between entities (friendships, likes) are not stored here: they are
//! owned by the `social` crate so that their invariants have one home.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (assigned by the store on creation)
pub type UserId = u32;

/// Unique identifier for a film (assigned by the store on creation)
pub type FilmId = u32;

pub type GenreId = u32;

pub type DirectorId = u32;

pub type MpaId = u32;

// =============================================================================
// Users
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Login, never contains whitespace
    pub login: String,
    /// Display name, equal to `login` when none was given
    pub name: String,
    pub birthday: NaiveDate,
}

/// User data submitted for registration, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub login: String,
    pub name: Option<String>,
    pub birthday: NaiveDate,
}

impl NewUser {
    pub fn into_user(self, id: UserId) -> User {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.login.clone(),
        };
        User {
            id,
            email: self.email,
            login: self.login,
            name,
            birthday: self.birthday,
        }
    }
}

// =============================================================================
// Films
// =============================================================================

/// A film in the catalog.
///
/// Genre and director sets are `BTreeSet`s so that iteration order is by id,
/// which keeps serialized output stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// Duration in minutes
    pub duration: u32,
    pub mpa: MpaId,
    pub genres: BTreeSet<GenreId>,
    pub directors: BTreeSet<DirectorId>,
}

impl Film {
    /// Calendar year of the release date
    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }

    pub fn has_genre(&self, genre_id: GenreId) -> bool {
        self.genres.contains(&genre_id)
    }

    pub fn has_director(&self, director_id: DirectorId) -> bool {
        self.directors.contains(&director_id)
    }
}

/// Film data submitted for creation, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFilm {
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: u32,
    pub mpa: MpaId,
    #[serde(default)]
    pub genres: BTreeSet<GenreId>,
    #[serde(default)]
    pub directors: BTreeSet<DirectorId>,
}

impl NewFilm {
    pub fn into_film(self, id: FilmId) -> Film {
        Film {
            id,
            title: self.title,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa: self.mpa,
            genres: self.genres,
            directors: self.directors,
        }
    }
}

// =============================================================================
// Reference entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Director {
    pub id: DirectorId,
    pub name: String,
}

/// Content rating attached to exactly one per film (G, PG, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mpa {
    pub id: MpaId,
    pub name: String,
}

/// Standard genres, seeded with ids 1..=6
pub const STANDARD_GENRES: [&str; 6] = [
    "Comedy",
    "Drama",
    "Cartoon",
    "Thriller",
    "Documentary",
    "Action",
];

/// Standard Mpa ratings, seeded with ids 1..=5
pub const STANDARD_MPA: [&str; 5] = ["G", "PG", "PG-13", "R", "NC-17"];

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_blank_name_defaults_to_login() {
        let user = NewUser {
            email: "a@example.com".to_string(),
            login: "alice".to_string(),
            name: Some("   ".to_string()),
            birthday: date(1990, 1, 1),
        }
        .into_user(5);

        assert_eq!(user.id, 5);
        assert_eq!(user.name, "alice");
    }

    #[test]
    fn test_given_name_is_kept() {
        let user = NewUser {
            email: "a@example.com".to_string(),
            login: "alice".to_string(),
            name: Some("Alice".to_string()),
            birthday: date(1990, 1, 1),
        }
        .into_user(1);

        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn test_film_release_year_and_membership() {
        let film = NewFilm {
            title: "Film1".to_string(),
            description: String::new(),
            release_date: date(1990, 10, 1),
            duration: 140,
            mpa: 1,
            genres: BTreeSet::from([2]),
            directors: BTreeSet::from([9]),
        }
        .into_film(3);

        assert_eq!(film.release_year(), 1990);
        assert!(film.has_genre(2));
        assert!(!film.has_genre(1));
        assert!(film.has_director(9));
    }
}
