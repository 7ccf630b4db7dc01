//! Shared fixture for the engine unit tests.

use catalog::{CatalogIndex, DirectorId, EntityStore, FilmId, GenreId, NewFilm, NewUser, UserId};
use chrono::NaiveDate;
use social::{FriendshipGraph, LikeIndex};
use std::sync::Arc;

pub(crate) struct Fixture {
    pub index: Arc<CatalogIndex>,
    pub store: Arc<dyn EntityStore>,
    pub friends: Arc<FriendshipGraph>,
    pub likes: Arc<LikeIndex>,
}

impl Fixture {
    pub fn new() -> Self {
        let index = Arc::new(CatalogIndex::with_reference_data());
        let store: Arc<dyn EntityStore> = index.clone();
        Self {
            friends: Arc::new(FriendshipGraph::new(store.clone())),
            likes: Arc::new(LikeIndex::new(store.clone())),
            index,
            store,
        }
    }

    pub fn user(&self, login: &str) -> UserId {
        self.index
            .create_user(NewUser {
                email: format!("{}@example.com", login),
                login: login.to_string(),
                name: None,
                birthday: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            })
            .unwrap()
            .id
    }

    pub fn users(&self, count: usize) -> Vec<UserId> {
        (1..=count).map(|i| self.user(&format!("Login{}", i))).collect()
    }

    pub fn director(&self, name: &str) -> DirectorId {
        self.index.create_director(name).unwrap().id
    }

    /// Add a film released on `date` ("YYYY-MM-DD")
    pub fn film(&self, title: &str, date: &str, genres: &[GenreId], directors: &[DirectorId]) -> FilmId {
        self.index
            .create_film(NewFilm {
                title: title.to_string(),
                description: format!("About {}", title),
                release_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                duration: 120,
                mpa: 1,
                genres: genres.iter().copied().collect(),
                directors: directors.iter().copied().collect(),
            })
            .unwrap()
            .id
    }

    pub fn like(&self, film_id: FilmId, users: &[UserId]) {
        for &user_id in users {
            self.likes.add_like(film_id, user_id).unwrap();
        }
    }
}
