//! # Filmorate Service
//!
//! The facade a transport layer talks to. It wires one entity store to the
//! relation structures and the query engines, and is the only place where
//! operations spanning several of them happen:
//! 1. Validate domain input (logins, film references, selectors)
//! 2. Mutate the store and the relations
//! 3. Resolve ids returned by the relations back into records
//!
//! Every method is synchronous and short. Callers on an async runtime should
//! run them on the blocking pool (`tokio::task::spawn_blocking`).

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use catalog::{
    CatalogError, CatalogIndex, Director, DirectorId, Entity, EntityStore, Film, FilmId, Genre,
    GenreId, Mpa, MpaId, NewFilm, NewUser, Result, User, UserId,
};
use ranking::{
    OverlapEngine, PopularQuery, RankedFilm, RankingEngine, SearchEngine, SearchScope, SortMode,
    rank_by_likes,
};
use social::{FriendshipGraph, LikeIndex};

/// Number of films returned by `popular` when the caller gives no count
pub const DEFAULT_POPULAR_LIMIT: usize = 10;

/// Sizes of the catalog and its relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub users: usize,
    pub films: usize,
    pub friendships: usize,
    pub likes: usize,
}

/// Entry point for every user, film, relation and query operation
#[derive(Clone)]
pub struct FilmorateService {
    index: Arc<CatalogIndex>,
    store: Arc<dyn EntityStore>,
    friends: Arc<FriendshipGraph>,
    likes: Arc<LikeIndex>,
    ranking: Arc<RankingEngine>,
    search: Arc<SearchEngine>,
    overlap: Arc<OverlapEngine>,
    default_popular_limit: usize,

    /// Shared by writes that link existing users and films (likes,
    /// friendships), exclusive for deletes. A link whose existence check
    /// passed is therefore written before any delete of its ends starts.
    lifecycle: Arc<RwLock<()>>,
}

impl FilmorateService {
    /// Create a service over an existing catalog with empty relations
    pub fn new(index: Arc<CatalogIndex>) -> Self {
        let store: Arc<dyn EntityStore> = index.clone();
        let friends = Arc::new(FriendshipGraph::new(store.clone()));
        let likes = Arc::new(LikeIndex::new(store.clone()));

        Self {
            ranking: Arc::new(RankingEngine::new(store.clone(), likes.clone())),
            search: Arc::new(SearchEngine::new(store.clone(), likes.clone())),
            overlap: Arc::new(OverlapEngine::new(
                store.clone(),
                friends.clone(),
                likes.clone(),
            )),
            index,
            store,
            friends,
            likes,
            default_popular_limit: DEFAULT_POPULAR_LIMIT,
            lifecycle: Arc::new(RwLock::new(())),
        }
    }

    /// Create a service over an empty catalog holding the standard genres
    /// and Mpa ratings
    pub fn with_reference_data() -> Self {
        Self::new(Arc::new(CatalogIndex::with_reference_data()))
    }

    pub fn with_default_popular_limit(mut self, limit: usize) -> Self {
        self.default_popular_limit = limit;
        self
    }

    pub fn default_popular_limit(&self) -> usize {
        self.default_popular_limit
    }

    pub fn stats(&self) -> ServiceStats {
        let (users, films) = self.index.counts();
        ServiceStats {
            users,
            films,
            friendships: self.friends.friendship_count(),
            likes: self.likes.total_likes(),
        }
    }

    // =========================================================================
    // Users
    // =========================================================================

    #[instrument(skip(self, new_user), fields(login = %new_user.login))]
    pub fn register_user(&self, new_user: NewUser) -> Result<User> {
        validate_login(&new_user.login)?;
        let user = self.index.create_user(new_user)?;
        info!("Registered user {} ({})", user.id, user.login);
        Ok(user)
    }

    /// Register a user under an id chosen by the caller (seed data)
    pub fn restore_user(&self, user: User) -> Result<User> {
        validate_login(&user.login)?;
        let user = with_default_name(user);
        if self.index.insert_user(user.clone()).is_some() {
            debug!("Replaced existing user {}", user.id);
        }
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub fn update_user(&self, user: User) -> Result<User> {
        validate_login(&user.login)?;
        let user = self.index.update_user(with_default_name(user))?;
        info!("Updated user {}", user.id);
        Ok(user)
    }

    /// Remove a user along with every friendship and like they hold
    #[instrument(skip(self))]
    pub fn delete_user(&self, user_id: UserId) -> Result<User> {
        let _lifecycle = self.lifecycle.write();
        let user = self.index.remove_user(user_id)?;
        let friendships = self.friends.forget_user(user_id);
        let likes = self.likes.forget_user(user_id);
        info!(
            "Deleted user {} with {} friendships and {} likes",
            user_id, friendships, likes
        );
        Ok(user)
    }

    pub fn user(&self, user_id: UserId) -> Result<User> {
        self.store.get_user(user_id)
    }

    pub fn users(&self) -> Vec<User> {
        self.store.all_users()
    }

    // =========================================================================
    // Friendships
    // =========================================================================

    pub fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<()> {
        let _lifecycle = self.lifecycle.read();
        self.friends.add_friend(user_id, friend_id)
    }

    pub fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> Result<()> {
        self.friends.remove_friend(user_id, friend_id)
    }

    /// Friends of a user, ordered by id
    #[instrument(skip(self))]
    pub fn friends(&self, user_id: UserId) -> Result<Vec<User>> {
        let ids = self.friends.friends_of(user_id)?;
        let friends: Vec<User> = ids
            .into_iter()
            .filter_map(|id| self.store.get_user(id).ok())
            .collect();
        debug!("User {} has {} friends", user_id, friends.len());
        Ok(friends)
    }

    pub fn common_friends(&self, user_id: UserId, other_id: UserId) -> Result<Vec<User>> {
        self.overlap.common_friends(user_id, other_id)
    }

    // =========================================================================
    // Films
    // =========================================================================

    #[instrument(skip(self, new_film), fields(title = %new_film.title))]
    pub fn add_film(&self, new_film: NewFilm) -> Result<Film> {
        self.validate_references(new_film.mpa, &new_film.genres, &new_film.directors)?;
        let film = self.index.create_film(new_film)?;
        info!("Added film {} ({})", film.id, film.title);
        Ok(film)
    }

    /// Add a film under an id chosen by the caller (seed data)
    pub fn restore_film(&self, film: Film) -> Result<Film> {
        self.validate_references(film.mpa, &film.genres, &film.directors)?;
        if self.index.insert_film(film.clone()).is_some() {
            debug!("Replaced existing film {}", film.id);
        }
        Ok(film)
    }

    /// Replace a film record, genre and director sets included, as one unit
    #[instrument(skip(self, film), fields(film_id = film.id))]
    pub fn update_film(&self, film: Film) -> Result<Film> {
        self.validate_references(film.mpa, &film.genres, &film.directors)?;
        let film = self.index.update_film(film)?;
        info!("Updated film {}", film.id);
        Ok(film)
    }

    /// Remove a film along with every like it received
    #[instrument(skip(self))]
    pub fn delete_film(&self, film_id: FilmId) -> Result<Film> {
        let _lifecycle = self.lifecycle.write();
        let film = self.index.remove_film(film_id)?;
        let likes = self.likes.forget_film(film_id);
        info!("Deleted film {} with {} likes", film_id, likes);
        Ok(film)
    }

    /// A film together with its current like count
    pub fn film(&self, film_id: FilmId) -> Result<RankedFilm> {
        let film = self.store.get_film(film_id)?;
        Ok(RankedFilm {
            likes: self.likes.like_count(film.id),
            film,
        })
    }

    pub fn films(&self) -> Vec<Film> {
        self.store.all_films()
    }

    fn validate_references(
        &self,
        mpa: MpaId,
        genres: &std::collections::BTreeSet<GenreId>,
        directors: &std::collections::BTreeSet<DirectorId>,
    ) -> Result<()> {
        if !self.index.mpa_exists(mpa) {
            warn!("Rejected film with unknown Mpa rating {}", mpa);
            return Err(CatalogError::not_found(Entity::Mpa, mpa));
        }
        if let Some(&director_id) = directors.iter().find(|&&id| !self.store.director_exists(id)) {
            warn!("Rejected film with unknown director {}", director_id);
            return Err(CatalogError::not_found(Entity::Director, director_id));
        }
        if let Some(&genre_id) = genres.iter().find(|&&id| !self.store.genre_exists(id)) {
            warn!("Rejected film with unknown genre {}", genre_id);
            return Err(CatalogError::invalid(format!(
                "genre {} is not registered",
                genre_id
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Likes
    // =========================================================================

    pub fn add_like(&self, film_id: FilmId, user_id: UserId) -> Result<()> {
        let _lifecycle = self.lifecycle.read();
        self.likes.add_like(film_id, user_id)
    }

    /// Withdraw a like. Both ids must be registered; a like that was never
    /// given is a no-op.
    pub fn remove_like(&self, film_id: FilmId, user_id: UserId) -> Result<()> {
        if !self.store.film_exists(film_id) {
            return Err(CatalogError::not_found(Entity::Film, film_id));
        }
        if !self.store.user_exists(user_id) {
            return Err(CatalogError::not_found(Entity::User, user_id));
        }
        self.likes.remove_like(film_id, user_id);
        Ok(())
    }

    /// Films a user liked, most liked first
    pub fn liked_films(&self, user_id: UserId) -> Result<Vec<RankedFilm>> {
        let user = self.store.get_user(user_id)?;
        let films: Vec<Film> = self
            .likes
            .films_liked_by(user.id)
            .into_iter()
            .filter_map(|id| self.store.get_film(id).ok())
            .collect();
        Ok(rank_by_likes(films, &self.likes))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Most liked films, optionally restricted to a genre and a release year.
    /// `count` falls back to the service's default limit.
    pub fn popular(
        &self,
        count: Option<usize>,
        genre_id: Option<GenreId>,
        year: Option<i32>,
    ) -> Result<Vec<RankedFilm>> {
        let mut query = PopularQuery::top(count.unwrap_or(self.default_popular_limit));
        if let Some(genre_id) = genre_id {
            query = query.with_genre(genre_id);
        }
        if let Some(year) = year {
            query = query.with_year(year);
        }
        self.ranking.popular(&query)
    }

    /// Substring search; `by` is a field selector such as `"title,director"`
    pub fn search(&self, query: &str, by: &str) -> Result<Vec<RankedFilm>> {
        let scope = by.parse::<SearchScope>().inspect_err(|e| warn!("{}", e))?;
        self.search.search(query, scope)
    }

    pub fn common_films(&self, user_id: UserId, friend_id: UserId) -> Result<Vec<RankedFilm>> {
        self.overlap.common_films(user_id, friend_id)
    }

    /// A director's films; `sort_by` is `"year"` or `"likes"`
    pub fn director_films(&self, director_id: DirectorId, sort_by: &str) -> Result<Vec<RankedFilm>> {
        let sort = sort_by.parse::<SortMode>().inspect_err(|e| warn!("{}", e))?;
        self.overlap.films_by_director(director_id, sort)
    }

    // =========================================================================
    // Reference data
    // =========================================================================

    pub fn genre(&self, genre_id: GenreId) -> Result<Genre> {
        self.index.get_genre(genre_id)
    }

    pub fn genres(&self) -> Vec<Genre> {
        self.index.all_genres()
    }

    pub fn mpa(&self, mpa_id: MpaId) -> Result<Mpa> {
        self.index.get_mpa(mpa_id)
    }

    pub fn mpa_ratings(&self) -> Vec<Mpa> {
        self.index.all_mpa()
    }

    pub fn director(&self, director_id: DirectorId) -> Result<Director> {
        self.store.get_director(director_id)
    }

    pub fn directors(&self) -> Vec<Director> {
        self.index.all_directors()
    }

    pub fn create_director(&self, name: &str) -> Result<Director> {
        if name.trim().is_empty() {
            return Err(CatalogError::invalid("director name must not be blank"));
        }
        let director = self.index.create_director(name.trim())?;
        info!("Created director {} ({})", director.id, director.name);
        Ok(director)
    }

    /// Register a director under an id chosen by the caller (seed data)
    pub fn restore_director(&self, director: Director) -> Director {
        self.index.insert_director(director.clone());
        director
    }
}

fn validate_login(login: &str) -> Result<()> {
    if login.is_empty() || login.chars().any(char::is_whitespace) {
        warn!("Rejected login {:?}", login);
        return Err(CatalogError::invalid(format!(
            "login '{}' must be non-empty and contain no whitespace",
            login
        )));
    }
    Ok(())
}

fn with_default_name(mut user: User) -> User {
    if user.name.trim().is_empty() {
        user.name = user.login.clone();
    }
    user
}
