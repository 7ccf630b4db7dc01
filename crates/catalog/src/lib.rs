//! # Catalog Crate
//!
//! Entity types and storage for the film catalog.
//!
//! ## Main Components
//!
//! - **types**: Users, films and the reference entities films point to
//! - **store**: The `EntityStore` contract relation and query code reads through
//! - **index**: `CatalogIndex`, the thread-safe in-memory store
//! - **parser**: Parse `::`-separated seed files into a `CatalogSeed`
//! - **error**: The workspace-wide error type
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, EntityStore, NewUser};
//!
//! let index = CatalogIndex::with_reference_data();
//! let user = index.create_user(new_user)?;
//! let film = index.get_film(1)?;
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod store;
pub mod types;

pub use error::{CatalogError, Entity, ErrorKind, Result};
pub use index::CatalogIndex;
pub use parser::{CatalogSeed, SeedFriendship, SeedLike};
pub use store::EntityStore;
pub use types::{
    // Type aliases
    DirectorId,
    FilmId,
    GenreId,
    MpaId,
    UserId,
    // Core types
    Director,
    Film,
    Genre,
    Mpa,
    NewFilm,
    NewUser,
    User,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_store_is_object_safe() {
        let store: Arc<dyn EntityStore> = Arc::new(CatalogIndex::new());

        assert!(store.all_users().is_empty());
        assert!(!store.user_exists(1));
        assert!(!store.genre_exists(1));
    }
}
