//! # Social Crate
//!
//! The two relations users create through the service: friendships between
//! users and likes from users to films.
//!
//! ## Components
//!
//! ### Friendship Graph
//! Symmetric "is friend of" relation:
//! - add/remove are applied to both directions at once
//! - friend lists and common friends for registered users
//!
//! ### Like Index
//! Bipartite user/film membership:
//! - a like counts once no matter how often it is added
//! - per-film counts are derived from membership, never stored
//!
//! ## Example Usage
//!
//! ```ignore
//! use social::{FriendshipGraph, LikeIndex};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn EntityStore> = Arc::new(CatalogIndex::with_reference_data());
//! let friends = FriendshipGraph::new(store.clone());
//! let likes = LikeIndex::new(store.clone());
//!
//! friends.add_friend(1, 2)?;
//! likes.add_like(10, 1)?;
//! assert_eq!(likes.like_count(10), 1);
//! ```

pub mod friendship;
pub mod likes;

pub use friendship::FriendshipGraph;
pub use likes::LikeIndex;
