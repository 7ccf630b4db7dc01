//! Ranking, search and overlap queries over the film catalog.
//!
//! This crate provides:
//! - Filter trait and implementations (genre, release year, director)
//! - FilterPipeline for composing filters with AND semantics
//! - RankingEngine for popularity queries
//! - SearchEngine for substring search over titles and director names
//! - OverlapEngine for common friends, common films and director filmographies
//!
//! ## Ordering
//! Every ranked result is ordered by like count descending with ties broken
//! by ascending film id. Release-date ordering (director filmographies) also
//! falls back to ascending id.
//!
//! ## Example Usage
//! ```ignore
//! use ranking::{PopularQuery, RankingEngine, SearchEngine, SearchScope};
//!
//! let ranking = RankingEngine::new(store.clone(), likes.clone());
//! let top_comedies = ranking.popular(&PopularQuery::top(10).with_genre(1))?;
//!
//! let search = SearchEngine::new(store.clone(), likes.clone());
//! let found = search.search("matrix", "title,director".parse::<SearchScope>()?)?;
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod overlap;
pub mod popularity;
pub mod search;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use overlap::{OverlapEngine, SortMode};
pub use popularity::{PopularQuery, RankedFilm, RankingEngine, rank_by_likes};
pub use search::{SearchEngine, SearchScope};
pub use traits::Filter;
