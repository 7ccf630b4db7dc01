//! Filter implementations for film selections.
//!
//! This module contains the concrete filters that can be composed
//! into a FilterPipeline.

pub mod director;
pub mod genre;
pub mod release_year;

// Re-export for convenience
pub use director::DirectorFilter;
pub use genre::GenreFilter;
pub use release_year::ReleaseYearFilter;
