//! Artwork path resolution.
//!
//! Resolution is pure: it reads a [`ListingCache`] snapshot and, when a
//! directory it needs has not been listed yet, answers
//! [`Lookup::NeedsListing`] so the caller can list it and retry.

mod listing;
mod names;
mod path_resolver;

pub use listing::{ListingCache, Lookup};
pub use names::{candidate_names, clean_movie_title, clean_name, cleanest_name, find_existing};
pub use path_resolver::{CentralDirectories, PathResolver};
