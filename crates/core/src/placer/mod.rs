//! Placer module for writing artwork files to their final destinations.
//!
//! This module provides the `Placer` trait, the filesystem boundary used by
//! the fetch engine: existence checks, recursive directory creation, binary
//! writes and non-recursive directory listings.
//!
//! # Features
//!
//! - Atomic writes through a temporary sibling file and rename
//! - Automatic parent directory creation
//! - Listings split into directories and files, as the path resolver expects
//!
//! # Example
//!
//! ```ignore
//! use artdump_core::placer::{FsPlacer, Placer};
//!
//! let placer = FsPlacer::with_defaults();
//! placer.create_dir_all("/data/movies/Alien (1979)").await?;
//! placer.write_file("/data/movies/Alien (1979)/poster.jpg", &bytes).await?;
//! let listing = placer.list_dir("/data/movies/").await?;
//! ```

mod config;
mod error;
mod fs_placer;
mod traits;

pub use config::PlacerConfig;
pub use error::PlacerError;
pub use fs_placer::FsPlacer;
pub use traits::{DirListing, Placer};
