//! Run orchestrator.
//!
//! [`ArtworkProcessor`] walks a stream of [`RunItem`]s one entry at a time:
//! exclusion, enrichment, artwork download, library update and cache
//! warming, with a short throttle after every entry that reached a provider.
//!
//! # Example
//!
//! ```ignore
//! use artdump_core::processor::{ArtworkProcessor, RunItem};
//! use futures::stream;
//! use tokio_util::sync::CancellationToken;
//!
//! let processor = ArtworkProcessor::new(&config, library, transport, placer, processed, progress)?;
//! let items = entries.into_iter().map(RunItem::entry);
//! let summary = processor
//!     .run_once("Adding artwork", stream::iter(items), count, false, &CancellationToken::new())
//!     .await;
//! println!("{} artwork updated", summary.updated_art_count);
//! ```

mod pipeline;
mod types;

pub use pipeline::{library_art, ArtworkProcessor, LINGER_TIME, THROTTLE_TIME};
pub use types::{EntryError, ProcessError, RunItem, RunSummary};
