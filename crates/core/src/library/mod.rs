//! Media library boundary.
//!
//! The library owns item records, their art mappings and the host's texture
//! cache. [`LibraryService`] is the typed surface the pipeline uses;
//! [`JsonRpcLibrary`] implements it over the host's JSON-RPC API.

mod error;
mod jsonrpc;
mod traits;
mod types;

pub use error::LibraryError;
pub use jsonrpc::JsonRpcLibrary;
pub use traits::LibraryService;
pub use types::{ItemPage, ShowFile, SongFile, Texture};
