//! In-memory bookmark service.
//!
//! The crate is split in two layers:
//!
//! - The model, validator and store ([`Bookmark`], [`validate_new_bookmark`],
//!   [`BookmarkStore`]), always available and free of any HTTP types.
//! - The HTTP server ([`server`]), behind the default `server` feature:
//!   an axum router exposing list/get/create/delete under `/bookmarks`,
//!   gated by a static bearer token.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "server")]
//! # async fn run() -> anyhow::Result<()> {
//! use bookmarks::server::ServerConfig;
//!
//! let config = ServerConfig::load()?;
//! bookmarks::server::start_server(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod bookmark;
pub mod store;
pub mod validate;

#[cfg(feature = "server")]
pub mod server;

pub use bookmark::{Bookmark, CreateBookmarkRequest, NewBookmark};
pub use store::{BookmarkStore, InMemoryStore, StoreError};
pub use validate::{MAX_RATING, MIN_RATING, ValidationError, validate_new_bookmark};
