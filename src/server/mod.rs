//! HTTP surface for the bookmark store.
//!
//! # API Endpoints
//!
//! Every endpoint requires `Authorization: Bearer <token>`; anything else is
//! answered with `401 {"error": "Unauthorized Request!"}`.
//!
//! - `GET /bookmarks` - List bookmarks
//! - `GET /bookmarks/{id}` - Get bookmark by ID
//! - `POST /bookmarks` - Create bookmark
//! - `POST /bookmarks/{id}` - Create bookmark (path ID ignored)
//! - `DELETE /bookmarks/{id}` - Delete bookmark
//!
//! Unknown bookmarks are reported as `400` with a plain-text body on this
//! API, never `404`.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::{api_routes, build_router, init_tracing, start_server, with_middleware};
pub use config::{Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use state::ServerState;
