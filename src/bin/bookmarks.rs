//! Bookmarks server binary.
//!
//! Reads configuration from `.env`, `bookmarks.{toml,yaml,json}` and
//! `BOOKMARKS_*` environment variables, then serves until Ctrl+C or SIGTERM.

use bookmarks::server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    bookmarks::server::start_server(config).await?;

    Ok(())
}
