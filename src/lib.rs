//! Wind Banner - single-use license codes for a chat-bot interaction surface
//!
//! The Code Registry mints codes and redeems them exactly once; the License
//! Store keeps one license per user and classifies it on demand. Both sit on a
//! pooled SQLite handle owned by the process entry point.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod interaction;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod store;
pub mod util;
