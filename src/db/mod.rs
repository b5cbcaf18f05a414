mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::registry::CodeRegistry;
use crate::store::LicenseStore;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by the HTTP adapter.
#[derive(Clone)]
pub struct AppState {
    pub registry: CodeRegistry,
    pub store: LicenseStore,
    /// Shared bearer token for the interaction surface (None = open)
    pub service_token: Option<String>,
}

impl AppState {
    pub fn new(db: DbPool, code_prefix: &str, service_token: Option<String>) -> Self {
        Self {
            registry: CodeRegistry::new(db.clone(), code_prefix),
            store: LicenseStore::new(db),
            service_token,
        }
    }
}

/// Writers wait this long for the IMMEDIATE redemption lock before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection manager for a database file, with the busy timeout applied.
pub fn file_manager(database_path: impl AsRef<Path>) -> SqliteConnectionManager {
    SqliteConnectionManager::file(database_path).with_init(|c| c.busy_timeout(BUSY_TIMEOUT))
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    Pool::builder().max_size(10).build(file_manager(database_path))
}
