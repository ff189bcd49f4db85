pub mod api;
pub mod config;
pub mod db;
pub mod habits;
pub mod notifications;
pub mod scheduling;

pub use db::DbPool;

use config::Config;
use scheduling::SlotLocks;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    /// Per-slot booking locks; see `scheduling::SlotLocks`
    pub slot_locks: SlotLocks,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        Self {
            config,
            db,
            slot_locks: SlotLocks::new(),
        }
    }
}
