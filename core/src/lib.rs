//! Restaurant operations core — order lifecycle, dining-session aggregation,
//! payment settlement, waiter/table assignment, and the realtime event log.
//!
//! # Module structure
//!
//! ```text
//! core/src/
//! ├── config        # process configuration (§10)
//! ├── logging        # tracing setup (§10)
//! ├── db             # connection pool, migrations, repositories (§3)
//! ├── domain         # Order/Session/Employee/... types (§3)
//! ├── orders         # TransitionEngine, order creation (§4.1, §4.2, §4.5)
//! ├── modification    # ModificationEngine (§3 OrderModification)
//! ├── sessions       # SessionCoordinator (§4.2)
//! ├── settlement     # SettlementEngine (§4.4)
//! ├── split_bill     # SplitBillEngine (§4.3)
//! ├── assignment     # AssignmentEngine (§4.5)
//! └── realtime       # RealtimeBus, event payloads (§4.6)
//! ```
//!
//! HTTP routing, authentication, and presentation are out of scope here
//! (§1) — this crate exposes the engines as a library plus a thin binary
//! that wires config, the pool, and the bus together.

pub mod assignment;
pub mod config;
pub mod db;
pub mod domain;
pub mod logging;
pub mod modification;
pub mod orders;
pub mod realtime;
pub mod sessions;
pub mod settlement;
pub mod split_bill;

pub use config::Config;
pub use db::DbService;
pub use realtime::RealtimeBus;

/// Everything a handler or background task needs: the pool (via `db`), the
/// bus, the PII key, and pricing/assignment configuration.
#[derive(Clone)]
pub struct AppState {
    pub db: DbService,
    pub bus: RealtimeBus,
    pub config: Config,
}

impl AppState {
    pub async fn initialize(config: Config) -> Result<Self, shared::error::AppError> {
        let db = DbService::new(&config.database_url).await?;
        let bus = RealtimeBus::new(db.pool.clone());
        Ok(Self { db, bus, config })
    }
}
