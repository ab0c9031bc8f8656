//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:  storage.rs (read keys) → store.rs restore() → Authenticated | Anonymous
//! Login:    auth client → store.rs login() → storage.rs (write keys) → event
//! Requests: resource client → store.rs token() (expiry checked) → bearer header
//! ```

pub mod clock;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{FileStore, KeyValueStore, MemoryStore, PersistenceError};
pub use store::{RefreshOutcome, Session, SessionEvent, SessionPhase, SessionStore};
