//! In-memory user registry
//!
//! The registry owns every user record and serializes access to them with a
//! readers-writer lock:
//!
//! ```text
//!                 Arc<UserRegistry>
//!            ┌──────────────────────────┐
//!            │ users: RwLock<           │
//!            │   HashMap<UserId, User>  │
//!            │   + next id counter      │
//!            │ >                        │
//!            └────────────┬─────────────┘
//!                         │
//!       ┌─────────────────┼─────────────────┐
//!       │                 │                 │
//!       ▼                 ▼                 ▼
//!   create()            get()            delete()
//!   write lock        read lock         write lock
//! ```
//!
//! Reads share the lock and run in parallel. `create` holds the write lock
//! across ID assignment and insert, `delete` across the existence check and
//! removal, so neither can interleave with another writer.

pub mod config;
pub mod entry;
pub mod error;
pub mod store;

pub use config::{IdPolicy, RegistryConfig};
pub use entry::{User, UserId};
pub use error::RegistryError;
pub use store::UserRegistry;
