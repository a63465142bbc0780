//! In-memory caches - sessions and OAuth state.

mod memory;
mod session;
mod state;

pub use memory::ExpiringMap;
pub use session::{DEFAULT_SESSION_TTL, InMemorySessionStore};
pub use state::{DEFAULT_STATE_TTL, StateTracker};
