//! Session store adapters.
//!
//! - `InMemorySessionStore` - process-lifetime map, no persistence

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;
