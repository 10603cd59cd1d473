//! Domain layer containing the relay's value types.
//!
//! - `relay` - Identifiers, run status, thread messages and reply extraction

pub mod relay;
