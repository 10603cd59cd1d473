//! Assistant Relay - HTTP front for a hosted conversational assistant
//!
//! This crate accepts chat messages over HTTP, forwards them to an
//! assistant thread tied to the caller's session, waits for the assistant's
//! run to finish and returns the newest reply.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
