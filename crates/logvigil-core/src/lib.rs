//! # Logvigil Core
//!
//! Core types, traits, and errors for the logvigil event persistence stack.
//!
//! This crate defines the domain model shared by the index transport and
//! the persistence subsystem: events detected by sniffers, the log entries
//! they carry as evidence, typed open field bags, and log stream pointers.
//!
//! ## Key Types
//!
//! - [`Event`]: one persisted record of a detected match
//! - [`LogEntry`]: one unit of evidence within an event
//! - [`LogPointer`]: opaque, portable log stream position marker
//! - [`FieldValue`]: typed value in an open field bag
//!
//! ## Key Traits
//!
//! - [`SnifferRegistry`] / [`SourceProvider`]: collaborator lookups used to
//!   resolve cleanup scope; in-memory fakes are provided for testing

pub mod entry;
pub mod error;
pub mod event;
pub mod fields;
pub mod pointer;
pub mod registry;
pub mod sniffer;

// Re-export main types
pub use entry::*;
pub use error::*;
pub use event::*;
pub use fields::*;
pub use pointer::*;
pub use registry::*;
pub use sniffer::*;
