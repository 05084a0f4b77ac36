//! # Logvigil Events
//!
//! Event persistence and query core: stores the events logvigil sniffers
//! detect in a document-oriented, near-real-time search backend, finds
//! them again, and cleans them up.
//!
//! ## Pieces
//!
//! - [`EventPersistence`]: the public façade — persist, point lookup,
//!   paginated query, delete, bulk cleanup, explicit visibility
//! - [`IndexNaming`] / [`RotatingIndexNaming`]: per-sniffer index naming
//!   with rotation across sniffer reconfiguration
//! - [`EventDocMapper`] + [`FieldCodec`] registry: document conversion
//!   with typed open field bags
//! - [`EventQueryBuilder`] / [`EventPage`]: bounded, deterministic
//!   pagination with a total match count
//!
//! ## Consistency
//!
//! Point lookups observe a persisted event as soon as the backend
//! acknowledges the write. Search queries observe it only after
//! [`EventPersistence::make_visible`] (or a backend-scheduled refresh).
//! See the crate documentation of `logvigil-index` for the underlying
//! contract.

pub mod convert;
pub mod error;
pub mod naming;
pub mod persistence;
pub mod query;

// Re-export main types
pub use convert::{CodecRegistry, EventDocMapper, FieldCodec};
pub use error::{ConvertError, PersistenceError};
pub use naming::{IndexNaming, RotatingIndexNaming};
pub use persistence::EventPersistence;
pub use query::{EventPage, EventQueryBuilder};
