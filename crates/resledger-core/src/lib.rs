//! resledger-core — resource quantities and ledger arithmetic.
//!
//! Models the typed, attributed quantities that agents offer and tasks
//! consume (cpus, mem, ports, disk, custom sets), and the arithmetic needed
//! to keep a running ledger of available or used capacity.
//!
//! # Components
//!
//! - **`scalar`**, **`ranges`**, **`set`** — payload types and their
//!   add/subtract/compare
//! - **`resource`** — a single resource: validation, addable/subtractable
//!   predicates, in-place arithmetic
//! - **`resources`** — the ledger that folds resources into one entry per
//!   identity
//! - **`raw`** — wire-shaped resources and checked conversion
//! - **`error`** — validation error taxonomy
//!
//! ```text
//! offer ──► RawResource ──try_from──► Resource ──validate──► Resources::add
//!                                                            Resources::minus ──► launch
//! ```

pub mod error;
pub mod ranges;
pub mod raw;
pub mod resource;
pub mod resources;
pub mod scalar;
pub mod set;

pub use error::{ResourceError, ResourceErrorKind, ResourceResult, is_resource_error};
pub use ranges::{Range, Ranges};
pub use raw::RawResource;
pub use resource::{
    DEFAULT_ROLE, DISK_RESOURCE, DiskInfo, Persistence, ReservationInfo, Resource, Value,
    ValueType, Volume, VolumeMode,
};
pub use resources::Resources;
pub use scalar::Scalar;
pub use set::Set;
