//! Canopy: Hierarchical Record Store
//!
//! An in-memory forest of records with ordered children, plus an asynchronous
//! request facade that applies mutations optimistically and settles them
//! through a pluggable backend.

pub mod config;
pub mod error;
pub mod logging;
pub mod request;
pub mod store;
pub mod tooling;
pub mod types;
pub mod validation;

pub use error::{ApiError, StoreError};
pub use request::{
    Backend, MissingPolicy, PendingRequest, Request, RequestConfig, RequestFacade,
    RequestStatus, RollbackPolicy, SimulatedBackend,
};
pub use store::{Forest, Record, RecordStore};
pub use types::{FieldPatch, Fields, RecordId};
pub use validation::{RequiredFields, ValidationErrors, Validator};
