//! Request Facade
//!
//! Asynchronous create/update/delete over a [`RecordStore`]. Each request is
//! applied to the store when it is submitted and settles later through a
//! [`Backend`] on its own tokio task. Staging order is submission order;
//! settlement order is whatever the backend produces.

pub mod backend;
pub mod status;

pub use backend::{Backend, SimulatedBackend};
pub use status::RequestStatus;

use crate::error::{ApiError, StoreError};
use crate::store::{Record, RecordStore, Removed};
use crate::types::{FieldPatch, Fields, RecordId};
use crate::validation::Validator;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A mutation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Create {
        #[serde(default)]
        fields: Fields,
        #[serde(default, alias = "parentId")]
        parent_id: Option<RecordId>,
    },
    Update {
        id: RecordId,
        #[serde(default)]
        fields: Fields,
    },
    Delete {
        id: RecordId,
    },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Create { .. } => "create",
            Request::Update { .. } => "update",
            Request::Delete { .. } => "delete",
        }
    }

    /// The id the request addresses: the parent for a create, the record otherwise
    pub fn target(&self) -> Option<&str> {
        match self {
            Request::Create { parent_id, .. } => parent_id.as_deref(),
            Request::Update { id, .. } | Request::Delete { id } => Some(id),
        }
    }
}

/// What happens to an optimistic mutation whose settlement fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackPolicy {
    /// Leave the mutation in place
    #[default]
    Keep,
    /// Undo the mutation
    Revert,
}

/// How a request whose id does not resolve is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Fail the request with a not-found error before anything is staged
    #[default]
    Report,
    /// Stage nothing and let the request settle normally
    Ignore,
}

/// Request facade configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Simulated backend latency (milliseconds)
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    #[serde(default)]
    pub rollback: RollbackPolicy,
    #[serde(default)]
    pub missing: MissingPolicy,
}

fn default_latency_ms() -> u64 {
    1000
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            rollback: RollbackPolicy::default(),
            missing: MissingPolicy::default(),
        }
    }
}

/// Inverse of a staged mutation
#[derive(Debug)]
enum Undo {
    Create(RecordId),
    Update {
        id: RecordId,
        prior: FieldPatch,
        written: Fields,
    },
    Delete(Removed),
    Nothing,
}

/// A staged request awaiting settlement
///
/// The store already reflects the request and settlement is already running.
/// Await the value (or [`settled`](Self::settled)) to learn whether the
/// backend confirmed it; dropping it detaches from the outcome only.
#[must_use = "dropping a pending request discards its settlement outcome"]
pub struct PendingRequest {
    record_id: Option<RecordId>,
    handle: JoinHandle<Result<(), ApiError>>,
}

impl PendingRequest {
    /// Id of the record that was created, updated or deleted.
    /// `None` when nothing was staged.
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub async fn settled(self) -> Result<(), ApiError> {
        join_settlement(self.handle).await
    }
}

async fn join_settlement(handle: JoinHandle<Result<(), ApiError>>) -> Result<(), ApiError> {
    handle
        .await
        .map_err(|e| ApiError::Settlement(format!("settlement task failed: {}", e)))?
}

impl IntoFuture for PendingRequest {
    type Output = Result<(), ApiError>;
    type IntoFuture = BoxFuture<'static, Result<(), ApiError>>;

    fn into_future(self) -> Self::IntoFuture {
        join_settlement(self.handle).boxed()
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("record_id", &self.record_id)
            .finish_non_exhaustive()
    }
}

struct Shared<S> {
    store: RwLock<S>,
    backend: Arc<dyn Backend>,
    validator: RwLock<Option<Arc<dyn Validator>>>,
    status: RwLock<RequestStatus>,
    config: RequestConfig,
}

/// Owner of a record store plus the request lifecycle around it
pub struct RequestFacade<S> {
    inner: Arc<Shared<S>>,
}

impl<S> Clone for RequestFacade<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> RequestFacade<S>
where
    S: RecordStore + Send + Sync + 'static,
{
    pub fn new(store: S, backend: Arc<dyn Backend>, config: RequestConfig) -> Self {
        Self {
            inner: Arc::new(Shared {
                store: RwLock::new(store),
                backend,
                validator: RwLock::new(None),
                status: RwLock::new(RequestStatus::default()),
                config,
            }),
        }
    }

    /// Facade over a [`SimulatedBackend`] with the configured latency
    pub fn simulated(store: S, config: RequestConfig) -> Self {
        let backend = Arc::new(SimulatedBackend::new(Duration::from_millis(
            config.latency_ms,
        )));
        Self::new(store, backend, config)
    }

    pub fn config(&self) -> &RequestConfig {
        &self.inner.config
    }

    /// Install a validator run before every create and update
    pub fn set_validator(&self, validator: impl Validator + 'static) {
        let validator: Arc<dyn Validator> = Arc::new(validator);
        *self.inner.validator.write() = Some(validator);
    }

    pub fn clear_validator(&self) {
        *self.inner.validator.write() = None;
    }

    pub fn create(
        &self,
        fields: Fields,
        parent_id: Option<&str>,
    ) -> Result<PendingRequest, ApiError> {
        self.submit(Request::Create {
            fields,
            parent_id: parent_id.map(str::to_string),
        })
    }

    pub fn update(&self, id: &str, fields: Fields) -> Result<PendingRequest, ApiError> {
        self.submit(Request::Update {
            id: id.to_string(),
            fields,
        })
    }

    /// Delete a record and its subtree. Confirmation is the caller's job.
    pub fn delete(&self, id: &str) -> Result<PendingRequest, ApiError> {
        self.submit(Request::Delete { id: id.to_string() })
    }

    /// Validate and stage a request, then start its settlement
    ///
    /// On return the store reflects the request and the backend round trip is
    /// under way on a spawned task. Must be called within a tokio runtime.
    pub fn submit(&self, request: Request) -> Result<PendingRequest, ApiError> {
        self.validate(&request)?;

        let (record_id, undo) = match self.stage(&request) {
            Ok(staged) => staged,
            Err(err) => match self.inner.config.missing {
                MissingPolicy::Report => {
                    warn!(op = request.kind(), error = %err, "Request rejected");
                    return Err(err.into());
                }
                MissingPolicy::Ignore => {
                    debug!(op = request.kind(), error = %err, "Nothing staged for request");
                    (None, Undo::Nothing)
                }
            },
        };

        self.inner.status.write().pending += 1;
        debug!(
            op = request.kind(),
            record_id = ?record_id,
            "Staged request"
        );

        let shared = Arc::clone(&self.inner);
        let handle = tokio::spawn(shared.settle(request, undo));

        Ok(PendingRequest { record_id, handle })
    }

    /// Read the records after a backend round trip
    pub async fn fetch(&self) -> Result<Vec<Record>, ApiError> {
        self.inner.status.write().fetching = true;
        let result = self.inner.backend.load().await;
        {
            let mut status = self.inner.status.write();
            status.fetching = false;
            status.load_error = result.is_err();
            if let Err(e) = &result {
                status.last_error = Some(e.to_string());
            }
        }
        if let Err(e) = &result {
            warn!(error = %e, "Loading records failed");
        }
        result?;
        Ok(self.snapshot())
    }

    /// Current optimistic view of a record
    pub fn find(&self, id: &str) -> Option<Record> {
        self.inner.store.read().find(id).cloned()
    }

    /// Current optimistic view of the forest
    pub fn snapshot(&self) -> Vec<Record> {
        self.inner.store.read().roots().to_vec()
    }

    /// Run a closure against the store under a read lock
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.store.read())
    }

    pub fn status(&self) -> RequestStatus {
        self.inner.status.read().clone()
    }

    fn validate(&self, request: &Request) -> Result<(), ApiError> {
        let Some(validator) = self.inner.validator.read().clone() else {
            return Ok(());
        };
        let errors = match request {
            Request::Create { fields, .. } => validator.validate(fields),
            Request::Update { id, fields } => {
                // An unresolved target is left to staging and the missing policy.
                let Some(mut merged) = self
                    .inner
                    .store
                    .read()
                    .find(id)
                    .map(|record| record.fields.clone())
                else {
                    return Ok(());
                };
                // Validate the record as it would look after the merge.
                merged.extend(fields.clone());
                validator.validate(&merged)
            }
            Request::Delete { .. } => return Ok(()),
        };
        if errors.is_empty() {
            return Ok(());
        }
        warn!(op = request.kind(), errors = %errors, "Request failed validation");
        Err(ApiError::Validation(errors))
    }

    fn stage(&self, request: &Request) -> Result<(Option<RecordId>, Undo), StoreError> {
        let mut store = self.inner.store.write();
        match request {
            Request::Create { fields, parent_id } => {
                let id = store.create(fields.clone(), parent_id.as_deref())?;
                Ok((Some(id.clone()), Undo::Create(id)))
            }
            Request::Update { id, fields } => {
                let prior = store.update(id, fields.clone())?;
                Ok((
                    Some(id.clone()),
                    Undo::Update {
                        id: id.clone(),
                        prior,
                        written: fields.clone(),
                    },
                ))
            }
            Request::Delete { id } => {
                let removed = store.delete(id)?;
                Ok((Some(id.clone()), Undo::Delete(removed)))
            }
        }
    }
}

impl<S> Shared<S>
where
    S: RecordStore + Send + Sync + 'static,
{
    async fn settle(self: Arc<Self>, request: Request, undo: Undo) -> Result<(), ApiError> {
        let result = self.backend.settle(&request).await;

        let rolled_back = match &result {
            Err(_) if self.config.rollback == RollbackPolicy::Revert => self.revert(undo),
            _ => false,
        };

        {
            let mut status = self.status.write();
            status.pending = status.pending.saturating_sub(1);
            status.last_settled_at = Some(Utc::now());
            match &result {
                Ok(()) => status.completed += 1,
                Err(e) => {
                    status.failed += 1;
                    status.last_error = Some(e.to_string());
                }
            }
            if rolled_back {
                status.rolled_back += 1;
            }
        }

        match &result {
            Ok(()) => info!(op = request.kind(), target = ?request.target(), "Request settled"),
            Err(e) => warn!(
                op = request.kind(),
                target = ?request.target(),
                error = %e,
                rolled_back,
                "Request failed to settle"
            ),
        }
        result
    }

    fn revert(&self, undo: Undo) -> bool {
        let mut store = self.store.write();
        let outcome = match undo {
            Undo::Create(id) => store.delete(&id).map(|_| ()),
            Undo::Update { id, prior, written } => {
                // Keys a later request has since overwritten keep the newer value.
                let patch: Option<FieldPatch> = store.find(&id).map(|record| {
                    prior
                        .into_iter()
                        .filter(|(key, _)| record.fields.get(key) == written.get(key))
                        .collect()
                });
                match patch {
                    Some(patch) => store.patch_fields(&id, patch),
                    None => Err(StoreError::RecordNotFound(id)),
                }
            }
            Undo::Delete(removed) => store.restore(removed),
            Undo::Nothing => return false,
        };
        match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Rollback target vanished, keeping current state");
                false
            }
        }
    }
}
