//! Typed loading of portal documents with a three-state status.
//!
//! A [`ResourceLoader`] owns the [`LoadStatus`] for one view. Each call to
//! [`ResourceLoader::load`] derives an address from the resource identifier,
//! reads it once from a [`DocumentStore`], decodes the JSON, checks it against
//! the document's schema when one is registered, and publishes the outcome.
//!
//! Every read is tagged with a generation number when it is issued. Only the
//! most recent generation may publish; a slower read for a superseded
//! identifier completes and is dropped. Observers use [`ResourceLoader::status`]
//! or a [`ResourceLoader::subscribe`] receiver.

use crate::catalog::ResourceId;
use crate::schema_loader::SchemaSet;
use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;

const ID_PLACEHOLDER: &str = "{id}";
const DEFAULT_TEMPLATE: &str = "data/{id}";

/// Why a document store read did not produce bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{address} returned status {status}")]
    Status { address: String, status: u16 },
    #[error("reading {address}: {message}")]
    Transport { address: String, message: String },
}

/// Failure of one load, as seen at the loader boundary.
///
/// Views only ever see the display string (through [`LoadStatus::Failed`]);
/// the variants exist for callers of [`ResourceLoader::fetch_document`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load {id}: {source}")]
    Fetch {
        id: ResourceId,
        #[source]
        source: FetchError,
    },
    #[error("failed to decode {id}: {source}")]
    Decode {
        id: ResourceId,
        #[source]
        source: serde_json::Error,
    },
    #[error("{id} does not match its schema: {}", .details.join("; "))]
    Schema { id: ResourceId, details: Vec<String> },
}

/// Outcome of the most recent load, as observed by a view.
#[derive(Debug)]
pub enum LoadStatus<T> {
    Pending,
    Ready(Arc<T>),
    Failed(String),
}

impl<T> Clone for LoadStatus<T> {
    fn clone(&self) -> Self {
        match self {
            LoadStatus::Pending => LoadStatus::Pending,
            LoadStatus::Ready(snapshot) => LoadStatus::Ready(Arc::clone(snapshot)),
            LoadStatus::Failed(message) => LoadStatus::Failed(message.clone()),
        }
    }
}

impl<T> LoadStatus<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadStatus::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready(_))
    }

    pub fn snapshot(&self) -> Option<&Arc<T>> {
        match self {
            LoadStatus::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Fixed path template parameterized only by the resource identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressTemplate(String);

impl AddressTemplate {
    /// The template must contain `{id}` exactly once.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if template.matches(ID_PLACEHOLDER).count() != 1 {
            bail!("address template must contain {ID_PLACEHOLDER} exactly once, got '{template}'");
        }
        Ok(Self(template))
    }

    pub fn address(&self, id: &ResourceId) -> String {
        self.0.replace(ID_PLACEHOLDER, id.as_str())
    }
}

impl Default for AddressTemplate {
    fn default() -> Self {
        Self(DEFAULT_TEMPLATE.to_string())
    }
}

/// Read-only source of document bytes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, address: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Serves documents from a directory on disk.
///
/// Addresses are relative to the root; absolute addresses and `..` segments
/// are refused so a crafted identifier cannot read outside the root.
#[derive(Clone, Debug)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, address: &str) -> std::result::Result<PathBuf, FetchError> {
        let relative = Path::new(address);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if address.is_empty() || escapes {
            return Err(FetchError::Transport {
                address: address.to_string(),
                message: "address escapes the store root".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn fetch(&self, address: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let path = self.resolve(address)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(FetchError::Status {
                address: address.to_string(),
                status: 404,
            }),
            Err(err) => Err(FetchError::Transport {
                address: address.to_string(),
                message: err.to_string(),
            }),
        }
    }
}

/// In-memory store; unknown addresses answer with status 404.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the bytes served at `address`.
    pub fn insert(&self, address: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        lock(&self.documents).insert(address.into(), bytes.into());
    }

    pub fn remove(&self, address: &str) -> Option<Vec<u8>> {
        lock(&self.documents).remove(address)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch(&self, address: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let found = lock(&self.documents).get(address).cloned();
        found.ok_or_else(|| FetchError::Status {
            address: address.to_string(),
            status: 404,
        })
    }
}

#[cfg(feature = "http")]
/// Fetches documents over HTTP relative to a base URL.
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch(&self, address: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let url = format!("{}/{}", self.base_url, address.trim_start_matches('/'));
        let transport = |err: reqwest::Error| FetchError::Transport {
            address: url.clone(),
            message: err.to_string(),
        };
        let resp = self.client.get(&url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                address: url.clone(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

struct LoaderState {
    generation: u64,
    current: Option<ResourceId>,
}

/// Single owner of the load status for one view.
pub struct ResourceLoader<S, T> {
    store: S,
    template: AddressTemplate,
    schemas: Option<Arc<SchemaSet>>,
    state: Mutex<LoaderState>,
    status: watch::Sender<LoadStatus<T>>,
}

impl<S, T> ResourceLoader<S, T>
where
    S: DocumentStore,
    T: DeserializeOwned,
{
    pub fn new(store: S) -> Self {
        let (status, _) = watch::channel(LoadStatus::Pending);
        Self {
            store,
            template: AddressTemplate::default(),
            schemas: None,
            state: Mutex::new(LoaderState {
                generation: 0,
                current: None,
            }),
            status,
        }
    }

    pub fn with_template(mut self, template: AddressTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_schemas(mut self, schemas: Arc<SchemaSet>) -> Self {
        self.schemas = Some(schemas);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Issue one read for `id` and publish its outcome if it is still current.
    ///
    /// Switching to a new identifier resets the status to `Pending`; reloading
    /// the same identifier leaves the previous outcome visible until the new
    /// read lands. Returns the status visible once this read has finished.
    pub async fn load(&self, id: impl Into<ResourceId>) -> LoadStatus<T> {
        let id = id.into();
        let generation = self.begin(&id);
        let outcome = self.fetch_document(&id).await;
        self.complete(generation, &id, outcome);
        self.status()
    }

    /// Read, decode and validate one document without touching the status.
    pub async fn fetch_document(&self, id: &ResourceId) -> std::result::Result<T, LoadError> {
        let address = self.template.address(id);
        tracing::debug!(resource = %id, %address, "fetching document");

        let bytes = self
            .store
            .fetch(&address)
            .await
            .map_err(|source| LoadError::Fetch {
                id: id.clone(),
                source,
            })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|source| LoadError::Decode {
            id: id.clone(),
            source,
        })?;

        if let Some(schemas) = &self.schemas {
            schemas.check(id, &value).map_err(|details| LoadError::Schema {
                id: id.clone(),
                details,
            })?;
        }

        // A well-formed document of the wrong shape is a contract failure, not
        // a syntax failure.
        serde_json::from_value(value).map_err(|err| LoadError::Schema {
            id: id.clone(),
            details: vec![err.to_string()],
        })
    }

    pub fn status(&self) -> LoadStatus<T> {
        self.status.borrow().clone()
    }

    /// The snapshot to render, or `None` while pending or after a failure.
    pub fn snapshot(&self) -> Option<Arc<T>> {
        self.status.borrow().snapshot().cloned()
    }

    pub fn current_id(&self) -> Option<ResourceId> {
        lock(&self.state).current.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadStatus<T>> {
        self.status.subscribe()
    }

    fn begin(&self, id: &ResourceId) -> u64 {
        let mut state = lock(&self.state);
        state.generation += 1;
        if state.current.as_ref() != Some(id) {
            state.current = Some(id.clone());
            self.status.send_replace(LoadStatus::Pending);
        }
        state.generation
    }

    fn complete(&self, generation: u64, id: &ResourceId, outcome: std::result::Result<T, LoadError>) {
        let state = lock(&self.state);
        if state.generation != generation {
            tracing::debug!(
                resource = %id,
                generation,
                current = state.generation,
                "discarding superseded load result"
            );
            return;
        }
        let next = match outcome {
            Ok(snapshot) => LoadStatus::Ready(Arc::new(snapshot)),
            Err(err) => {
                tracing::warn!(resource = %id, error = %err, "document load failed");
                LoadStatus::Failed(err.to_string())
            }
        };
        self.status.send_replace(next);
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}
