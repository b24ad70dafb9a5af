//! Lazily bound entity service
//!
//! The one generic shape behind every per-entity table. A service starts
//! unbound; the first call that needs the remote stub takes the connector's
//! connection lock, checks again, connects if the connector has no live
//! connection, and binds. Everyone else who queued on the lock finds the
//! binding in place and goes straight to the remote call.
//!
//! A binding remembers the connection generation it was built on. Once the
//! connector moves to another generation (reconnect, invalidate,
//! disconnect) the binding is stale and the next call rebinds.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use hostlink_common::ErrorClassification;
use hostlink_domain::{ConnectorError, ConnectorResult};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::ports::{RemoteTable, TableBinder};
use crate::connector::ResilientConnector;

struct Binding<K, V> {
    generation: u64,
    table: Arc<dyn RemoteTable<K, V>>,
}

impl<K, V> Clone for Binding<K, V> {
    fn clone(&self) -> Self {
        Self { generation: self.generation, table: Arc::clone(&self.table) }
    }
}

/// Entity table service routed through a [`ResilientConnector`]
///
/// Each routed attempt may have to connect first, and connecting runs the
/// factory's own retry loop. The two loops nest: against a host that never
/// comes back, one call makes up to `max_attempts²` connect attempts
/// (625 with the standard table) and sleeps `max_attempts + 1` times the
/// schedule's total wait (26 × 10.2 s with the standard table) before
/// failing. Callers that
/// need a tighter bound pass a shorter schedule or cancel through
/// [`ResilientConnector::cancellation_token`].
pub struct LazyBoundService<K, V> {
    connector: Arc<ResilientConnector>,
    resource: String,
    binder: Box<dyn TableBinder<K, V>>,
    binding: RwLock<Option<Binding<K, V>>>,
}

impl<K, V> LazyBoundService<K, V>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Create an unbound service. Nothing remote happens here.
    pub fn new<B>(connector: Arc<ResilientConnector>, resource: impl Into<String>, binder: B) -> Self
    where
        B: TableBinder<K, V> + 'static,
    {
        Self {
            connector,
            resource: resource.into(),
            binder: Box::new(binder),
            binding: RwLock::new(None),
        }
    }

    /// Name of the entity table, used in logs.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Connector every call is routed through.
    pub fn connector(&self) -> &Arc<ResilientConnector> {
        &self.connector
    }

    /// `true` if a binding exists for the connector's live connection.
    pub fn is_bound(&self) -> bool {
        self.current_binding().is_some()
    }

    /// Drop the binding; the next call rebinds.
    pub fn invalidate(&self) {
        if self.binding.write().take().is_some() {
            debug!(resource = %self.resource, "binding dropped");
        }
    }

    /// One row by key; `None` when the host reports it absent.
    ///
    /// # Errors
    /// `ForbiddenContext`, `Cancelled`, or the last remote failure once
    /// retries are exhausted.
    #[instrument(skip(self, key), fields(resource = %self.resource))]
    pub async fn get(&self, key: &K) -> ConnectorResult<Option<V>> {
        match self.routed("get", move |table| async move { table.get(key).await }).await {
            Ok(row) => Ok(Some(row)),
            Err(err) if err.is_not_found() => {
                debug!(error = %err, "row absent");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Every row.
    ///
    /// # Errors
    /// As [`get`](Self::get), except that "not found" is an error here.
    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn get_all(&self) -> ConnectorResult<Vec<V>> {
        self.routed("get_all", |table| async move { table.rows().await }).await
    }

    /// Every row, sorted by the host.
    ///
    /// # Errors
    /// As [`get_all`](Self::get_all).
    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn get_sorted(&self) -> ConnectorResult<Vec<V>> {
        self.routed("get_sorted", |table| async move { table.sorted_rows().await }).await
    }

    /// `true` if the table has no rows.
    ///
    /// # Errors
    /// As [`get_all`](Self::get_all).
    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn is_empty(&self) -> ConnectorResult<bool> {
        self.routed("is_empty", |table| async move { table.is_empty().await }).await
    }

    /// Number of rows.
    ///
    /// # Errors
    /// As [`get_all`](Self::get_all).
    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn size(&self) -> ConnectorResult<usize> {
        self.routed("size", |table| async move { table.size().await }).await
    }

    /// Guard, then one retried remote call against the bound stub.
    async fn routed<T, F, Fut>(&self, operation: &str, call: F) -> ConnectorResult<T>
    where
        F: Fn(Arc<dyn RemoteTable<K, V>>) -> Fut,
        Fut: Future<Output = ConnectorResult<T>>,
    {
        self.connector.guard().assert_allowed(operation)?;

        let cancel = self.connector.cancellation_token();
        let call = &call;
        let cancel_ref = &cancel;
        self.connector
            .invoke_with_cancel(operation, true, cancel_ref, || async move {
                let binding = self.ensure_bound(cancel_ref).await?;
                let result = call(Arc::clone(&binding.table)).await;
                if let Err(err) = &result {
                    self.on_failure(err, binding.generation).await;
                }
                result
            })
            .await
    }

    async fn on_failure(&self, err: &ConnectorError, generation: u64) {
        if err.is_connection_loss() && self.connector.invalidate(generation).await {
            info!(resource = %self.resource, generation, error = %err, "connection lost, will reconnect");
        }
    }

    /// Binding for the live connection, building it under the connection
    /// lock if needed.
    async fn ensure_bound(&self, cancel: &CancellationToken) -> ConnectorResult<Binding<K, V>> {
        if let Some(binding) = self.current_binding() {
            return Ok(binding);
        }

        let mut slot = self.connector.lock_slot().await;
        if let Some(binding) = self.current_binding() {
            return Ok(binding);
        }

        let handle = slot.handle_or_connect(cancel).await?;
        let table = self.binder.bind(&handle).await?;
        let binding = Binding { generation: handle.generation(), table };
        *self.binding.write() = Some(binding.clone());
        debug!(resource = %self.resource, generation = handle.generation(), "bound");
        drop(slot);

        Ok(binding)
    }

    fn current_binding(&self) -> Option<Binding<K, V>> {
        let live = self.connector.current_generation()?;
        self.binding.read().as_ref().filter(|binding| binding.generation == live).cloned()
    }
}

impl<K, V> fmt::Debug for LazyBoundService<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBoundService")
            .field("resource", &self.resource)
            .field("bound_generation", &self.binding.read().as_ref().map(|binding| binding.generation))
            .finish_non_exhaustive()
    }
}
