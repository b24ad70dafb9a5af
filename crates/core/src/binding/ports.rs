//! Port interfaces for per-entity remote tables

use std::sync::Arc;

use async_trait::async_trait;
use hostlink_domain::ConnectorResult;

use crate::connection::ConnectionHandle;

/// Remote stub for one entity table, bound to one session
///
/// Each method is a single remote call. A missing row is reported as
/// `ConnectorError::NotFound`; the service layer turns it into `None`.
#[async_trait]
pub trait RemoteTable<K, V>: Send + Sync {
    /// Fetch one row by key.
    async fn get(&self, key: &K) -> ConnectorResult<V>;

    /// Fetch every row, in the order the host returns them.
    async fn rows(&self) -> ConnectorResult<Vec<V>>;

    /// Fetch every row, sorted by the host's natural key order.
    async fn sorted_rows(&self) -> ConnectorResult<Vec<V>>;

    /// Number of rows.
    async fn size(&self) -> ConnectorResult<usize>;

    async fn is_empty(&self) -> ConnectorResult<bool> {
        Ok(self.size().await? == 0)
    }
}

/// Produces the remote stub for a table from a live connection
///
/// Called with the connector's connection lock held: implementations must
/// not call back into the connector.
#[async_trait]
pub trait TableBinder<K, V>: Send + Sync {
    async fn bind(&self, connection: &ConnectionHandle) -> ConnectorResult<Arc<dyn RemoteTable<K, V>>>;
}

#[async_trait]
impl<K, V, F> TableBinder<K, V> for F
where
    F: Fn(&ConnectionHandle) -> ConnectorResult<Arc<dyn RemoteTable<K, V>>> + Send + Sync,
{
    async fn bind(&self, connection: &ConnectionHandle) -> ConnectorResult<Arc<dyn RemoteTable<K, V>>> {
        self(connection)
    }
}
