//! In-memory entity table and binder

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use hostlink_common::testing::CallCounter;
use hostlink_core::{ConnectionHandle, RemoteTable, TableBinder};
use hostlink_domain::{ConnectorError, ConnectorResult};
use parking_lot::Mutex;

/// Table of `u32 -> String` rows with scripted failures
///
/// `rows()` returns rows in reverse key order so tests can tell it apart
/// from `sorted_rows()`.
#[derive(Default)]
pub struct MemoryTable {
    pub calls: CallCounter,
    rows: BTreeMap<u32, String>,
    failures: Mutex<VecDeque<ConnectorError>>,
}

impl MemoryTable {
    pub fn with_rows(rows: impl IntoIterator<Item = (u32, &'static str)>) -> Self {
        Self {
            rows: rows.into_iter().map(|(key, value)| (key, value.to_string())).collect(),
            ..Self::default()
        }
    }

    pub fn push_failure(&self, failure: ConnectorError) {
        self.failures.lock().push_back(failure);
    }

    fn next_failure(&self) -> ConnectorResult<()> {
        self.calls.hit();
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteTable<u32, String> for MemoryTable {
    async fn get(&self, key: &u32) -> ConnectorResult<String> {
        self.next_failure()?;
        self.rows.get(key).cloned().ok_or_else(|| ConnectorError::not_found("row", key))
    }

    async fn rows(&self) -> ConnectorResult<Vec<String>> {
        self.next_failure()?;
        Ok(self.rows.values().rev().cloned().collect())
    }

    async fn sorted_rows(&self) -> ConnectorResult<Vec<String>> {
        self.next_failure()?;
        Ok(self.rows.values().cloned().collect())
    }

    async fn size(&self) -> ConnectorResult<usize> {
        self.next_failure()?;
        Ok(self.rows.len())
    }
}

/// Binder handing out one shared table and recording the generations it
/// bound against
pub struct MockBinder {
    pub binds: CallCounter,
    pub generations: Arc<Mutex<Vec<u64>>>,
    table: Arc<MemoryTable>,
}

impl MockBinder {
    pub fn new(table: Arc<MemoryTable>) -> Self {
        Self { binds: CallCounter::new(), generations: Arc::default(), table }
    }
}

#[async_trait]
impl TableBinder<u32, String> for MockBinder {
    async fn bind(
        &self,
        connection: &ConnectionHandle,
    ) -> ConnectorResult<Arc<dyn RemoteTable<u32, String>>> {
        self.binds.hit();
        self.generations.lock().push(connection.generation());
        Ok(self.table.clone())
    }
}
