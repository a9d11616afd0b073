//! Plugin host
//!
//! Holds the table registry and the lazily created session, validates key
//! columns for point lookups, and hands rows back to the caller.
//!
//! - [`column`] - Column types, values and typed column definitions
//! - [`table`] - Table definitions and the list/get traits
//! - [`transform`] - Shared transforms (akas, subscription id)

pub mod column;
pub mod table;
pub mod transform;

pub use column::{Column, ColumnDef, ColumnType, ColumnValue};
pub use table::{GetConfig, ListStream, QueryKey, ResourceTable, Row, Table, TableDefinition};

use crate::azure::Session;
use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{mpsc, OnceCell};

/// Table registry plus a session shared by every query
pub struct Plugin {
    tables: BTreeMap<&'static str, Arc<dyn Table>>,
    config: Config,
    session: OnceCell<Session>,
}

impl Plugin {
    /// Plugin with every known table; the session is created on first use
    pub fn new(config: Config) -> Self {
        let mut plugin = Self {
            tables: BTreeMap::new(),
            config,
            session: OnceCell::new(),
        };
        for table in crate::tables::all_tables() {
            plugin.register(table);
        }
        plugin
    }

    /// Plugin with every known table bound to an existing session
    pub fn with_session(session: Session) -> Self {
        let plugin = Self::new(Config::default());
        // A fresh cell cannot already be set
        let _ = plugin.session.set(session);
        plugin
    }

    pub fn register(&mut self, table: Arc<dyn Table>) {
        tracing::debug!("Registering table {}", table.name());
        self.tables.insert(table.name(), table);
    }

    pub fn table(&self, name: &str) -> Result<&Arc<dyn Table>> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Table names in sorted order
    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables.keys().copied().collect()
    }

    /// The plugin's session, created from configuration on first call
    pub async fn session(&self) -> Result<&Session> {
        self.session
            .get_or_try_init(|| async { Session::from_config(&self.config) })
            .await
    }

    /// Stream every row of `table` into `rows`
    pub async fn list(&self, table: &str, rows: mpsc::Sender<Row>) -> Result<()> {
        let table = self.table(table)?;
        let session = self.session().await?;
        tracing::info!("list {}", table.name());
        table.list_rows(session, rows).await
    }

    /// Point lookup by key-column qualifiers
    pub async fn get(&self, table: &str, quals: &HashMap<String, String>) -> Result<Option<Row>> {
        let table = self.table(table)?;
        let key = QueryKey::from_quals(table.key_columns(), quals)?;
        let session = self.session().await?;
        tracing::info!("get {} {:?}", table.name(), key);
        table.get_row(session, &key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contains_app_service_tables() {
        let plugin = Plugin::new(Config::default());
        assert_eq!(
            plugin.table_names(),
            vec!["azure_app_service_function_app", "azure_app_service_plan"]
        );
    }

    #[test]
    fn test_unknown_table() {
        let plugin = Plugin::new(Config::default());
        assert!(matches!(
            plugin.table("azure_vm"),
            Err(Error::UnknownTable(_))
        ));
    }

    #[tokio::test]
    async fn test_get_requires_key_columns_before_session() {
        // No subscription configured: a session would fail, key validation comes first
        let plugin = Plugin::new(Config::default());
        let quals = HashMap::from([("name".to_string(), "app1".to_string())]);

        let result = plugin.get("azure_app_service_plan", &quals).await;
        assert!(matches!(result, Err(Error::MissingKeyColumn(_))));
    }

    #[tokio::test]
    async fn test_session_requires_subscription() {
        let plugin = Plugin::new(Config::default());
        assert!(matches!(plugin.session().await, Err(Error::Config(_))));
    }
}
