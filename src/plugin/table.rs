//! Table traits and definitions
//!
//! A resource table is a [`TableDefinition`] (schema plus get configuration)
//! and two retrieval functions. [`ResourceTable`] is what a table implements
//! over its typed record; [`Table`] is the object-safe, row-producing view the
//! plugin host works with.

use super::column::{Column, ColumnDef, ColumnValue};
use crate::azure::Session;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;

/// Column name to cell
pub type Row = BTreeMap<String, ColumnValue>;

/// Composite key of a point lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryKey {
    pub name: String,
    pub resource_group: String,
}

impl QueryKey {
    pub fn new(name: &str, resource_group: &str) -> Self {
        Self {
            name: name.to_string(),
            resource_group: resource_group.to_string(),
        }
    }

    /// Build a key from query qualifiers. Every key column must be present;
    /// an empty value is allowed and left to the table to judge.
    pub fn from_quals(key_columns: &[&str], quals: &HashMap<String, String>) -> Result<Self> {
        if let Some(missing) = key_columns.iter().find(|c| !quals.contains_key(**c)) {
            return Err(Error::MissingKeyColumn(missing.to_string()));
        }

        let get = |column: &str| quals.get(column).cloned().unwrap_or_default();
        Ok(Self {
            name: get("name"),
            resource_group: get("resource_group"),
        })
    }
}

/// How point lookups are configured for a table
#[derive(Debug, Clone)]
pub struct GetConfig {
    pub key_columns: &'static [&'static str],
    /// ARM error codes that mean "no such row" rather than failure
    pub ignore_error_codes: &'static [&'static str],
}

impl GetConfig {
    pub fn should_ignore_error(&self, err: &Error) -> bool {
        err.code()
            .is_some_and(|code| self.ignore_error_codes.contains(&code))
    }
}

/// Schema of a table over records of type `R`
pub struct TableDefinition<R> {
    pub name: &'static str,
    pub description: &'static str,
    pub get_config: GetConfig,
    pub columns: Vec<Column<R>>,
}

impl<R> TableDefinition<R> {
    /// Project a record into a row holding every column
    pub fn project(&self, record: &R) -> Row {
        self.columns
            .iter()
            .map(|c| (c.name().to_string(), c.value(record)))
            .collect()
    }

    pub fn column_defs(&self) -> Vec<ColumnDef> {
        self.columns.iter().map(Column::def).collect()
    }
}

/// Sink a list retriever streams records into, one at a time.
/// Records are projected to rows as they arrive.
pub struct ListStream<'a, R> {
    definition: &'a TableDefinition<R>,
    rows: mpsc::Sender<Row>,
}

impl<'a, R> ListStream<'a, R> {
    pub fn new(definition: &'a TableDefinition<R>, rows: mpsc::Sender<Row>) -> Self {
        Self { definition, rows }
    }

    /// Emit one record. Returns `false` when the consumer has gone away and
    /// listing should stop.
    pub async fn stream_list_item(&self, item: &R) -> bool {
        let row = self.definition.project(item);
        self.rows.send(row).await.is_ok()
    }
}

/// A table over a typed Azure record
#[async_trait]
pub trait ResourceTable: Send + Sync + 'static {
    type Record: Send + Sync + 'static;

    fn definition(&self) -> &TableDefinition<Self::Record>;

    /// Stream every record of this table
    async fn list(&self, session: &Session, stream: &ListStream<'_, Self::Record>) -> Result<()>;

    /// Fetch a single record, `None` when it does not exist
    async fn get(&self, session: &Session, key: &QueryKey) -> Result<Option<Self::Record>>;
}

/// Row-level, object-safe view of a table
#[async_trait]
pub trait Table: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn columns(&self) -> Vec<ColumnDef>;
    fn key_columns(&self) -> &'static [&'static str];

    /// Stream all rows into `rows`. Returns once listing is complete, failed,
    /// or the receiver was dropped.
    async fn list_rows(&self, session: &Session, rows: mpsc::Sender<Row>) -> Result<()>;

    /// Fetch one row. Errors in the table's ignore list become `None`.
    async fn get_row(&self, session: &Session, key: &QueryKey) -> Result<Option<Row>>;
}

#[async_trait]
impl<T: ResourceTable> Table for T {
    fn name(&self) -> &'static str {
        self.definition().name
    }

    fn description(&self) -> &'static str {
        self.definition().description
    }

    fn columns(&self) -> Vec<ColumnDef> {
        self.definition().column_defs()
    }

    fn key_columns(&self) -> &'static [&'static str] {
        self.definition().get_config.key_columns
    }

    async fn list_rows(&self, session: &Session, rows: mpsc::Sender<Row>) -> Result<()> {
        let stream = ListStream::new(self.definition(), rows);
        self.list(session, &stream).await
    }

    async fn get_row(&self, session: &Session, key: &QueryKey) -> Result<Option<Row>> {
        let definition = self.definition();
        match self.get(session, key).await {
            Ok(Some(record)) => Ok(Some(definition.project(&record))),
            Ok(None) => Ok(None),
            Err(err) if definition.get_config.should_ignore_error(&err) => {
                tracing::debug!("{}: ignoring error for {:?}: {}", definition.name, key, err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
