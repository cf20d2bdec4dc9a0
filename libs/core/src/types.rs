//! Records carried by the storage service's operations.
//!
//! The client never interprets these; they travel verbatim between the
//! caller and the remote service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// UTF-8 or binary text such as table names, row keys and `family:qualifier` columns
pub type Text = Vec<u8>;

/// Opaque bytes
pub type Bytes = Vec<u8>;

/// Per-call attributes forwarded to the server
pub type Attributes = BTreeMap<String, Vec<u8>>;

/// Server-side handle of an open scanner
pub type ScannerId = i32;

/// A single versioned cell value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: Bytes,
    pub timestamp: i64,
}

/// A column name paired with its cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: Text,
    pub cell: Cell,
}

/// One row returned by a get or scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowResult {
    pub row: Text,
    pub columns: BTreeMap<Text, Cell>,
    pub sorted_columns: Option<Vec<Column>>,
}

/// Column family settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: Text,
    pub max_versions: i32,
    pub compression: String,
    pub in_memory: bool,
    pub bloom_filter_type: String,
    pub bloom_filter_vector_size: i32,
    pub bloom_filter_nb_hashes: i32,
    pub block_cache_enabled: bool,
    pub time_to_live: i32,
}

impl Default for ColumnDescriptor {
    fn default() -> Self {
        Self {
            name: Text::new(),
            max_versions: 3,
            compression: "NONE".to_string(),
            in_memory: false,
            bloom_filter_type: "NONE".to_string(),
            bloom_filter_vector_size: 0,
            bloom_filter_nb_hashes: 0,
            block_cache_enabled: false,
            time_to_live: i32::MAX,
        }
    }
}

/// Location and key range of a table region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub start_key: Text,
    pub end_key: Text,
    pub id: i64,
    pub name: Text,
    pub version: i8,
    pub server_name: Text,
    pub port: i32,
}

/// A put or delete of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    pub is_delete: bool,
    pub column: Text,
    pub value: Text,
    pub write_to_wal: bool,
}

impl Default for Mutation {
    fn default() -> Self {
        Self {
            is_delete: false,
            column: Text::new(),
            value: Text::new(),
            write_to_wal: true,
        }
    }
}

/// Mutations grouped by row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMutation {
    pub row: Text,
    pub mutations: Vec<Mutation>,
}

/// An atomic counter increment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Increment {
    pub table: Text,
    pub row: Text,
    pub column: Text,
    pub amount: i64,
}

/// Scanner parameters; unset fields use the server defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    pub start_row: Option<Text>,
    pub stop_row: Option<Text>,
    pub timestamp: Option<i64>,
    pub columns: Option<Vec<Text>>,
    pub caching: Option<i32>,
    pub filter_string: Option<Text>,
    pub batch_size: Option<i32>,
    pub sort_columns: Option<bool>,
    pub reversed: Option<bool>,
}

/// Values appended to columns of a single row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Append {
    pub table: Text,
    pub row: Text,
    pub columns: Vec<Text>,
    pub values: Vec<Text>,
}
