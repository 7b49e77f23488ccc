/// Storage layer for the node documentation catalog
///
/// This module handles all database operations using SQLite. It provides
/// a small read-mostly interface for listing, searching and fetching nodes.

pub mod sqlite;
pub mod migrations;
pub mod seed;

// Re-export the main storage types
pub use sqlite::*;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::domain::NodeDoc;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Node not found: {node_type}")]
    NodeNotFound { node_type: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Filters accepted by `NodeStore::list_nodes`
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    pub category: Option<String>,
    /// Full package name (see `domain::normalize_package`)
    pub package: Option<String>,
    pub is_trigger: Option<bool>,
    pub limit: usize,
}

/// Aggregate counts over the catalog
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatistics {
    pub total_nodes: usize,
    pub trigger_nodes: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_package: BTreeMap<String, usize>,
}

/// Trait defining the storage interface for node documentation
///
/// Implementations must be shareable across the blocking worker threads
/// that serve tool calls.
pub trait NodeStore: Send + Sync {
    /// Get a node by its short type (`nodes-base.httpRequest`)
    fn get_node(&self, node_type: &str) -> Result<NodeDoc, StorageError>;

    /// List nodes matching the filter, ordered by display name
    fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeDoc>, StorageError>;

    /// Case-insensitive search over type, display name and description
    fn search_nodes(&self, query: &str, limit: usize) -> Result<Vec<NodeDoc>, StorageError>;

    /// Insert or replace a node
    fn upsert_node(&self, node: &NodeDoc) -> Result<(), StorageError>;

    /// Count all stored nodes
    fn count_nodes(&self) -> Result<usize, StorageError>;

    /// Aggregate counts by category and package
    fn statistics(&self) -> Result<NodeStatistics, StorageError>;
}
