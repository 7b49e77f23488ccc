/// SQLite implementation of the node documentation store
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving node documentation. It handles all SQL queries and the
/// JSON encoding of property lists.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, Row};

use crate::domain::NodeDoc;
use crate::storage::{migrations, seed, NodeFilter, NodeStatistics, NodeStore, StorageError};

const NODE_COLUMNS: &str = "node_type, display_name, description, category, package, version, \
                            is_trigger, properties, operations";

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so a single store can be shared by
/// every tool call; SQLite serializes the work anyway.
pub struct SqliteNodeStore {
    conn: Mutex<Connection>,
}

impl SqliteNodeStore {
    /// Open (or create) the database file, migrate it and seed the catalog
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let store = Self::from_connection(conn)?;
        tracing::info!("SQLite node store initialized at: {:?}", db_path);
        Ok(store)
    }

    /// Open a seeded in-memory store
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        migrations::initialize_database(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        seed::seed_if_empty(&store)?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Connection("database lock poisoned".to_string()))
    }

    fn row_to_node(row: &Row<'_>) -> rusqlite::Result<NodeDoc> {
        let properties_json: String = row.get(7)?;
        let properties = serde_json::from_str(&properties_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let operations_json: String = row.get(8)?;
        let operations = serde_json::from_str(&operations_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(NodeDoc {
            node_type: row.get(0)?,
            display_name: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            package: row.get(4)?,
            version: row.get(5)?,
            is_trigger: row.get(6)?,
            properties,
            operations,
        })
    }

    fn grouped_counts(conn: &Connection, column: &str) -> Result<BTreeMap<String, usize>, StorageError> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {column}, COUNT(*) FROM nodes GROUP BY {column}"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
        })?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (key, count) = row?;
            counts.insert(key, count);
        }
        Ok(counts)
    }
}

impl NodeStore for SqliteNodeStore {
    fn get_node(&self, node_type: &str) -> Result<NodeDoc, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE node_type = ?1"
        ))?;

        match stmt.query_row(params![node_type], Self::row_to_node) {
            Ok(node) => Ok(node),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::NodeNotFound {
                node_type: node_type.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeDoc>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes
             WHERE (?1 IS NULL OR category = ?1)
               AND (?2 IS NULL OR package = ?2)
               AND (?3 IS NULL OR is_trigger = ?3)
             ORDER BY display_name
             LIMIT ?4"
        ))?;

        let rows = stmt.query_map(
            params![filter.category, filter.package, filter.is_trigger, filter.limit as i64],
            Self::row_to_node,
        )?;

        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(row?);
        }
        Ok(nodes)
    }

    fn search_nodes(&self, query: &str, limit: usize) -> Result<Vec<NodeDoc>, StorageError> {
        let needle = query.trim().to_lowercase();
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes
             WHERE lower(node_type) LIKE ?1 ESCAPE '\\'
                OR lower(display_name) LIKE ?1 ESCAPE '\\'
                OR lower(description) LIKE ?1 ESCAPE '\\'
             ORDER BY CASE
                 WHEN lower(display_name) = ?2 THEN 0
                 WHEN lower(display_name) LIKE ?3 ESCAPE '\\' THEN 1
                 ELSE 2
             END, display_name
             LIMIT ?4"
        ))?;

        let pattern = escape_like(&needle);
        let rows = stmt.query_map(
            params![
                format!("%{}%", pattern),
                needle,
                format!("{}%", pattern),
                limit as i64
            ],
            Self::row_to_node,
        )?;

        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(row?);
        }
        Ok(nodes)
    }

    fn upsert_node(&self, node: &NodeDoc) -> Result<(), StorageError> {
        let properties_json = serde_json::to_string(&node.properties)?;
        let operations_json = serde_json::to_string(&node.operations)?;

        self.conn()?.execute(
            &format!(
                "INSERT OR REPLACE INTO nodes ({NODE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                node.node_type,
                node.display_name,
                node.description,
                node.category,
                node.package,
                node.version,
                node.is_trigger,
                properties_json,
                operations_json
            ],
        )?;

        tracing::debug!("Stored node: {}", node.node_type);
        Ok(())
    }

    fn count_nodes(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn statistics(&self) -> Result<NodeStatistics, StorageError> {
        let conn = self.conn()?;
        let (total, triggers): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_trigger), 0) FROM nodes",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(NodeStatistics {
            total_nodes: total as usize,
            trigger_nodes: triggers as usize,
            by_category: Self::grouped_counts(&conn, "category")?,
            by_package: Self::grouped_counts(&conn, "package")?,
        })
    }
}

/// Make `%`, `_` and `\` match literally inside a LIKE pattern
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
