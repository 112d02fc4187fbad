//! Lists and items in SQLite.
//!
//! Every write is a single statement, so each one is atomic on its own.
//! Listings come back newest first; items embedded in a list come back in
//! insertion order.

use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use lists_api::{Id, Item, ItemChanges, List, ListChanges, NewItem, NewList};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{de, Deserialize, Deserializer};

use crate::db::{self, StoreError, StoreResult};

const LIST_COLUMNS: &str = "id, user_id, name, created_at";
const ITEM_COLUMNS: &str = "id, list_id, title, description, quantity, is_done, created_at";

/// A stored list, without its items
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub id: Id,
    /// Owning user, if any
    pub user_id: Option<i64>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl ListRow {
    pub fn into_list(self, items: Vec<Item>) -> List {
        List {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
            items,
        }
    }
}

/// Query-string filters; empty values filter nothing
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListFilter {
    /// Case-insensitive substring of the name
    #[serde(default, deserialize_with = "non_empty")]
    pub search: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ItemFilter {
    #[serde(default, deserialize_with = "list_id")]
    pub list: Option<Id>,
    #[serde(default, deserialize_with = "flag")]
    pub is_done: Option<bool>,
    /// Case-insensitive substring of the title
    #[serde(default, deserialize_with = "non_empty")]
    pub search: Option<String>,
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty()))
}

fn list_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Id>, D::Error> {
    non_empty(deserializer)?
        .map(|raw| raw.parse().map_err(de::Error::custom))
        .transpose()
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    non_empty(deserializer)?
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(de::Error::custom(format!("`{}` is not a boolean", raw))),
        })
        .transpose()
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: db::open(path)?,
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }

    pub fn lists(&self, filter: &ListFilter) -> StoreResult<Vec<ListRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LIST_COLUMNS} FROM lists
             WHERE (?1 IS NULL OR instr(lower(name), lower(?1)) > 0)
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![filter.search], list_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn list(&self, id: Id) -> StoreResult<Option<ListRow>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1"),
                params![id.get()],
                list_row,
            )
            .optional()?)
    }

    pub fn list_exists(&self, id: Id) -> StoreResult<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM lists WHERE id = ?1)",
            params![id.get()],
            |row| row.get(0),
        )?)
    }

    /// Items of one list in insertion order
    pub fn list_items(&self, list: Id) -> StoreResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE list_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![list.get()], item_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn insert_list(&self, new: &NewList) -> StoreResult<ListRow> {
        let created_at = now();
        self.conn.execute(
            "INSERT INTO lists (name, created_at) VALUES (?1, ?2)",
            params![new.name, created_at.timestamp_micros()],
        )?;
        Ok(ListRow {
            id: Id::new(self.conn.last_insert_rowid()),
            user_id: None,
            name: new.name.clone(),
            created_at,
        })
    }

    /// `None` when there is no such list
    pub fn update_list(&self, id: Id, changes: &ListChanges) -> StoreResult<Option<ListRow>> {
        let changed = self.conn.execute(
            "UPDATE lists SET name = COALESCE(?1, name) WHERE id = ?2",
            params![changes.name, id.get()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.list(id)
    }

    /// Remove a list and, through the foreign key, all of its items
    pub fn delete_list(&self, id: Id) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM lists WHERE id = ?1", params![id.get()])?;
        Ok(changed > 0)
    }

    pub fn items(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE (?1 IS NULL OR list_id = ?1)
               AND (?2 IS NULL OR is_done = ?2)
               AND (?3 IS NULL OR instr(lower(title), lower(?3)) > 0)
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(
            params![filter.list.map(Id::get), filter.is_done, filter.search],
            item_row,
        )?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn item(&self, id: Id) -> StoreResult<Option<Item>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
                params![id.get()],
                item_row,
            )
            .optional()?)
    }

    pub fn insert_item(&self, new: &NewItem) -> StoreResult<Item> {
        let created_at = now();
        self.conn.execute(
            "INSERT INTO items (list_id, title, description, quantity, is_done, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.list.get(),
                new.title,
                new.description,
                new.quantity,
                new.is_done,
                created_at.timestamp_micros(),
            ],
        )?;
        Ok(Item {
            id: Id::new(self.conn.last_insert_rowid()),
            list: new.list,
            title: new.title.clone(),
            description: new.description.clone(),
            quantity: new.quantity,
            is_done: new.is_done,
            created_at,
        })
    }

    /// `None` when there is no such item
    pub fn update_item(&self, id: Id, changes: &ItemChanges) -> StoreResult<Option<Item>> {
        let changed = self.conn.execute(
            "UPDATE items SET
                list_id = COALESCE(?1, list_id),
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                quantity = COALESCE(?4, quantity),
                is_done = COALESCE(?5, is_done)
             WHERE id = ?6",
            params![
                changes.list.map(Id::get),
                changes.title,
                changes.description,
                changes.quantity,
                changes.is_done,
                id.get(),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.item(id)
    }

    pub fn delete_item(&self, id: Id) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1", params![id.get()])?;
        Ok(changed > 0)
    }
}

/// Current time at the precision the store keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let micros: i64 = row.get(idx)?;
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            Box::new(StoreError::InvalidData(format!(
                "timestamp out of range: {micros}"
            ))),
        )
    })
}

fn list_row(row: &Row) -> rusqlite::Result<ListRow> {
    Ok(ListRow {
        id: Id::new(row.get(0)?),
        user_id: row.get(1)?,
        name: row.get(2)?,
        created_at: timestamp(row, 3)?,
    })
}

fn item_row(row: &Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: Id::new(row.get(0)?),
        list: Id::new(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        quantity: row.get(4)?,
        is_done: row.get(5)?,
        created_at: timestamp(row, 6)?,
    })
}
