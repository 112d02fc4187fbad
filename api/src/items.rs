use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationErrors;
use crate::fields::{FieldReader, Payload, TextRule, WriteMode};
use crate::id::Id;

pub const TITLE_MAX_LEN: usize = 255;
pub const QUANTITY_MAX: u32 = 2_147_483_647;
pub const DEFAULT_QUANTITY: u32 = 1;

const TITLE: TextRule = TextRule {
    required: true,
    max_len: Some(TITLE_MAX_LEN),
    allow_blank: false,
};

const DESCRIPTION: TextRule = TextRule {
    required: false,
    max_len: None,
    allow_blank: true,
};

/// A single entry within a list
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Id,
    /// Owning list
    pub list: Id,
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (x{})", self.title, self.quantity)
    }
}

/// Validated body of a create request with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub list: Id,
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub is_done: bool,
}

impl NewItem {
    /// `list_exists` resolves the owning list reference.
    pub fn from_payload<E>(
        payload: &Payload,
        list_exists: impl FnOnce(Id) -> Result<bool, E>,
    ) -> Result<Self, E>
    where
        E: From<ValidationErrors>,
    {
        let (changes, errors) = read(payload, WriteMode::Create, list_exists)?;
        match (changes.list, changes.title) {
            (Some(list), Some(title)) if errors.is_empty() => Ok(NewItem {
                list,
                title,
                description: changes.description.unwrap_or_default(),
                quantity: changes.quantity.unwrap_or(DEFAULT_QUANTITY),
                is_done: changes.is_done.unwrap_or(false),
            }),
            _ => Err(errors.into()),
        }
    }
}

/// Validated body of an update request; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    pub list: Option<Id>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub is_done: Option<bool>,
}

impl ItemChanges {
    pub fn from_payload<E>(
        payload: &Payload,
        mode: WriteMode,
        list_exists: impl FnOnce(Id) -> Result<bool, E>,
    ) -> Result<Self, E>
    where
        E: From<ValidationErrors>,
    {
        let (changes, errors) = read(payload, mode, list_exists)?;
        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors.into())
        }
    }
}

fn read<E>(
    payload: &Payload,
    mode: WriteMode,
    list_exists: impl FnOnce(Id) -> Result<bool, E>,
) -> Result<(ItemChanges, ValidationErrors), E> {
    let mut fields = FieldReader::new(payload, mode);
    let changes = ItemChanges {
        list: fields.related("list", list_exists)?,
        title: fields.text("title", &TITLE),
        description: fields.text("description", &DESCRIPTION),
        quantity: fields.count("quantity", QUANTITY_MAX),
        is_done: fields.flag("is_done"),
    };
    Ok((changes, fields.into_errors()))
}
