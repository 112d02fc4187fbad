use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationErrors;
use crate::fields::{FieldReader, Payload, TextRule, WriteMode};
use crate::id::Id;
use crate::items::Item;

pub const NAME_MAX_LEN: usize = 100;

const NAME: TextRule = TextRule {
    required: true,
    max_len: Some(NAME_MAX_LEN),
    allow_blank: false,
};

/// A named collection of items
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct List {
    pub id: Id,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Output only; never read from requests
    pub items: Vec<Item>,
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validated body of a create request
#[derive(Debug, Clone, PartialEq)]
pub struct NewList {
    pub name: String,
}

impl NewList {
    pub fn from_payload(payload: &Payload) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new(payload, WriteMode::Create);
        let name = fields.text("name", &NAME);
        let errors = fields.into_errors();
        match name {
            Some(name) if errors.is_empty() => Ok(NewList { name }),
            _ => Err(errors),
        }
    }
}

/// Validated body of an update request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListChanges {
    pub name: Option<String>,
}

impl ListChanges {
    pub fn from_payload(payload: &Payload, mode: WriteMode) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new(payload, mode);
        let changes = ListChanges {
            name: fields.text("name", &NAME),
        };
        let errors = fields.into_errors();
        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, Value};

    fn object(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn create_takes_name_and_ignores_read_only_fields() {
        let list = NewList::from_payload(&object(json!({
            "id": 99,
            "name": "Shopping",
            "created_at": "2020-01-01T00:00:00Z",
            "items": [{"title": "Salt"}],
        })))
        .unwrap();

        assert_eq!(list, NewList { name: "Shopping".to_owned() });
    }

    #[test]
    fn create_requires_a_name() {
        let errors = NewList::from_payload(&object(json!({}))).unwrap_err();
        assert_eq!(
            errors.field("name"),
            Some(&["This field is required.".to_owned()][..])
        );
    }

    #[test]
    fn name_is_bounded() {
        let long = "x".repeat(NAME_MAX_LEN + 1);
        let errors = NewList::from_payload(&object(json!({ "name": long }))).unwrap_err();
        assert_eq!(
            errors.field("name"),
            Some(&["Ensure this field has no more than 100 characters.".to_owned()][..])
        );
    }

    #[test]
    fn partial_update_may_be_empty() {
        let changes = ListChanges::from_payload(&object(json!({})), WriteMode::Partial).unwrap();
        assert_eq!(changes, ListChanges::default());

        assert!(ListChanges::from_payload(&object(json!({})), WriteMode::Replace).is_err());
    }

    #[test]
    fn displays_as_name() {
        let list = List {
            id: Id::new(1),
            name: "Home".to_owned(),
            created_at: Utc::now(),
            items: vec![],
        };
        assert_eq!(list.to_string(), "Home");
    }
}
