//! Wire representation of lists and items.
//!
//! Output types serialize straight to the JSON the HTTP API returns. Inbound
//! bodies are read field by field into `New*`/`*Changes` values so every
//! problem with a request can be reported against the field that caused it.

mod errors;
mod fields;
mod id;
mod items;
mod lists;

pub use errors::{ValidationErrors, NON_FIELD_ERRORS};
pub use fields::{payload, Payload, WriteMode};
pub use id::{Id, ParseIdError};
pub use items::{Item, ItemChanges, NewItem, DEFAULT_QUANTITY, QUANTITY_MAX, TITLE_MAX_LEN};
pub use lists::{List, ListChanges, NewList, NAME_MAX_LEN};
