//! Field-by-field reading of inbound JSON objects.
//!
//! Every problem found is recorded against the field it belongs to; reading
//! carries on so a single response can report all of them.

use serde_json::{Map, Value};

use crate::errors::{type_name, ValidationErrors, NON_FIELD_ERRORS};
use crate::id::Id;

/// Inbound request body
pub type Payload = Map<String, Value>;

/// How much of a record a payload has to describe
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// A new record; required fields must be present, defaults fill the rest
    Create,
    /// Full update; required fields must be present
    Replace,
    /// Partial update; only present fields change
    Partial,
}

impl WriteMode {
    fn requires_all(self) -> bool {
        !matches!(self, WriteMode::Partial)
    }
}

/// Borrow the body as a JSON object or explain what it was instead
pub fn payload(value: &Value) -> Result<&Payload, ValidationErrors> {
    value.as_object().ok_or_else(|| {
        ValidationErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(value)
            ),
        )
    })
}

pub(crate) struct TextRule {
    pub required: bool,
    pub max_len: Option<usize>,
    pub allow_blank: bool,
}

pub(crate) struct FieldReader<'a> {
    payload: &'a Payload,
    mode: WriteMode,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(payload: &'a Payload, mode: WriteMode) -> Self {
        Self {
            payload,
            mode,
            errors: ValidationErrors::new(),
        }
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// Look a field up, recording missing required fields and nulls
    fn present(&mut self, field: &str, required: bool) -> Option<&'a Value> {
        let payload = self.payload;
        match payload.get(field) {
            None => {
                if required && self.mode.requires_all() {
                    self.fail(field, "This field is required.");
                }
                None
            }
            Some(Value::Null) => {
                self.fail(field, "This field may not be null.");
                None
            }
            Some(value) => Some(value),
        }
    }

    pub fn text(&mut self, field: &str, rule: &TextRule) -> Option<String> {
        let value = self.present(field, rule.required)?;
        let text = match value {
            Value::String(s) => s.trim().to_owned(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.fail(field, "Not a valid string.");
                return None;
            }
        };

        if text.is_empty() && !rule.allow_blank {
            self.fail(field, "This field may not be blank.");
            return None;
        }
        if text.contains('\0') {
            self.fail(field, "Null characters are not allowed.");
            return None;
        }
        if let Some(max_len) = rule.max_len {
            if text.chars().count() > max_len {
                self.fail(
                    field,
                    format!("Ensure this field has no more than {} characters.", max_len),
                );
                return None;
            }
        }
        Some(text)
    }

    /// A non-negative integer no larger than `max`
    pub fn count(&mut self, field: &str, max: u32) -> Option<u32> {
        let value = self.present(field, false)?;
        let Some(n) = integer(value) else {
            self.fail(field, "A valid integer is required.");
            return None;
        };

        if n < 0 {
            self.fail(field, "Ensure this value is greater than or equal to 0.");
            None
        } else if n > i64::from(max) {
            self.fail(
                field,
                format!("Ensure this value is less than or equal to {}.", max),
            );
            None
        } else {
            u32::try_from(n).ok()
        }
    }

    pub fn flag(&mut self, field: &str) -> Option<bool> {
        let value = self.present(field, false)?;
        let flag = boolean(value);
        if flag.is_none() {
            self.fail(field, "Must be a valid boolean.");
        }
        flag
    }

    /// A required reference to another record, checked with `exists`
    pub fn related<E>(
        &mut self,
        field: &str,
        exists: impl FnOnce(Id) -> Result<bool, E>,
    ) -> Result<Option<Id>, E> {
        let Some(value) = self.present(field, true) else {
            return Ok(None);
        };
        let pk = match value {
            Value::Number(_) | Value::String(_) => integer(value),
            _ => None,
        };
        let Some(pk) = pk else {
            self.fail(
                field,
                format!(
                    "Incorrect type. Expected pk value, received {}.",
                    type_name(value)
                ),
            );
            return Ok(None);
        };

        if pk > 0 && exists(Id::new(pk))? {
            Ok(Some(Id::new(pk)))
        } else {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.fail(
                field,
                format!("Invalid pk \"{}\" - object does not exist.", raw),
            );
            Ok(None)
        }
    }
}

/// Integers, integral floats and integer strings such as `" 3 "` or `"3.00"`
///
/// Values outside the `i64` range saturate so range checks still report them
/// as too large or too small.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            let s = match s.find('.') {
                Some(dot) if s[dot + 1..].chars().all(|c| c == '0') => &s[..dot],
                _ => s,
            };
            let digits = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some(s.parse().unwrap_or(if s.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }))
        }
        _ => None,
    }
}

fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(true),
            Some(f) if f == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "t" | "y" | "yes" | "true" | "on" | "1" => Some(true),
            "f" | "n" | "no" | "false" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
