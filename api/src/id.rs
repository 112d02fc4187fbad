use std::{fmt, str::FromStr};

use schemars::JsonSchema;

use serde::{
    de::{self, Unexpected, Visitor},
    Deserialize, Serialize,
};

/// Identifier of a stored record
///
/// Assigned by the store on insert and never reused. Serialized as a plain
/// JSON integer; accepts integers or decimal strings on the way in so the
/// same type works for request bodies, query strings and path segments.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, JsonSchema)]
#[schemars(transparent)]
pub struct Id(i64);

impl Id {
    pub fn new(id: i64) -> Self {
        Id(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("not a valid identifier: {0:?}")]
pub struct ParseIdError(String);

impl FromStr for Id {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Id(id)),
            _ => Err(ParseIdError(s.to_owned())),
        }
    }
}

struct IdVisitor;

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Visitor<'de> for IdVisitor {
    type Value = Id;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a positive integer identifier")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        if v > 0 {
            Ok(Id(v))
        } else {
            Err(de::Error::invalid_value(Unexpected::Signed(v), &self))
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(id) => self.visit_i64(id),
            Err(_) => Err(de::Error::invalid_value(Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
        s.parse()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(s), &self))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(IdVisitor)
    }
}
