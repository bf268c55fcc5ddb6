use crate::error::{InvalidPincodeSnafu, ValidationError};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use std::str::FromStr;

pub const PINCODE_LENGTH: usize = 6;

/// A pincode that passed validation. Kept as the exact string the user typed
/// so leading zeros survive into the request URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LookupQuery(String);

impl LookupQuery {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        ensure!(
            raw.chars().count() == PINCODE_LENGTH,
            InvalidPincodeSnafu { input: raw }
        );
        ensure!(
            raw.chars().all(|c| c.is_ascii_digit()),
            InvalidPincodeSnafu { input: raw }
        );
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LookupQuery {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LookupQuery {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LookupQuery> for String {
    fn from(query: LookupQuery) -> Self {
        query.0
    }
}

impl AsRef<str> for LookupQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
