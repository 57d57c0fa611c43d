use serde::{Deserialize, Deserializer, Serialize, de::Error};
use smol_str::SmolStr;
use std::fmt;
use std::{ops::Deref, str::FromStr};

/// Game account identifier, the unit of a like request.
///
/// Surrounding whitespace is stripped on construction and the remainder
/// must be non-empty. No further format is imposed; the backend decides
/// what a valid account is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Uid(SmolStr);

/// Error returned for blank UIDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("UID must not be empty")]
#[diagnostic(code(likeboost::uid::empty), help("enter the numeric game account id"))]
pub struct EmptyUid;

impl Uid {
    /// Fallible constructor, trims and validates
    pub fn new(uid: &str) -> Result<Self, EmptyUid> {
        let uid = uid.trim();
        if uid.is_empty() {
            Err(EmptyUid)
        } else {
            Ok(Self(SmolStr::new(uid)))
        }
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Uid {
    type Err = EmptyUid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: SmolStr = Deserialize::deserialize(deserializer)?;
        Self::new(&value).map_err(D::Error::custom)
    }
}

impl Deref for Uid {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uid> for SmolStr {
    fn from(value: Uid) -> Self {
        value.0
    }
}
