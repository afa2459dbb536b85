//! Natural keys identifying an item in a collection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bound shared by every natural key a remote list can be keyed on.
///
/// `Ord` gives diff partitions a stable order; `Display` is what ends up in
/// logs and error strings.
pub trait ListKey:
    Ord + Clone + fmt::Debug + fmt::Display + Send + Sync + 'static
{
}

impl<T> ListKey for T where T: Ord + Clone + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// Set number as used by the remote catalogue, e.g. `10270-1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetNum(pub String);

impl SetNum {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A part in a specific color.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartColor {
    pub part_num: String,
    pub color_id: i64,
}

impl PartColor {
    pub fn new(part_num: impl Into<String>, color_id: i64) -> Self {
        Self { part_num: part_num.into(), color_id }
    }
}

impl fmt::Display for PartColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (color {})", self.part_num, self.color_id)
    }
}

/// Identifier of a remote list. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub String);

impl ListId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
