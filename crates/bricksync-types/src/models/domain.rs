//! The collections the engine knows how to mirror.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Owned sets mirrored into a remote set list.
    Sets,
    /// Missing parts mirrored into the remote lost-parts collection.
    MissingParts,
    /// Missing parts mirrored into a named remote part list.
    MissingPartList,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Sets, Domain::MissingParts, Domain::MissingPartList];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sets => "sets",
            Self::MissingParts => "missing-parts",
            Self::MissingPartList => "part-list",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sets" => Ok(Self::Sets),
            "missing-parts" | "lost-parts" => Ok(Self::MissingParts),
            "part-list" | "missing-part-list" => Ok(Self::MissingPartList),
            other => Err(format!("unknown domain '{other}'")),
        }
    }
}
