//! Rebrickable v3 payload shapes, limited to the fields the engine reads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

/// A user set list or part list.
#[derive(Debug, Deserialize)]
pub struct NamedList {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Created {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct PartRef {
    pub part_num: String,
}

#[derive(Debug, Deserialize)]
pub struct ColorRef {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetRef {
    pub set_num: String,
}

#[derive(Debug, Deserialize)]
pub struct SetListEntry {
    pub set: SetRef,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct PartListEntry {
    pub part: PartRef,
    pub color: ColorRef,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct InventoryPart {
    pub part: PartRef,
    pub color: ColorRef,
}

#[derive(Debug, Deserialize)]
pub struct LostPartEntry {
    pub lost_part_id: u64,
    pub lost_quantity: u32,
    pub inv_part: InventoryPart,
}

/// One row of a set's inventory.
#[derive(Debug, Deserialize)]
pub struct SetInventoryEntry {
    pub id: u64,
    pub part: PartRef,
    pub color: ColorRef,
}

#[derive(Debug, Serialize)]
pub struct SetWrite<'a> {
    pub set_num: &'a str,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct PartWrite<'a> {
    pub part_num: &'a str,
    pub color_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct LostPartWrite {
    pub inv_part_id: serde_json::Value,
    pub lost_quantity: u32,
}
