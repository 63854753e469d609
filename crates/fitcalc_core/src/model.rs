use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Section name -> items, in the order the server listed them.
pub type SectionMap = IndexMap<String, Vec<Item>>;

/// Location key -> suggested purchases, in the order the server listed them.
pub type BuyLists = IndexMap<String, Vec<BuyEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub qty: u64,
    pub volume: f64,
    pub subtotal_jita: f64,
    pub subtotal_gsf: f64,
    pub import_cost: f64,
    pub purchase_loc: String,
    pub marked_up_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub volume: f64,
    pub subtotal_jita: f64,
    pub subtotal_gsf: f64,
    pub min_price: f64,
    pub markup_pct: f64,
    pub marked_up_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyEntry {
    pub name: String,
    pub qty: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub current: u64,
    pub total: u64,
    pub item: String,
}

/// Final payload of a computation. `buy_lists` is missing from older servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonePayload {
    pub parsed: SectionMap,
    pub totals: Totals,
    #[serde(default)]
    pub buy_lists: Option<BuyLists>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub message: String,
}
