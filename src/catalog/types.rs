//! Collaborator row types: catalog items and client purchase history.
//!
//! Both are owned externally and read-only inside the engine; snapshots
//! arrive as plain rows (JSON or pre-built structs) and are refreshed by
//! the calling layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single catalog row from the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable canonical id a free-text line resolves to.
    pub item_code: String,
    /// Local-language (Korean) display name.
    pub name_local: String,
    /// Foreign-language display name.
    #[serde(default)]
    pub name_foreign: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub varietals: Vec<String>,
    /// Vintage year if the catalog carries it separately from the name.
    #[serde(default)]
    pub vintage: Option<u16>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Product line selecting an alternate catalog for fallback search.
    #[serde(default)]
    pub product_line: Option<String>,
}

fn default_available() -> bool {
    true
}

/// One (client, item) purchase-history row from the history collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientItemHistory {
    pub item_code: String,
    /// Display name the client's orders used for this item.
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub purchase_count: u32,
    #[serde(default)]
    pub last_purchase_date: Option<NaiveDate>,
}
