use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Coin — One entry of the coin list endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(rename = "type", default)]
    pub type_field: Option<String>,
}

impl Coin {
    /// Route path of this coin's detail page.
    pub fn path(&self) -> String {
        format!("/{}", urlencoding::encode(&self.id))
    }
}
