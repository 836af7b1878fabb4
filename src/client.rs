use serde::{Deserialize, Serialize};

pub const UNKNOWN_CLIENT: &str = "Unknown Client";
pub const UNKNOWN_AGENT: &str = "Unknown Agent";

/// A shop, keyed in the store by its shop id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub shop_id: String,
    pub name: String,
    pub agent: String,
}

impl Client {
    pub fn new(shop_id: &str, name: &str, agent: &str) -> Self {
        Self {
            shop_id: shop_id.to_string(),
            name: name.to_string(),
            agent: agent.to_string(),
        }
    }

    /// Stand-in for a shop id with no matching client.
    pub fn placeholder(shop_id: &str) -> Self {
        Self::new(shop_id, UNKNOWN_CLIENT, UNKNOWN_AGENT)
    }
}
