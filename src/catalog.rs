// Compiled-in coin records.

use crate::model::Coin;

pub const FEATURED_COIN_ID: &str = "1201021";

#[derive(Clone, Debug, PartialEq)]
pub struct CoinCatalog {
    coins: Vec<Coin>,
}

impl Default for CoinCatalog {
    fn default() -> Self {
        Self {
            coins: vec![Coin {
                id: FEATURED_COIN_ID.to_string(),
                title: "tukat".to_string(),
                date: Some("1990 - 2000".to_string()),
                description: None,
                diameter: None,
                weight: None,
                material: None,
                head_description: None,
                tails_description: None,
                head_image: "assets/images/demo/museaal-1201021-head.webp",
                tails_image: "assets/images/demo/museaal-1201021-tails.webp",
            }],
        }
    }
}

impl CoinCatalog {
    /// The coin a fresh flip screen shows.
    pub fn featured(&self) -> &Coin {
        self.find(FEATURED_COIN_ID).unwrap_or(&self.coins[0])
    }

    pub fn find(&self, id: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| c.id == id)
    }

    /// Resolves a wallet coin id, falling back to the featured coin.
    pub fn resolve(&self, id: Option<&str>) -> &Coin {
        id.and_then(|id| self.find(id))
            .unwrap_or_else(|| self.featured())
    }
}
