//! Wallet of collected coins.
//!
//! At most one entry per coin id. Mutations update memory first and then
//! write the whole list through once; a failed write only costs persistence
//! across restarts.

use log::{debug, info};

use crate::model::{CoinSide, WalletEntry};
use crate::state::storage::{KeyValueStore, read_json, remove_key, write_json};

pub const WALLET_KEY: &str = "wallet.coins";

/// Grid used to place new coins so they do not land on each other.
const SLOT_SPACING: f64 = 110.0;
const SLOT_ORIGIN: f64 = 24.0;
const SLOTS_PER_ROW: usize = 3;

pub struct WalletStore {
    store: Box<dyn KeyValueStore>,
    entries: Vec<WalletEntry>,
}

impl WalletStore {
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let mut entries: Vec<WalletEntry> = read_json(store.as_ref(), WALLET_KEY).unwrap_or_default();
        // Drop duplicates an older build may have written.
        let mut seen = std::collections::HashSet::new();
        entries.retain(|e| seen.insert(e.id.clone()));
        debug!("wallet loaded with {} coins", entries.len());
        Self { store, entries }
    }

    pub fn list(&self) -> &[WalletEntry] {
        &self.entries
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&WalletEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Returns `true` when the coin was new; an owned coin is left untouched.
    pub fn add(&mut self, id: &str, side: CoinSide) -> bool {
        if self.contains(id) {
            return false;
        }
        let slot = self.entries.len();
        let (x, y) = slot_position(slot);
        self.entries.push(WalletEntry {
            id: id.to_string(),
            side,
            x,
            y,
        });
        info!("coin {id} collected on {}", side.label());
        self.persist();
        true
    }

    /// Returns `false` when `id` is not owned.
    pub fn update_position(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        entry.x = x;
        entry.y = y;
        self.persist();
        true
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn clear(&mut self) {
        self.entries.clear();
        remove_key(self.store.as_ref(), WALLET_KEY);
    }

    fn persist(&self) {
        write_json(self.store.as_ref(), WALLET_KEY, &self.entries);
    }
}

fn slot_position(slot: usize) -> (f64, f64) {
    let col = (slot % SLOTS_PER_ROW) as f64;
    let row = (slot / SLOTS_PER_ROW) as f64;
    (
        SLOT_ORIGIN + col * SLOT_SPACING,
        SLOT_ORIGIN + row * SLOT_SPACING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::MemoryStore;
    use proptest::prelude::*;
    use std::rc::Rc;

    fn wallet() -> (WalletStore, Rc<MemoryStore>) {
        let backing = Rc::new(MemoryStore::new());
        (WalletStore::load(Box::new(backing.clone())), backing)
    }

    #[test]
    fn second_add_keeps_the_first_entry() {
        let (mut w, _) = wallet();
        assert!(w.add("1201021", CoinSide::Heads));
        assert!(!w.add("1201021", CoinSide::Tails));
        assert_eq!(w.list().len(), 1);
        assert_eq!(w.list()[0].side, CoinSide::Heads);
    }

    #[test]
    fn entries_survive_a_reload() {
        let (mut w, backing) = wallet();
        w.add("a", CoinSide::Tails);
        w.update_position("a", 40.0, 70.0);
        let reloaded = WalletStore::load(Box::new(backing));
        assert_eq!(
            reloaded.list(),
            &[WalletEntry {
                id: "a".into(),
                side: CoinSide::Tails,
                x: 40.0,
                y: 70.0
            }]
        );
    }

    #[test]
    fn moving_an_unknown_coin_is_a_no_op() {
        let (mut w, backing) = wallet();
        assert!(!w.update_position("ghost", 1.0, 1.0));
        assert!(w.list().is_empty());
        assert_eq!(backing.get(WALLET_KEY).unwrap(), None);
    }

    #[test]
    fn new_coins_get_distinct_slots() {
        let (mut w, _) = wallet();
        for id in ["a", "b", "c", "d"] {
            w.add(id, CoinSide::Heads);
        }
        let d = w.get("d").unwrap();
        assert_eq!((d.x, d.y), (SLOT_ORIGIN, SLOT_ORIGIN + SLOT_SPACING));
        assert_ne!(w.get("a").unwrap().x, w.get("b").unwrap().x);
    }

    #[test]
    fn clear_empties_memory_and_storage() {
        let (mut w, backing) = wallet();
        w.add("a", CoinSide::Heads);
        w.clear();
        assert!(w.list().is_empty());
        assert_eq!(backing.get(WALLET_KEY).unwrap(), None);
    }

    #[test]
    fn failed_writes_keep_memory_state() {
        let mut w = WalletStore::load(Box::new(MemoryStore::failing_writes()));
        assert!(w.add("a", CoinSide::Heads));
        assert!(w.contains("a"));
    }

    #[test]
    fn duplicate_rows_on_disk_are_collapsed() {
        let raw = r#"[{"id":"a","side":"HEADS","x":0.0,"y":0.0},{"id":"a","side":"TAILS","x":5.0,"y":5.0}]"#;
        let w = WalletStore::load(Box::new(MemoryStore::new().with_item(WALLET_KEY, raw)));
        assert_eq!(w.list().len(), 1);
        assert_eq!(w.list()[0].side, CoinSide::Heads);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
        #[test]
        fn one_entry_per_id(adds in prop::collection::vec((0u8..5, any::<bool>()), 0..30)) {
            let (mut w, _) = wallet();
            for (id, heads) in &adds {
                let side = if *heads { CoinSide::Heads } else { CoinSide::Tails };
                w.add(&id.to_string(), side);
            }
            let mut ids: Vec<&str> = w.list().iter().map(|e| e.id.as_str()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
            for e in w.list() {
                let (_, first_heads) = adds.iter().find(|(id, _)| id.to_string() == e.id).unwrap();
                let expected = if *first_heads { CoinSide::Heads } else { CoinSide::Tails };
                prop_assert_eq!(e.side, expected);
            }
        }
    }
}
