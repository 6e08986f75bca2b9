use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use travelease_core::SnapshotRepository;
use travelease_shared::{BookableItem, LineItem, LineKey};
use travelease_store::{load_snapshot, SnapshotWriter, StoreError};

/// The cart: at most one line per (entity id, item type), each with a
/// quantity of at least 1.
///
/// Mutations apply to memory immediately and queue a snapshot of the whole
/// cart for the background writer. A failed write is logged and never undoes
/// the mutation.
pub struct CartStore {
    repo: Arc<dyn SnapshotRepository>,
    writer: SnapshotWriter,
    lines: Vec<LineItem>,
    initialized: bool,
    mutated: bool,
}

impl CartStore {
    /// Must be called from within a tokio runtime.
    pub fn new(repo: Arc<dyn SnapshotRepository>, key: impl Into<String>) -> Self {
        let writer = SnapshotWriter::spawn(repo.clone(), key);
        Self {
            repo,
            writer,
            lines: Vec::new(),
            initialized: false,
            mutated: false,
        }
    }

    /// Restore the persisted lines. Runs once; missing or malformed data
    /// gives an empty cart.
    pub async fn initialize(&mut self) {
        if self.initialized {
            debug!("Cart store already initialized");
            return;
        }
        self.initialized = true;

        if self.mutated {
            warn!("Cart changed before it was restored; keeping the in-memory lines");
            return;
        }

        match load_snapshot::<Vec<LineItem>>(self.repo.as_ref(), self.writer.key()).await {
            Ok(Some(lines)) => {
                self.lines = restore_invariants(lines);
                info!("Restored cart with {} line(s)", self.lines.len());
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring stored cart: {}", e),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Add one unit. An existing line keeps its price and details; only its
    /// quantity grows.
    pub fn add_item(&mut self, item: BookableItem) {
        let key = item.key();
        match self.lines.iter_mut().find(|line| line.matches(&key)) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                debug!("Cart line {} now x{}", key, line.quantity);
            }
            None => {
                debug!("Cart line {} added", key);
                self.lines.push(LineItem::first(item));
            }
        }
        self.persist();
    }

    /// No-op when the line is absent.
    pub fn remove_item(&mut self, key: &LineKey) {
        self.lines.retain(|line| !line.matches(key));
        self.persist();
    }

    /// `quantity <= 0` removes the line. No-op when the line is absent.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(key);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(key)) {
            line.quantity = quantity;
        }
        self.persist();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Sum of `price * quantity` over all lines, saturating at `u64::MAX`
    pub fn total_price(&self) -> u64 {
        self.lines.iter().map(LineItem::line_total).fold(0, u64::saturating_add)
    }

    /// Sum of quantities over all lines
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn contains(&self, key: &LineKey) -> bool {
        self.line(key).is_some()
    }

    pub fn quantity_of(&self, key: &LineKey) -> Option<u32> {
        self.line(key).map(|line| line.quantity)
    }

    pub fn line(&self, key: &LineKey) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.matches(key))
    }

    /// Lines in insertion order
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Wait for the latest snapshot to be written.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.writer.flush().await
    }

    pub async fn teardown(self) {
        if let Err(e) = self.writer.shutdown().await {
            warn!("Cart store closed with unsaved state: {}", e);
        }
    }

    fn persist(&mut self) {
        self.mutated = true;
        if let Err(e) = self.writer.save(&self.lines) {
            warn!("Cart snapshot not queued: {}", e);
        }
    }
}

/// Stored data may predate the invariants: drop empty lines and keep the
/// first line of any repeated key.
fn restore_invariants(lines: Vec<LineItem>) -> Vec<LineItem> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| {
            if line.quantity == 0 {
                warn!("Dropping stored cart line {} with zero quantity", line.key());
                return false;
            }
            if !seen.insert(line.key()) {
                warn!("Dropping duplicate stored cart line {}", line.key());
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use travelease_shared::{EntityId, ItemType};
    use travelease_store::MemorySnapshotRepository;

    const KEY: &str = "travelease_cart";

    struct ReadOnlyRepository;

    #[async_trait]
    impl SnapshotRepository for ReadOnlyRepository {
        async fn load(
            &self,
            _key: &str,
        ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(None)
        }

        async fn save(
            &self,
            _key: &str,
            _payload: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("read-only filesystem".into())
        }

        async fn remove(
            &self,
            _key: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("read-only filesystem".into())
        }
    }

    async fn empty_cart() -> (Arc<MemorySnapshotRepository>, CartStore) {
        let repo = Arc::new(MemorySnapshotRepository::new());
        let mut cart = CartStore::new(repo.clone(), KEY);
        cart.initialize().await;
        (repo, cart)
    }

    fn flight(id: i64, price: u64) -> BookableItem {
        BookableItem::new(id, ItemType::Flight, price)
    }

    fn hotel(id: i64, price: u64) -> BookableItem {
        BookableItem::new(id, ItemType::Hotel, price)
    }

    fn assert_totals_consistent(cart: &CartStore) {
        let expected: u64 = cart.lines().iter().map(|l| l.price * u64::from(l.quantity)).sum();
        assert_eq!(cart.total_price(), expected);
        let count: u64 = cart.lines().iter().map(|l| u64::from(l.quantity)).sum();
        assert_eq!(cart.total_item_count(), count);
    }

    #[tokio::test]
    async fn test_first_write_wins_on_merge() {
        let (_repo, mut cart) = empty_cart().await;

        cart.add_item(flight(1, 8999).with_detail("airline", "IndiGo"));
        cart.add_item(flight(1, 5000).with_detail("airline", "SpiceJet"));

        assert_eq!(cart.lines().len(), 1);
        let line = cart.line(&LineKey::flight(1)).unwrap();
        assert_eq!(line.price, 8999);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.detail_str("airline"), Some("IndiGo"));
        assert_eq!(cart.total_price(), 17998);
    }

    #[tokio::test]
    async fn test_quantity_counts_repeated_adds() {
        let (_repo, mut cart) = empty_cart().await;
        for n in 1..=5 {
            cart.add_item(hotel(7, 1000 + n));
            assert_eq!(cart.quantity_of(&LineKey::hotel(7)), Some(n as u32));
            assert_totals_consistent(&cart);
        }
        assert_eq!(cart.line(&LineKey::hotel(7)).unwrap().price, 1001);
    }

    #[tokio::test]
    async fn test_same_id_different_type_stay_separate() {
        let (_repo, mut cart) = empty_cart().await;
        cart.add_item(hotel(1, 1000));
        cart.add_item(hotel(1, 1000));
        cart.add_item(flight(1, 500));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.total_price(), 2500);
        assert_eq!(cart.quantity_of(&LineKey::hotel(1)), Some(2));
        assert_eq!(cart.quantity_of(&LineKey::flight(1)), Some(1));
    }

    #[tokio::test]
    async fn test_add_then_remove_empties_cart() {
        let (_repo, mut cart) = empty_cart().await;
        cart.add_item(flight(3, 100));
        cart.add_item(flight(3, 100));
        cart.add_item(flight(3, 100));
        cart.remove_item(&LineKey::flight(3));

        assert!(cart.is_empty());
        assert!(!cart.contains(&LineKey::flight(3)));
        assert_eq!(cart.total_price(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_equals_remove() {
        let (_repo, mut removed) = empty_cart().await;
        let (_repo2, mut zeroed) = empty_cart().await;
        for cart in [&mut removed, &mut zeroed] {
            cart.add_item(flight(1, 100));
            cart.add_item(hotel(2, 200));
        }

        removed.remove_item(&LineKey::flight(1));
        zeroed.set_quantity(&LineKey::flight(1), 0);
        assert_eq!(removed.lines(), zeroed.lines());

        zeroed.set_quantity(&LineKey::hotel(2), -3);
        assert!(zeroed.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_keys_are_no_ops() {
        let (_repo, mut cart) = empty_cart().await;
        cart.add_item(flight(1, 100));

        cart.remove_item(&LineKey::hotel(1));
        cart.set_quantity(&LineKey::flight(2), 4);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(&LineKey::flight(1)), Some(1));
        assert_eq!(cart.quantity_of(&LineKey::flight(2)), None);
    }

    #[tokio::test]
    async fn test_set_quantity_updates_totals() {
        let (_repo, mut cart) = empty_cart().await;
        cart.add_item(hotel(4, 15999));
        cart.set_quantity(&LineKey::hotel(4), 3);

        assert_eq!(cart.quantity_of(&LineKey::hotel(4)), Some(3));
        assert_eq!(cart.total_price(), 47997);
        assert_totals_consistent(&cart);

        cart.clear();
        assert!(cart.is_empty());
        assert_totals_consistent(&cart);
    }

    #[tokio::test]
    async fn test_snapshot_wire_format() {
        let (repo, mut cart) = empty_cart().await;
        cart.add_item(flight(1, 8999).with_detail("from", "DEL"));
        cart.add_item(flight(1, 8999));
        cart.flush().await.unwrap();

        let stored: serde_json::Value = serde_json::from_str(&repo.get(KEY).await.unwrap()).unwrap();
        assert_eq!(
            stored,
            json!([{"id": 1, "type": "flight", "price": 8999, "quantity": 2, "from": "DEL"}])
        );
    }

    #[tokio::test]
    async fn test_lines_survive_restart() {
        let (repo, mut cart) = empty_cart().await;
        cart.add_item(
            BookableItem::new("taj-mumbai", ItemType::Hotel, 24999)
                .with_detail("roomType", "deluxe")
                .with_detail("guests", 2)
                .with_detail("nights", 3),
        );
        cart.add_item(flight(1, 8999).with_detail("class", "economy"));
        cart.set_quantity(&LineKey::flight(1), 2);
        let before = cart.lines().to_vec();
        cart.teardown().await;

        let mut restarted = CartStore::new(repo, KEY);
        restarted.initialize().await;
        assert_eq!(restarted.lines(), before.as_slice());
        assert_eq!(
            restarted.line(&LineKey::new(EntityId::from("taj-mumbai"), ItemType::Hotel)).unwrap().detail("guests"),
            Some(&json!(2))
        );
    }

    #[tokio::test]
    async fn test_catalog_quantity_does_not_corrupt_snapshot() {
        let (repo, mut cart) = empty_cart().await;
        let hotel: BookableItem = serde_json::from_value(json!({
            "id": 1,
            "type": "hotel",
            "price": 100,
            "quantity": 3,
            "name": "Taj"
        }))
        .unwrap();
        cart.add_item(hotel);
        cart.add_item(flight(2, 500));
        let before = cart.lines().to_vec();
        cart.teardown().await;

        let mut restarted = CartStore::new(repo, KEY);
        restarted.initialize().await;
        assert_eq!(restarted.lines(), before.as_slice());
        assert_eq!(restarted.quantity_of(&LineKey::hotel(1)), Some(1));
        assert_eq!(restarted.line(&LineKey::hotel(1)).unwrap().detail_str("name"), Some("Taj"));
    }

    #[tokio::test]
    async fn test_huge_prices_saturate_totals() {
        let (_repo, mut cart) = empty_cart().await;
        cart.add_item(flight(1, u64::MAX / 2 + 1));
        cart.add_item(flight(2, u64::MAX / 2 + 1));

        assert_eq!(cart.total_price(), u64::MAX);
        assert_eq!(cart.total_item_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_snapshot_starts_empty() {
        let repo = Arc::new(MemorySnapshotRepository::with_entry(KEY, r#"{"not":"a list"}"#));
        let mut cart = CartStore::new(repo, KEY);
        cart.initialize().await;
        assert!(cart.is_empty());
        assert!(cart.is_initialized());
    }

    #[tokio::test]
    async fn test_restore_drops_invalid_lines() {
        let stored = json!([
            {"id": 1, "type": "flight", "price": 100, "quantity": 2},
            {"id": 2, "type": "hotel", "price": 300, "quantity": 0},
            {"id": 1, "type": "flight", "price": 999, "quantity": 5}
        ]);
        let repo = Arc::new(MemorySnapshotRepository::with_entry(KEY, &stored.to_string()));
        let mut cart = CartStore::new(repo, KEY);
        cart.initialize().await;

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_price(), 200);
    }

    #[tokio::test]
    async fn test_failed_writes_keep_memory_state() {
        let mut cart = CartStore::new(Arc::new(ReadOnlyRepository), KEY);
        cart.initialize().await;
        cart.add_item(flight(1, 100));

        assert!(cart.flush().await.is_err());
        assert_eq!(cart.quantity_of(&LineKey::flight(1)), Some(1));
        assert_eq!(cart.total_price(), 100);
    }

    #[tokio::test]
    async fn test_initialize_keeps_earlier_mutations() {
        let repo = Arc::new(MemorySnapshotRepository::with_entry(
            KEY,
            r#"[{"id":9,"type":"hotel","price":1,"quantity":1}]"#,
        ));
        let mut cart = CartStore::new(repo, KEY);
        cart.add_item(flight(1, 100));
        cart.initialize().await;

        assert!(cart.contains(&LineKey::flight(1)));
        assert!(!cart.contains(&LineKey::hotel(9)));
    }
}
