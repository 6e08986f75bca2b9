use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use travelease_cart::CartStore;
use travelease_checkout::{CheckoutError, CheckoutService, PaymentDetails, SimulatedPaymentGateway};
use travelease_core::{MockIdentityProvider, SnapshotRepository};
use travelease_session::SessionStore;
use travelease_shared::{BookableItem, LineKey, Masked};
use travelease_store::MemorySnapshotRepository;

const SESSION_KEY: &str = "travelease_user";
const CART_KEY: &str = "travelease_cart";

async fn open(repo: &Arc<MemorySnapshotRepository>) -> (SessionStore, CartStore) {
    let shared: Arc<dyn SnapshotRepository> = repo.clone();
    let mut session = SessionStore::new(shared.clone(), Arc::new(MockIdentityProvider), SESSION_KEY);
    let mut cart = CartStore::new(shared, CART_KEY);
    session.initialize().await;
    cart.initialize().await;
    (session, cart)
}

fn card() -> PaymentDetails {
    PaymentDetails {
        cardholder_name: "Asha Rao".to_string(),
        card_number: Masked::from("4111111111111111"),
        expiry_date: "0828".to_string(),
        cvv: Masked::from("321"),
    }
}

fn catalog_flight() -> BookableItem {
    BookableItem::from_json(json!({
        "id": 1,
        "type": "flight",
        "airline": "IndiGo",
        "from": "DEL",
        "to": "BOM",
        "departTime": "06:00",
        "class": "economy",
        "price": 8999
    }))
    .unwrap()
}

fn catalog_hotel() -> BookableItem {
    BookableItem::from_json(json!({
        "id": 1,
        "type": "hotel",
        "name": "The Grand Palace",
        "location": "Mumbai",
        "roomType": "deluxe",
        "checkIn": "2024-12-20",
        "checkOut": "2024-12-23",
        "guests": 2,
        "nights": 3,
        "price": 15999
    }))
    .unwrap()
}

#[tokio::test]
async fn test_booking_flow_survives_restarts() {
    let repo = Arc::new(MemorySnapshotRepository::new());

    // First run: browse while signed out, then sign in
    let (mut session, mut cart) = open(&repo).await;
    cart.add_item(catalog_flight());
    cart.add_item(catalog_hotel());
    cart.add_item(catalog_flight());
    session.sign_in("a@b.com", "secret").await.unwrap();
    session.teardown().await;
    cart.teardown().await;

    // Second run: everything is restored
    let (session, mut cart) = open(&repo).await;
    assert_eq!(session.current().map(|r| r.name.as_str()), Some("a"));
    assert_eq!(cart.total_item_count(), 3);
    assert_eq!(cart.total_price(), 2 * 8999 + 15999);
    assert_eq!(cart.line(&LineKey::hotel(1)).unwrap().detail_str("roomType"), Some("deluxe"));

    let checkout = CheckoutService::new(
        Arc::new(SimulatedPaymentGateway::new(Duration::ZERO)),
        0.1,
        "INR",
    );
    let summary = checkout.summarize(&cart);
    assert_eq!(summary.subtotal, 33997);
    assert_eq!(summary.taxes_and_fees, 3400);

    let confirmation = checkout.checkout(&session, &mut cart, &card()).await.unwrap();
    assert_eq!(confirmation.summary.total, 37397);
    assert_eq!(confirmation.summary.lines.len(), 2);
    cart.flush().await.unwrap();
    assert_eq!(repo.get(CART_KEY).await.as_deref(), Some("[]"));
    cart.teardown().await;

    // Third run: cart is gone, session is still there
    let (mut session, cart) = open(&repo).await;
    assert!(cart.is_empty());
    assert!(session.is_signed_in());

    session.sign_out().await;
    assert!(repo.get(SESSION_KEY).await.is_none());
}

#[tokio::test]
async fn test_declined_payment_leaves_persisted_cart_alone() {
    let repo = Arc::new(MemorySnapshotRepository::new());
    let (mut session, mut cart) = open(&repo).await;
    session.sign_up("Asha Rao", "asha@example.com", "pw").await.unwrap();
    cart.add_item(catalog_hotel());
    cart.flush().await.unwrap();
    let stored_before = repo.get(CART_KEY).await;

    let checkout = CheckoutService::new(
        Arc::new(SimulatedPaymentGateway::declining(Duration::ZERO)),
        0.1,
        "INR",
    );
    let err = checkout.checkout(&session, &mut cart, &card()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::PaymentDeclined(_)));

    cart.flush().await.unwrap();
    assert_eq!(repo.get(CART_KEY).await, stored_before);
    assert_eq!(cart.quantity_of(&LineKey::hotel(1)), Some(1));
}
