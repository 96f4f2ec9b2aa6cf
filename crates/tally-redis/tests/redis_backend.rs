//! Integration tests against a live Redis.
//!
//! All tests here are `#[ignore]`d: they require a local server at
//! `redis://127.0.0.1/`. Run them with:
//!
//! ```text
//! cargo test -p tally-redis -- --ignored
//! ```
//!
//! Cart ids are UUID-suffixed so concurrent test runs never collide, and
//! every test cleans up its own keys.

use std::sync::Arc;
use std::time::Duration;

use tally_core::{Cart, CartStore, PriceCatalog, StaticCatalog};
use tally_redis::{CartBackend, CartFactory, RedisCartStore, RedisCatalog};
use uuid::Uuid;

const REDIS_URL: &str = "redis://127.0.0.1/";

fn client() -> redis::Client {
    init_tracing();
    redis::Client::open(REDIS_URL).expect("valid redis url")
}

/// Readable log output while debugging against a live server;
/// `RUST_LOG=debug` shows every storage command.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn unique_id(label: &str) -> String {
    format!("{label}-{}", Uuid::new_v4())
}

fn demo_catalog() -> Arc<dyn PriceCatalog> {
    Arc::new(StaticCatalog::with_defaults())
}

#[test]
#[ignore = "requires a local redis"]
fn same_cart_id_shares_state_across_instances() {
    let client = client();
    let cart_id = unique_id("shared");

    let mut a = Cart::new(
        cart_id.as_str(),
        Box::new(RedisCartStore::connect(&client, &cart_id).unwrap()),
        demo_catalog(),
    );
    a.add_item("apple", 2).unwrap();

    // A second instance constructed afterward sees A's write
    let mut b = Cart::new(
        cart_id.as_str(),
        Box::new(RedisCartStore::connect(&client, &cart_id).unwrap()),
        demo_catalog(),
    );
    let items = b.items().unwrap();
    assert_eq!(items.get("apple"), Some(&2));

    // And B's write is visible back in A
    b.add_item("milk", 1).unwrap();
    assert_eq!(a.items().unwrap().len(), 2);

    // Cleanup: emptying the cart deletes the record
    a.remove_item("apple").unwrap();
    a.remove_item("milk").unwrap();
    let mut store = RedisCartStore::connect(&client, &cart_id).unwrap();
    assert!(store.get().unwrap().is_empty());
}

#[test]
#[ignore = "requires a local redis"]
fn different_cart_ids_are_isolated() {
    let client = client();
    let id_a = unique_id("iso-a");
    let id_b = unique_id("iso-b");

    let mut a = Cart::new(
        id_a.as_str(),
        Box::new(RedisCartStore::connect(&client, &id_a).unwrap()),
        demo_catalog(),
    );
    let mut b = Cart::new(
        id_b.as_str(),
        Box::new(RedisCartStore::connect(&client, &id_b).unwrap()),
        demo_catalog(),
    );

    a.add_item("bread", 3).unwrap();
    assert!(b.items().unwrap().is_empty());

    a.remove_item("bread").unwrap();
}

#[test]
#[ignore = "requires a local redis"]
fn empty_cart_leaves_no_record_behind() {
    let client = client();
    let cart_id = unique_id("residue");

    let mut store = RedisCartStore::connect(&client, &cart_id).unwrap();

    let mut items = tally_core::CartItems::new();
    items.insert("apple".to_string(), 1);
    store.set(&items).unwrap();

    // Writing the now-empty map must DEL the key, not store "{}"
    items.clear();
    store.set(&items).unwrap();

    let mut conn = client.get_connection().unwrap();
    let exists: bool = redis::cmd("EXISTS")
        .arg(format!("cart:{cart_id}"))
        .query(&mut conn)
        .unwrap();
    assert!(!exists);
}

#[test]
#[ignore = "requires a local redis"]
fn ttl_is_armed_and_queryable() {
    let client = client();
    let cart_id = unique_id("ttl");

    let mut store = RedisCartStore::connect(&client, &cart_id)
        .unwrap()
        .with_ttl(Duration::from_secs(120));

    // No record yet: nothing to expire
    assert_eq!(store.ttl().unwrap(), None);

    let mut items = tally_core::CartItems::new();
    items.insert("milk".to_string(), 1);
    store.set(&items).unwrap();

    let remaining = store.ttl().unwrap().expect("ttl armed by write");
    assert!(remaining <= Duration::from_secs(120));
    assert!(remaining > Duration::from_secs(60));

    // Re-arming with a new duration takes effect
    assert!(store.expire(Duration::from_secs(30)).unwrap());
    assert!(store.ttl().unwrap().unwrap() <= Duration::from_secs(30));

    store.delete().unwrap();
}

#[test]
#[ignore = "requires a local redis"]
fn catalog_bootstrap_and_cart_flow() {
    let client = client();
    // Unique prefix keeps this test's records away from everyone else's
    let prefix = unique_id("cat");

    let catalog = Arc::new(RedisCatalog::connect_with_prefix(&client, &prefix).unwrap());
    catalog.initialize_defaults().unwrap();

    assert!(catalog.exists("Apple").unwrap());
    assert_eq!(catalog.price(" BREAD ").unwrap().cents(), 250);
    assert_eq!(catalog.all().unwrap().len(), 4);

    // Management operations
    catalog
        .add_or_update("cheese", tally_core::Money::from_cents(475), Some("Cheese"), None)
        .unwrap();
    assert_eq!(catalog.all().unwrap().len(), 5);
    assert!(catalog.remove("cheese").unwrap());
    assert!(!catalog.remove("cheese").unwrap());

    // A cart priced by the remote catalog
    let cart_id = unique_id("flow");
    let mut cart = Cart::new(
        cart_id.as_str(),
        Box::new(RedisCartStore::connect(&client, &cart_id).unwrap()),
        catalog.clone() as Arc<dyn PriceCatalog>,
    );
    cart.add_item("apple", 5).unwrap();
    cart.add_item("banana", 3).unwrap();
    cart.add_item("bread", 2).unwrap();
    cart.add_item("milk", 1).unwrap();
    assert_eq!(cart.total().unwrap().cents(), 1165);

    for id in ["apple", "banana", "bread", "milk"] {
        cart.remove_item(id).unwrap();
    }
    assert_eq!(catalog.clear().unwrap(), 4);
}

#[test]
#[ignore = "requires a local redis"]
fn factory_auto_picks_redis_when_reachable() {
    let factory = CartFactory::with_redis(REDIS_URL, demo_catalog(), CartBackend::Auto).unwrap();
    assert!(factory.redis_available());

    let cart_id = unique_id("factory");
    let mut a = factory.create_cart(cart_id.as_str());
    a.add_item("apple", 4).unwrap();

    // Redis backing is observable: a fresh cart with the same id sees it
    let mut b = factory.create_cart(cart_id.as_str());
    assert_eq!(b.items().unwrap().get("apple"), Some(&4));

    a.remove_item("apple").unwrap();
}
