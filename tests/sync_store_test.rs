use product_sync::gateway::mock::{
    create_mock_gateway, expect_create, expect_fetch_page, expect_remove, expect_update,
    GatewayRequest, MockGateway, ScriptedGateway,
};
use product_sync::gateway::RequestError;
use product_sync::model::{Product, ProductPatch};
use product_sync::store::{ProductCollectionState, StoreClient, SyncActor};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn widget() -> Product {
    Product::new("p1", "Widget", 9.99, 5, true)
}

fn gadget() -> Product {
    Product::new("p2", "Gadget", 4.5, 0, false)
}

/// Store wired to a mock gateway whose calls the test answers by hand.
fn start_store() -> (MockGateway, mpsc::Receiver<GatewayRequest>, StoreClient) {
    let (gateway, requests) = create_mock_gateway(10);
    let (actor, store) = SyncActor::new(10);
    tokio::spawn(actor.run(Arc::new(gateway.clone())));
    (gateway, requests, store)
}

fn start_scripted_store(scripted: &ScriptedGateway) -> StoreClient {
    let (actor, store) = SyncActor::new(10);
    tokio::spawn(actor.run(Arc::new(scripted.gateway())));
    store
}

async fn seed(
    store: &StoreClient,
    requests: &mut mpsc::Receiver<GatewayRequest>,
    products: Vec<Product>,
) {
    let client = store.clone();
    let fetch = tokio::spawn(async move { client.fetch(1, 12).await });
    let (_, _, responder) = expect_fetch_page(requests)
        .await
        .expect("Expected FetchPage request");
    responder.send(Ok(products)).unwrap();
    fetch.await.unwrap().unwrap();
}

async fn wait_until(store: &StoreClient, condition: impl FnMut(&ProductCollectionState) -> bool) {
    let mut updates = store.watch();
    tokio::time::timeout(Duration::from_secs(1), updates.wait_for(condition))
        .await
        .expect("Timed out waiting for the store")
        .expect("Store closed");
}

#[tokio::test]
async fn test_add_widget_scenario() {
    let (_gateway, mut requests, store) = start_store();
    let mut updates = store.watch();

    let client = store.clone();
    let add =
        tokio::spawn(async move { client.add(ProductPatch::new("Widget", 9.99, 5, true)).await });

    let (patch, responder) = expect_create(&mut requests)
        .await
        .expect("Expected Create request");
    assert_eq!(patch, ProductPatch::new("Widget", 9.99, 5, true));
    assert!(updates.borrow_and_update().add_in_progress);

    responder.send(Ok(widget())).unwrap();
    add.await.unwrap().unwrap();

    let state = store.state();
    assert_eq!(state.products, vec![widget()]);
    assert!(!state.add_in_progress);
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn test_successful_commands_track_gateway_records() {
    let scripted = ScriptedGateway::new();
    scripted.expect_create().return_ok(widget());
    scripted.expect_create().return_ok(gadget());
    scripted
        .expect_update("p1")
        .return_ok(Product::new("p1", "Widget", 12.0, 3, false));
    scripted.expect_create().return_ok(Product::new("p3", "Gizmo", 1.0, 1, true));
    scripted.expect_remove("p2").return_ok(());
    let store = start_scripted_store(&scripted);

    store.add(ProductPatch::new("Widget", 9.99, 5, true)).await.unwrap();
    store.add(ProductPatch::new("Gadget", 4.5, 0, false)).await.unwrap();
    store
        .update(
            "p1",
            ProductPatch {
                price: Some(12.0),
                quantity: Some(3),
                ..ProductPatch::status(false)
            },
        )
        .await
        .unwrap();
    store.add(ProductPatch::new("Gizmo", 1.0, 1, true)).await.unwrap();
    store.delete("p2").await.unwrap();

    let state = store.state();
    assert_eq!(
        state.products,
        vec![
            Product::new("p1", "Widget", 12.0, 3, false),
            Product::new("p3", "Gizmo", 1.0, 1, true),
        ]
    );
    assert!(!state.is_busy());
    assert_eq!(state.last_error, None);
    scripted.verify();
}

#[tokio::test]
async fn test_update_of_absent_id_leaves_products_unchanged() {
    let scripted = ScriptedGateway::new();
    scripted.expect_fetch_page().return_ok(vec![widget(), gadget()]);
    scripted
        .expect_update("p9")
        .return_ok(Product::new("p9", "Ghost", 1.0, 1, true));
    let store = start_scripted_store(&scripted);

    store.fetch(1, 12).await.unwrap();
    store.update("p9", ProductPatch::status(true)).await.unwrap();

    let state = store.state();
    assert_eq!(state.products, vec![widget(), gadget()]);
    assert!(!state.update_in_progress);
    assert_eq!(state.last_error, None, "the update itself must have succeeded");
    scripted.verify();
}

#[tokio::test]
async fn test_delete_of_absent_id_is_noop() {
    let scripted = ScriptedGateway::new();
    scripted.expect_fetch_page().return_ok(vec![widget(), gadget()]);
    scripted.expect_remove("p9").return_ok(());
    let store = start_scripted_store(&scripted);

    store.fetch(1, 12).await.unwrap();
    store.delete("p9").await.unwrap();

    let state = store.state();
    assert_eq!(state.products.len(), 2);
    assert!(!state.delete_in_progress);
    assert_eq!(state.last_error, None, "the delete itself must have succeeded");
    scripted.verify();
}

#[tokio::test]
async fn test_delete_scenario() {
    let (_gateway, mut requests, store) = start_store();
    seed(&store, &mut requests, vec![widget(), gadget()]).await;

    let client = store.clone();
    let delete = tokio::spawn(async move { client.delete("p1").await });
    let (id, responder) = expect_remove(&mut requests)
        .await
        .expect("Expected Remove request");
    assert_eq!(id, "p1");
    assert!(store.state().delete_in_progress);

    responder.send(Ok(())).unwrap();
    delete.await.unwrap().unwrap();

    let state = store.state();
    assert_eq!(state.products, vec![gadget()]);
    assert!(!state.delete_in_progress);
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn test_failed_commands_leave_products_untouched() {
    let scripted = ScriptedGateway::new();
    scripted.expect_fetch_page().return_ok(vec![widget(), gadget()]);
    scripted.expect_create().return_err(RequestError::with_status("Duplicate name", 409));
    scripted
        .expect_update("p1")
        .return_err(RequestError::with_status("Product not found", 404));
    scripted.expect_remove("p2").return_err(RequestError::new("Request failed"));
    scripted.expect_fetch_page().return_err(RequestError::with_status("Unauthorized", 401));
    let store = start_scripted_store(&scripted);

    store.fetch(1, 12).await.unwrap();
    let before = store.state().products;

    store.add(ProductPatch::new("Widget", 9.99, 5, true)).await.unwrap();
    let state = store.state();
    assert_eq!(state.products, before);
    assert_eq!(state.last_error.as_deref(), Some("Duplicate name"));
    assert!(!state.add_in_progress);

    store.update("p1", ProductPatch::status(false)).await.unwrap();
    let state = store.state();
    assert_eq!(state.products, before);
    assert_eq!(state.last_error.as_deref(), Some("Product not found"));
    assert!(!state.update_in_progress);

    store.delete("p2").await.unwrap();
    let state = store.state();
    assert_eq!(state.products, before);
    assert_eq!(state.last_error.as_deref(), Some("Request failed"));
    assert!(!state.delete_in_progress);

    store.fetch(2, 12).await.unwrap();
    let state = store.state();
    assert_eq!(state.products, before);
    assert_eq!(state.last_error.as_deref(), Some("Unauthorized"));
    assert!(!state.fetch_in_progress);

    scripted.verify();
}

#[tokio::test]
async fn test_invalid_update_fails_without_a_request() {
    let (_gateway, mut requests, store) = start_store();
    seed(&store, &mut requests, vec![widget()]).await;

    store
        .update("p1", ProductPatch { price: Some(-1.0), ..ProductPatch::default() })
        .await
        .unwrap();

    let state = store.state();
    assert_eq!(state.products, vec![widget()]);
    assert_eq!(state.last_error.as_deref(), Some("Invalid price: -1"));
    assert!(!state.update_in_progress);
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn test_next_command_clears_last_error() {
    let scripted = ScriptedGateway::new();
    scripted.expect_remove("p1").return_err(RequestError::new("Request failed"));
    scripted.expect_fetch_page().return_ok(vec![widget()]);
    let store = start_scripted_store(&scripted);

    store.delete("p1").await.unwrap();
    assert!(store.state().last_error.is_some());

    store.fetch(1, 12).await.unwrap();
    assert_eq!(store.state().last_error, None);
}

#[tokio::test]
async fn test_reset_clears_everything_and_tolerates_late_completion() {
    let (_gateway, mut requests, store) = start_store();
    seed(&store, &mut requests, vec![widget(), gadget()]).await;

    let client = store.clone();
    let add =
        tokio::spawn(async move { client.add(ProductPatch::new("Gizmo", 1.0, 1, true)).await });
    let (_, responder) = expect_create(&mut requests)
        .await
        .expect("Expected Create request");
    assert!(store.state().add_in_progress);

    store.reset().await.unwrap();
    assert_eq!(store.state(), ProductCollectionState::default());

    // The in-flight add lands on the emptied list.
    let gizmo = Product::new("p3", "Gizmo", 1.0, 1, true);
    responder.send(Ok(gizmo.clone())).unwrap();
    add.await.unwrap().unwrap();

    let state = store.state();
    assert_eq!(state.products, vec![gizmo]);
    assert!(!state.is_busy());
}

#[tokio::test]
async fn test_overlapping_updates_apply_in_arrival_order() {
    let (_gateway, mut requests, store) = start_store();
    seed(&store, &mut requests, vec![widget()]).await;

    let first = {
        let client = store.clone();
        tokio::spawn(async move { client.update("p1", ProductPatch::status(false)).await })
    };
    let (_, _, first_responder) = expect_update(&mut requests)
        .await
        .expect("Expected Update request");

    let second = {
        let client = store.clone();
        tokio::spawn(async move { client.update("p1", ProductPatch::status(true)).await })
    };
    let (_, _, second_responder) = expect_update(&mut requests)
        .await
        .expect("Expected Update request");

    // Issued second, resolves first.
    second_responder
        .send(Ok(Product::new("p1", "Widget", 9.99, 5, true)))
        .unwrap();
    second.await.unwrap().unwrap();
    assert!(!store.state().update_in_progress);

    first_responder
        .send(Ok(Product::new("p1", "Widget", 9.99, 5, false)))
        .unwrap();
    first.await.unwrap().unwrap();

    assert!(!store.state().products[0].status);
}

#[tokio::test]
async fn test_first_snapshot_clears_fetch_flag() {
    let (gateway, _requests, store) = start_store();

    let _subscription = store.subscribe().await.unwrap();
    assert!(store.state().fetch_in_progress);
    assert_eq!(gateway.subscriber_count(), 1);

    assert_eq!(gateway.push_snapshot(vec![widget(), gadget()]), 1);
    wait_until(&store, |state| !state.fetch_in_progress).await;

    assert_eq!(store.state().products, vec![widget(), gadget()]);
}

#[tokio::test]
async fn test_update_resolving_after_snapshot_wins() {
    let (gateway, mut requests, store) = start_store();
    seed(&store, &mut requests, vec![widget()]).await;
    let _subscription = store.subscribe().await.unwrap();

    let client = store.clone();
    let update =
        tokio::spawn(async move { client.update("p1", ProductPatch::status(false)).await });
    let (_, _, responder) = expect_update(&mut requests)
        .await
        .expect("Expected Update request");

    gateway.push_snapshot(vec![widget(), gadget()]);
    wait_until(&store, |state| state.products.len() == 2).await;
    assert!(store.state().update_in_progress);

    let updated = Product::new("p1", "Widget", 9.99, 5, false);
    responder.send(Ok(updated.clone())).unwrap();
    update.await.unwrap().unwrap();

    assert_eq!(store.state().products, vec![updated, gadget()]);
}

#[tokio::test]
async fn test_snapshot_arriving_after_update_wins() {
    let (gateway, mut requests, store) = start_store();
    seed(&store, &mut requests, vec![widget()]).await;
    let _subscription = store.subscribe().await.unwrap();

    let client = store.clone();
    let update =
        tokio::spawn(async move { client.update("p1", ProductPatch::status(false)).await });
    let (_, _, responder) = expect_update(&mut requests)
        .await
        .expect("Expected Update request");

    responder
        .send(Ok(Product::new("p1", "Widget", 9.99, 5, false)))
        .unwrap();
    update.await.unwrap().unwrap();
    assert!(!store.state().products[0].status);

    gateway.push_snapshot(vec![widget(), gadget()]);
    wait_until(&store, |state| state.products.len() == 2).await;

    assert_eq!(store.state().products, vec![widget(), gadget()]);
}

#[tokio::test]
async fn test_unsubscribe_stops_snapshots() {
    let (gateway, _requests, store) = start_store();

    let subscription = store.subscribe().await.unwrap();
    gateway.push_snapshot(vec![widget()]);
    wait_until(&store, |state| state.products.len() == 1).await;

    subscription.unsubscribe();
    assert!(!subscription.is_active());
    gateway.push_snapshot(vec![widget(), gadget()]);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.state().products, vec![widget()]);
    assert_eq!(gateway.subscriber_count(), 0);
}

#[tokio::test]
async fn test_dropping_subscription_unsubscribes() {
    let (gateway, _requests, store) = start_store();

    let subscription = store.subscribe().await.unwrap();
    assert_eq!(gateway.subscriber_count(), 1);
    drop(subscription);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(gateway.push_snapshot(vec![widget()]), 0);
    assert!(store.state().products.is_empty());
}
