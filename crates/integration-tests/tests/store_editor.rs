//! Store profiles through the service layer: operation envelopes applied to
//! stored branches, images and store info.

#![allow(clippy::unwrap_used)]

use harvest_market_core::store::{OperationEnvelope, StoreDetails, StoreInfo};
use harvest_market_core::{StoreProfileId, UserId};
use harvest_market_integration_tests::MemoryProfileStore;
use harvest_market_server::error::AppError;
use harvest_market_server::services::stores;
use serde_json::{Value, json};

const OWNER: UserId = UserId::new(3);

fn envelope(body: Value) -> OperationEnvelope {
    serde_json::from_value(body).unwrap()
}

async fn registered(store: &MemoryProfileStore<StoreDetails>) -> StoreProfileId {
    let info: StoreInfo = serde_json::from_value(json!({
        "storeName": "Mama Put Provisions",
        "storeLocation": "Ibadan",
    }))
    .unwrap();
    stores::register_store(store, OWNER, info).await.unwrap().id
}

fn add_branch(id: &str, name: &str) -> OperationEnvelope {
    envelope(json!({
        "operation": "addBranch",
        "branches": {
            "id": id,
            "branchName": name,
            "branchLocation": "Bodija",
            "branchPhone": "+2348000000000",
        },
    }))
}

#[tokio::test]
async fn test_register_starts_empty() {
    let store = MemoryProfileStore::new();
    let id = registered(&store).await;

    let profile = store.get(id).unwrap();
    assert!(profile.details.branches.is_empty());
    assert!(profile.details.store_images.is_empty());
    assert_eq!(profile.version, 1);
}

#[tokio::test]
async fn test_add_then_update_branch() {
    let store = MemoryProfileStore::new();
    let id = registered(&store).await;

    stores::edit_store(&store, id, OWNER, add_branch("b-1", "Bodija"))
        .await
        .unwrap();

    let update = envelope(json!({
        "operation": "updateBranch",
        "branchId": "b-1",
        "branches": {
            "branchName": "Bodija Market",
            "branchLocation": "Bodija",
            "branchPhone": "+2348000000001",
        },
    }));
    let profile = stores::edit_store(&store, id, OWNER, update).await.unwrap();

    assert_eq!(profile.version, 3);
    assert_eq!(profile.details.branches.len(), 1);
    assert_eq!(profile.details.branches[0].id.as_str(), "b-1");
    assert_eq!(profile.details.branches[0].fields.branch_name, "Bodija Market");
}

#[tokio::test]
async fn test_unknown_branch_update_skips_write() {
    let store = MemoryProfileStore::new();
    let id = registered(&store).await;
    stores::edit_store(&store, id, OWNER, add_branch("b-1", "Bodija"))
        .await
        .unwrap();

    let update = envelope(json!({
        "operation": "updateBranch",
        "branchId": "b-404",
        "branches": {
            "branchName": "Nowhere",
            "branchLocation": "Nowhere",
            "branchPhone": "+2348000000002",
        },
    }));
    let profile = stores::edit_store(&store, id, OWNER, update).await.unwrap();

    assert_eq!(profile.version, 2);
    assert_eq!(profile.details.branches[0].fields.branch_name, "Bodija");
}

#[tokio::test]
async fn test_duplicate_branch_id_is_rejected() {
    let store = MemoryProfileStore::new();
    let id = registered(&store).await;
    stores::edit_store(&store, id, OWNER, add_branch("b-1", "Bodija"))
        .await
        .unwrap();

    let err = stores::edit_store(&store, id, OWNER, add_branch("b-1", "Dugbe"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Mutation(_)));
    assert_eq!(store.get(id).unwrap().details.branches.len(), 1);
}

#[tokio::test]
async fn test_image_lifecycle() {
    let store = MemoryProfileStore::new();
    let id = registered(&store).await;

    let add = envelope(json!({
        "operation": "addImage",
        "storeImages": {
            "id": "img-1",
            "url": "https://cdn.example.com/rice.jpg",
            "itemName": "Ofada rice",
            "itemPrice": "12000",
        },
    }));
    let profile = stores::edit_store(&store, id, OWNER, add).await.unwrap();
    assert!(profile.details.store_images[0].fields.available);

    let delete = envelope(json!({"operation": "deleteImage", "imageId": "img-1"}));
    let profile = stores::edit_store(&store, id, OWNER, delete).await.unwrap();
    assert!(profile.details.store_images.is_empty());
    assert_eq!(profile.version, 3);
}

#[tokio::test]
async fn test_update_store_info_keeps_collections() {
    let store = MemoryProfileStore::new();
    let id = registered(&store).await;
    stores::edit_store(&store, id, OWNER, add_branch("b-1", "Bodija"))
        .await
        .unwrap();

    let update = envelope(json!({
        "operation": "updateStoreInfo",
        "storeInfo": {"description": "Grains and spices"},
    }));
    let profile = stores::edit_store(&store, id, OWNER, update).await.unwrap();

    assert_eq!(
        profile.details.info.description.as_deref(),
        Some("Grains and spices")
    );
    assert_eq!(profile.details.info.store_name, "Mama Put Provisions");
    assert_eq!(profile.details.branches.len(), 1);
}

#[tokio::test]
async fn test_malformed_envelope_is_rejected_before_lookup() {
    let store = MemoryProfileStore::<StoreDetails>::new();

    // No such store: a malformed envelope still reports the envelope problem.
    let err = stores::edit_store(
        &store,
        StoreProfileId::new(42),
        OWNER,
        envelope(json!({"operation": "updateBranch", "branches": {}})),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Mutation(_)));

    let err = stores::edit_store(
        &store,
        StoreProfileId::new(42),
        OWNER,
        envelope(json!({"operation": "paintWalls"})),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("paintWalls"));
}

#[tokio::test]
async fn test_other_owner_cannot_edit() {
    let store = MemoryProfileStore::new();
    let id = registered(&store).await;

    let err = stores::edit_store(&store, id, UserId::new(4), add_branch("b-9", "Intruder"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(store.get(id).unwrap().details.branches.is_empty());
}
