//! Tape pool aggregates, supply relationships and the pool/tape lifecycle.

mod common;

use common::*;
use tapecat_catalogue::CatalogueError;
use tapecat_catalogue::models::TapePoolSearchCriteria;

#[tokio::test]
async fn test_pool_with_one_tape_end_to_end() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    create_tape_world(catalogue.as_ref()).await;
    create_tape(catalogue.as_ref(), "V00001", "pool1").await;

    let pool = catalogue
        .tape_pools()
        .get_tape_pool("pool1")
        .await
        .expect("Get tape pool failed")
        .expect("pool1 not found");
    assert_eq!(pool.vo, "vo1");
    assert_eq!(pool.nb_tapes, 1);
    assert_eq!(pool.nb_empty_tapes, 1);
    assert_eq!(pool.nb_writable_tapes, 1);
    assert_eq!(pool.capacity_bytes, TEN_TB);
    assert_eq!(pool.data_bytes, 0);

    let err = catalogue
        .tape_pools()
        .delete_tape_pool("pool1")
        .await
        .expect_err("pool still holds a tape");
    assert!(matches!(
        err,
        CatalogueError::NotEmpty {
            kind: "tape pool",
            ..
        }
    ));

    catalogue
        .tapes()
        .delete_tape("V00001")
        .await
        .expect("Delete tape failed");
    catalogue
        .tape_pools()
        .delete_tape_pool("pool1")
        .await
        .expect("Delete empty pool failed");
    assert!(
        !catalogue
            .tape_pools()
            .tape_pool_exists("pool1")
            .await
            .expect("exists failed")
    );
}

#[tokio::test]
async fn test_pool_counters_follow_tape_flags() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    create_tape(catalogue.as_ref(), "V00001", "pool1").await;
    create_tape(catalogue.as_ref(), "V00002", "pool1").await;

    catalogue
        .tapes()
        .set_tape_full(&admin, "V00001", true)
        .await
        .expect("Set full failed");
    catalogue
        .tapes()
        .modify_tape_state(
            &admin,
            "V00002",
            None,
            tapecat_core::TapeState::Disabled,
            Some("drive errors"),
        )
        .await
        .expect("Disable tape failed");

    let pool = catalogue
        .tape_pools()
        .get_tape_pool("pool1")
        .await
        .expect("Get tape pool failed")
        .expect("pool1 not found");
    assert_eq!(pool.nb_tapes, 2);
    assert_eq!(pool.nb_full_tapes, 1);
    assert_eq!(pool.nb_disabled_tapes, 1);
    assert_eq!(pool.nb_writable_tapes, 0);
    assert_eq!(pool.capacity_bytes, 2 * TEN_TB);
}

#[tokio::test]
async fn test_supply_rejects_self_and_accepts_mutual() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    catalogue
        .tape_pools()
        .create_tape_pool(&admin, &new_tape_pool("pool2", "vo1"))
        .await
        .expect("Create tape pool failed");

    let err = catalogue
        .tape_pools()
        .modify_tape_pool_supply(&admin, "pool1", &["pool1".to_string()])
        .await
        .expect_err("a pool cannot supply itself");
    assert!(matches!(
        err,
        CatalogueError::InvalidField {
            field: "supply",
            ..
        }
    ));

    catalogue
        .tape_pools()
        .modify_tape_pool_supply(&admin, "pool1", &["pool2".to_string()])
        .await
        .expect("pool2 supplies pool1");
    catalogue
        .tape_pools()
        .modify_tape_pool_supply(&admin, "pool2", &["pool1".to_string()])
        .await
        .expect("mutual supply is allowed");

    let pools = catalogue
        .tape_pools()
        .get_tape_pools(&TapePoolSearchCriteria::default())
        .await
        .expect("List pools failed");
    let pool1 = pools.iter().find(|p| p.name == "pool1").expect("pool1");
    assert_eq!(pool1.supply_sources, vec!["pool2".to_string()]);
    assert_eq!(pool1.supply_destinations, vec!["pool2".to_string()]);

    let err = catalogue
        .tape_pools()
        .modify_tape_pool_supply(&admin, "pool1", &["missing".to_string()])
        .await
        .expect_err("unknown supply pool");
    assert!(matches!(err, CatalogueError::NotFound { .. }));

    // Deleting a pool drops the links that name it.
    catalogue
        .tape_pools()
        .delete_tape_pool("pool2")
        .await
        .expect("Delete pool2 failed");
    let pool1 = catalogue
        .tape_pools()
        .get_tape_pool("pool1")
        .await
        .expect("Get tape pool failed")
        .expect("pool1 not found");
    assert!(pool1.supply_sources.is_empty());
    assert!(pool1.supply_destinations.is_empty());
}

#[tokio::test]
async fn test_search_criteria() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    let mut encrypted = new_tape_pool("secret", "vo1");
    encrypted.encryption = true;
    encrypted.encryption_key_name = Some("key1".to_string());
    catalogue
        .tape_pools()
        .create_tape_pool(&admin, &encrypted)
        .await
        .expect("Create encrypted pool failed");

    let found = catalogue
        .tape_pools()
        .get_tape_pools(&TapePoolSearchCriteria {
            encrypted: Some(true),
            ..Default::default()
        })
        .await
        .expect("Search failed");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "secret");

    let err = catalogue
        .tape_pools()
        .get_tape_pools(&TapePoolSearchCriteria {
            vo: Some(String::new()),
            ..Default::default()
        })
        .await
        .expect_err("empty criterion");
    assert!(matches!(err, CatalogueError::EmptyField { .. }));

    let err = catalogue
        .tape_pools()
        .get_tape_pools(&TapePoolSearchCriteria {
            vo: Some("nobody".to_string()),
            ..Default::default()
        })
        .await
        .expect_err("unknown VO criterion");
    assert!(matches!(err, CatalogueError::NotFound { .. }));
}

#[tokio::test]
async fn test_vo_of_tape_pool() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    create_tape_world(catalogue.as_ref()).await;

    let vo = catalogue
        .vos()
        .get_virtual_organization_of_tape_pool("pool1")
        .await
        .expect("VO of pool failed");
    assert_eq!(vo.name, "vo1");

    let err = catalogue
        .vos()
        .get_virtual_organization_of_tape_pool("missing")
        .await
        .expect_err("unknown pool");
    assert!(matches!(
        err,
        CatalogueError::NotFound {
            kind: "tape pool",
            ..
        }
    ));
}
