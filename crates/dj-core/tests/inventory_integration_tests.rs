//! End-to-end tests of the services over SQLite.
//!
//! Each test opens its own in-memory database, applies the migrations and
//! seeds the default reference data.
//!
//! ```bash
//! cargo test -p dj-core --test inventory_integration_tests
//! ```

#![cfg(feature = "database")]

use chrono::NaiveDate;
use dj_core::asset_code::{AssetCodeGenerator, CodeVersion};
use dj_core::db::{
    create_asset_type_repository, create_building_repository, create_pool, run_migrations,
    seed_reference_data, DbPool, Pagination,
};
use dj_core::models::{AssetFilter, AssetStatus, AssetUpdate, Building, NewAsset};
use dj_core::services::{
    AssetService, CsvImportService, EventService, ImportOptions, LeaseService, NewLease,
    ServiceError, Stores,
};
use std::sync::Arc;
use uuid::Uuid;

async fn setup() -> DbPool {
    let pool = create_pool("sqlite::memory:").await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    seed_reference_data(&pool).await.expect("seed");
    pool
}

async fn laptop_type_id(pool: &DbPool) -> Uuid {
    create_asset_type_repository(pool)
        .get_by_code("LAP")
        .await
        .unwrap()
        .expect("seeded LAP type")
        .id
}

fn laptop(type_id: Uuid, serial: &str) -> NewAsset {
    NewAsset {
        asset_name: format!("Laptop {serial}"),
        asset_type_id: type_id,
        serial_number: Some(serial.to_string()),
        purchase_date: NaiveDate::from_ymd_opt(2024, 9, 1),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let pool = setup().await;
    let again = seed_reference_data(&pool).await.unwrap();
    assert_eq!(again.categories, 0);
    assert_eq!(again.asset_types, 0);
}

#[tokio::test]
async fn test_create_update_and_history() {
    let pool = setup().await;
    let type_id = laptop_type_id(&pool).await;
    let service = AssetService::new(Stores::from_pool(&pool), AssetCodeGenerator::default());

    let first = service
        .create(laptop(type_id, "5CD0000001"), Some("admin"))
        .await
        .unwrap();
    let second = service
        .create(laptop(type_id, "5CD0000002"), Some("admin"))
        .await
        .unwrap();
    assert_eq!(first.asset_code, "LAP-24-00001");
    assert_eq!(second.asset_code, "LAP-24-00002");

    let updated = service
        .update(
            first.id,
            AssetUpdate {
                status: Some(AssetStatus::InUse),
                owner: Some("an.janssens@diepenbeek.be".into()),
                ..Default::default()
            },
            Some("admin"),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, AssetStatus::InUse);

    let history = service.events().history(first.id).await.unwrap();
    assert_eq!(history.len(), 3);

    let found = service.get_by_serial("5CD0000002").await.unwrap();
    assert_eq!(found.id, second.id);
}

#[tokio::test]
async fn test_legacy_codes_and_location_segment() {
    let pool = setup().await;
    let type_id = laptop_type_id(&pool).await;
    let building = create_building_repository(&pool)
        .create(&Building::new("GH", "Gemeentehuis"))
        .await
        .unwrap();

    let service = AssetService::new(
        Stores::from_pool(&pool),
        AssetCodeGenerator::new(CodeVersion::Legacy),
    )
    .with_location_codes(true);

    let mut new = laptop(type_id, "SN-LOC-1");
    new.building_id = Some(building.id);
    let asset = service.create(new, None).await.unwrap();
    assert_eq!(asset.asset_code, "LAP-24-GH-0001");

    let mut dummy = laptop(type_id, "SN-DUM-1");
    dummy.is_dummy = true;
    let asset = service.create(dummy, None).await.unwrap();
    assert_eq!(asset.asset_code, "DUM-LAP-24-9000");
}

#[tokio::test]
async fn test_duplicate_serial_maps_to_conflict() {
    let pool = setup().await;
    let type_id = laptop_type_id(&pool).await;
    let service = AssetService::new(Stores::from_pool(&pool), AssetCodeGenerator::default());

    service
        .create(laptop(type_id, "SN-1"), None)
        .await
        .unwrap();
    let err = service
        .create(laptop(type_id, "sn-1"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let pool = setup().await;
    let type_id = laptop_type_id(&pool).await;
    let service = AssetService::new(Stores::from_pool(&pool), AssetCodeGenerator::default());

    for i in 0..7 {
        let asset = service
            .create(laptop(type_id, &format!("SN-{i}")), None)
            .await
            .unwrap();
        if i % 2 == 0 {
            service.deactivate(asset.id, None).await.unwrap();
        }
    }

    let page = service
        .list(&AssetFilter::default(), &Pagination::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.total_count, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next_page);

    let all = service
        .list(
            &AssetFilter {
                include_inactive: true,
                search: Some("SN-".into()),
                ..Default::default()
            },
            &Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(all.total_count, 7);
}

#[tokio::test]
async fn test_csv_import_against_database() {
    let pool = setup().await;
    let service = Arc::new(AssetService::new(
        Stores::from_pool(&pool),
        AssetCodeGenerator::default(),
    ));
    let importer = CsvImportService::new(service.clone());

    let input = "\
SerialNumber;AssetTypeCode;Status;PurchaseDate;IsDummy;AssetName
SN-A;LAP;In gebruik;2023-05-01;nee;Laptop A
SN-B;MON;;2023-05-01;;
SN-C;XXX;;;;
";
    let report = importer
        .import(input, ImportOptions::default(), Some("importer"))
        .await
        .unwrap();
    assert_eq!(report.imported_rows, 2);
    assert_eq!(report.failed_rows, 1);

    let a = service.get_by_serial("SN-A").await.unwrap();
    assert_eq!(a.asset_code, "LAP-23-00001");
    assert_eq!(a.status, AssetStatus::InUse);
}

#[tokio::test]
async fn test_leases_cascade_with_asset() {
    let pool = setup().await;
    let type_id = laptop_type_id(&pool).await;
    let stores = Stores::from_pool(&pool);
    let assets = AssetService::new(stores.clone(), AssetCodeGenerator::default());
    let leases = LeaseService::new(
        stores.leases.clone(),
        stores.assets.clone(),
        EventService::new(stores.events.clone()),
    );

    let asset = assets.create(laptop(type_id, "SN-L"), None).await.unwrap();
    let lease = leases
        .create(
            asset.id,
            NewLease {
                contract_number: "LC-001".into(),
                vendor: None,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
                monthly_rate_cents: Some(3_500),
                notes: None,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(leases.list_for_asset(asset.id).await.unwrap().len(), 1);

    assets.delete(asset.id).await.unwrap();
    assert!(matches!(
        leases.get(lease.id).await,
        Err(ServiceError::NotFound { .. })
    ));
}
