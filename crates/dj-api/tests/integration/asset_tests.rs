//! Asset endpoints.

use axum::http::{Method, StatusCode};
use chrono::{Datelike, Utc};
use dj_connectors::MockDeviceManagement;
use serde_json::json;
use std::sync::Arc;

use super::common::{
    asset_type_id, create_asset, create_test_router, create_test_state, get_request,
    json_request, send_request,
};
use dj_api::routes;

#[tokio::test]
async fn test_create_generates_code() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;

    let asset = create_asset(
        &app,
        json!({
            "assetName": "Laptop Burgerzaken",
            "assetTypeId": lap,
            "serialNumber": "5CD1234XYZ",
            "purchaseDate": "2024-03-15",
            "status": "InUse"
        }),
    )
    .await;

    assert_eq!(asset["assetCode"], "LAP-24-00001");
    assert_eq!(asset["status"], "InUse");
    assert_eq!(asset["isActive"], true);

    let second = create_asset(
        &app,
        json!({ "assetName": "Laptop ICT", "assetTypeId": lap, "serialNumber": "5CD0000AAA", "purchaseDate": "2024-06-01" }),
    )
    .await;
    assert_eq!(second["assetCode"], "LAP-24-00002");
}

#[tokio::test]
async fn test_dummy_asset_uses_dummy_band() {
    let (app, _) = create_test_router().await;
    let mon = asset_type_id(&app, "MON").await;

    let asset = create_asset(
        &app,
        json!({ "assetName": "Testscherm", "assetTypeId": mon, "isDummy": true }),
    )
    .await;

    let year = Utc::now().year() % 100;
    assert_eq!(asset["assetCode"], format!("DUM-MON-{:02}-90001", year));
}

#[tokio::test]
async fn test_get_by_code_and_serial() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    let created = create_asset(
        &app,
        json!({ "assetName": "Laptop", "assetTypeId": lap, "serialNumber": "SN-42", "purchaseDate": "2025-01-02" }),
    )
    .await;
    let code = created["assetCode"].as_str().unwrap();

    let (status, by_code) = send_request(
        app.clone(),
        get_request(&format!("/api/v1/assets/by-code/{}", code)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_code["id"], created["id"]);

    let (status, by_serial) =
        send_request(app.clone(), get_request("/api/v1/assets/by-serial/SN-42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_serial["id"], created["id"]);

    let (status, body) =
        send_request(app, get_request("/api/v1/assets/by-code/LAP-25-09999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_serial_is_conflict() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    create_asset(
        &app,
        json!({ "assetName": "A", "assetTypeId": lap, "serialNumber": "DUP-1" }),
    )
    .await;

    let (status, body) = send_request(
        app,
        json_request(
            Method::POST,
            "/api/v1/assets",
            json!({ "assetName": "B", "assetTypeId": lap, "serialNumber": "DUP-1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_markup_in_name_is_unprocessable() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;

    let (status, body) = send_request(
        app,
        json_request(
            Method::POST,
            "/api/v1/assets",
            json!({ "assetName": "<script>alert(1)</script>", "assetTypeId": lap }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    let mon = asset_type_id(&app, "MON").await;
    for i in 0..3 {
        create_asset(
            &app,
            json!({ "assetName": format!("Laptop {}", i), "assetTypeId": lap, "status": "Stock" }),
        )
        .await;
    }
    create_asset(
        &app,
        json!({ "assetName": "Scherm", "assetTypeId": mon, "status": "Repair" }),
    )
    .await;

    let (status, page) = send_request(
        app.clone(),
        get_request("/api/v1/assets?page=1&pageSize=2"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalCount"], 4);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["hasNextPage"], true);

    let (_, repair) = send_request(
        app.clone(),
        get_request("/api/v1/assets?status=herstelling"),
    )
    .await;
    assert_eq!(repair["totalCount"], 1);
    assert_eq!(repair["items"][0]["assetName"], "Scherm");

    let (status, _) =
        send_request(app, get_request("/api/v1/assets?status=onbekend")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_records_events() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    let created = create_asset(&app, json!({ "assetName": "Laptop", "assetTypeId": lap })).await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send_request(
        app.clone(),
        json_request(
            Method::PUT,
            &format!("/api/v1/assets/{}", id),
            json!({ "status": "InUse", "owner": "jan.peeters@diepenbeek.be" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["owner"], "jan.peeters@diepenbeek.be");

    let (status, events) =
        send_request(app, get_request(&format!("/api/v1/assets/{}/events", id))).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["eventType"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"Created"));
    assert!(types.contains(&"StatusChanged"));
    assert!(types.contains(&"OwnerChanged"));
}

#[tokio::test]
async fn test_deactivate_hides_from_default_list() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    let created = create_asset(&app, json!({ "assetName": "Oud", "assetTypeId": lap })).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            &format!("/api/v1/assets/{}/deactivate", id),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);

    let (_, page) = send_request(app.clone(), get_request("/api/v1/assets")).await;
    assert_eq!(page["totalCount"], 0);
    let (_, page) = send_request(app, get_request("/api/v1/assets?includeInactive=true")).await;
    assert_eq!(page["totalCount"], 1);
}

#[tokio::test]
async fn test_bulk_create() {
    let (app, _) = create_test_router().await;
    let mon = asset_type_id(&app, "MON").await;

    let (status, body) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            "/api/v1/assets/bulk",
            json!({ "quantity": 3, "assetTypeId": mon, "assetName": "Dell P2422H", "purchaseDate": "2025-02-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["assetCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["MON-25-00001", "MON-25-00002", "MON-25-00003"]);

    let (status, _) = send_request(
        app,
        json_request(
            Method::POST,
            "/api/v1/assets/bulk",
            json!({ "quantity": 101, "assetTypeId": mon, "assetName": "Te veel" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_code_preview_does_not_reserve() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    let request = json!({ "assetTypeId": lap, "purchaseDate": "2023-09-01" });

    for _ in 0..2 {
        let (status, body) = send_request(
            app.clone(),
            json_request(Method::POST, "/api/v1/codes/preview", request.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assetCode"], "LAP-23-00001");
    }
}

#[tokio::test]
async fn test_leases_for_asset() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    let created =
        create_asset(&app, json!({ "assetName": "Lease laptop", "assetTypeId": lap })).await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            &format!("/api/v1/assets/{}/leases", id),
            json!({ "contractNumber": "LC-1", "startDate": "2025-01-01", "endDate": "2024-01-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, lease) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            &format!("/api/v1/assets/{}/leases", id),
            json!({ "contractNumber": "LC-1", "vendor": "Leasecorp", "startDate": "2020-01-01", "endDate": "2099-12-31" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lease["status"], "Active");

    let (status, ended) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            &format!("/api/v1/leases/{}/end", lease["id"].as_str().unwrap()),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ended["isActive"], false);

    let (_, leases) =
        send_request(app, get_request(&format!("/api/v1/assets/{}/leases", id))).await;
    assert_eq!(leases.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_intune_lookup_requires_configuration() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    let created = create_asset(
        &app,
        json!({ "assetName": "Laptop", "assetTypeId": lap, "serialNumber": "5CD1234XYZ" }),
    )
    .await;
    let path = format!("/api/v1/assets/{}/intune", created["id"].as_str().unwrap());

    let (status, _) = send_request(app, get_request(&path)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_intune_lookup_by_asset_serial() {
    let state = create_test_state()
        .await
        .with_device_management(Arc::new(MockDeviceManagement::with_sample_data()));
    let app = routes::create_router(state);
    let lap = asset_type_id(&app, "LAP").await;
    let created = create_asset(
        &app,
        json!({ "assetName": "Laptop", "assetTypeId": lap, "serialNumber": "5CD1234XYZ" }),
    )
    .await;

    let (status, devices) = send_request(
        app,
        get_request(&format!(
            "/api/v1/assets/{}/intune",
            created["id"].as_str().unwrap()
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(devices[0]["deviceName"], "DIEP-LAP-001");
}

#[tokio::test]
async fn test_legacy_prefix_routes() {
    let (app, _) = create_test_router().await;
    let (status, _) = send_request(app, get_request("/api/assets")).await;
    assert_eq!(status, StatusCode::OK);
}
