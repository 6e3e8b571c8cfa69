//! Reference data endpoints.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::common::{
    asset_type_id, create_asset, create_test_router, get_request, json_request, send_request,
};

#[tokio::test]
async fn test_seeded_asset_types() {
    let (app, _) = create_test_router().await;

    let (status, body) = send_request(app, get_request("/api/v1/asset-types")).await;

    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["code"].as_str().unwrap())
        .collect();
    for code in ["LAP", "DESK", "MON", "PRN", "DOCK", "PHN", "TAB"] {
        assert!(codes.contains(&code), "missing {}", code);
    }
}

#[tokio::test]
async fn test_asset_type_code_rules() {
    let (app, _) = create_test_router().await;

    let (status, created) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            "/api/v1/asset-types",
            json!({ "code": "scan", "name": "Scanner" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["code"], "SCAN");

    let (status, _) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            "/api/v1/asset-types",
            json!({ "code": "SCAN", "name": "Nog een scanner" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_request(
        app,
        json_request(
            Method::POST,
            "/api/v1/asset-types",
            json!({ "code": "TOO-LONG-CODE", "name": "Ongeldig" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["code"].is_array());
}

#[tokio::test]
async fn test_asset_type_in_use_cannot_be_deleted() {
    let (app, _) = create_test_router().await;
    let lap = asset_type_id(&app, "LAP").await;
    create_asset(&app, json!({ "assetName": "Laptop", "assetTypeId": lap })).await;

    let (status, _) = send_request(
        app.clone(),
        json_request(
            Method::DELETE,
            &format!("/api/v1/asset-types/{}", lap),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send_request(
        app,
        json_request(
            Method::PUT,
            &format!("/api/v1/asset-types/{}", lap),
            json!({ "isActive": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isActive"], false);
}

#[tokio::test]
async fn test_sector_services() {
    let (app, _) = create_test_router().await;

    let (status, sector) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            "/api/v1/sectors",
            json!({ "code": "ORG", "name": "Organisatie" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let sector_id = sector["id"].as_str().unwrap();

    let (status, service) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            "/api/v1/services",
            json!({ "code": "ict", "name": "ICT", "sectorId": sector_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(service["code"], "ICT");

    let (_, by_sector) = send_request(
        app.clone(),
        get_request(&format!("/api/v1/sectors/{}/services", sector_id)),
    )
    .await;
    assert_eq!(by_sector.as_array().unwrap().len(), 1);

    let (_, filtered) = send_request(
        app.clone(),
        get_request(&format!("/api/v1/services?sectorId={}", sector_id)),
    )
    .await;
    assert_eq!(filtered[0]["id"], service["id"]);

    let (status, _) = send_request(
        app,
        json_request(
            Method::POST,
            "/api/v1/services",
            json!({ "code": "BZ", "name": "Burgerzaken", "sectorId": uuid::Uuid::new_v4() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_building_crud() {
    let (app, _) = create_test_router().await;

    let (status, building) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            "/api/v1/buildings",
            json!({ "code": "GH", "name": "Gemeentehuis", "address": "Grote Steenweg 1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = building["id"].as_str().unwrap();

    let (status, updated) = send_request(
        app.clone(),
        json_request(
            Method::PUT,
            &format!("/api/v1/buildings/{}", id),
            json!({ "name": "Gemeentehuis Diepenbeek", "address": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Gemeentehuis Diepenbeek");
    assert!(updated["address"].is_null());

    let (status, _) = send_request(
        app.clone(),
        json_request(Method::DELETE, &format!("/api/v1/buildings/{}", id), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
        send_request(app, get_request(&format!("/api/v1/buildings/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_template_bulk_create() {
    let (app, _) = create_test_router().await;
    let dock = asset_type_id(&app, "DOCK").await;

    let (status, template) = send_request(
        app.clone(),
        json_request(
            Method::POST,
            "/api/v1/templates",
            json!({ "templateName": "HP dock", "assetTypeId": dock, "assetName": "HP USB-C Dock", "brand": "HP" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, created) = send_request(
        app,
        json_request(
            Method::POST,
            "/api/v1/assets/bulk",
            json!({ "quantity": 2, "templateId": template["id"], "isDummy": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = created.as_array().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["brand"], "HP");
    assert_eq!(created[0]["assetName"], "HP USB-C Dock");
}
