//! CSV import and export endpoints.

use axum::http::{Method, StatusCode};

use super::common::{
    create_test_router, get_request, send_request, send_request_raw, text_request,
};

const CSV: &str = "# laptops for Burgerzaken\n\
SerialNumber;AssetTypeCode;Status;PurchaseDate;IsDummy;AssetName;ServiceCode;Owner;Brand;Model;InstallationDate;WarrantyExpiry;Notes\n\
CSV-001;LAP;InGebruik;15/03/2024;nee;Laptop 1;;;HP;\"EliteBook 840; G10\";;;\n\
CSV-002;MON;Stock;2024-03-15;0;Scherm 1;;;Dell;P2422H;;;\n\
;LAP;;;nee;Geen serienummer;;;;;;;\n";

#[tokio::test]
async fn test_validate_is_dry_run() {
    let (app, _) = create_test_router().await;

    let (status, report) = send_request(
        app.clone(),
        text_request(Method::POST, "/api/v1/import/csv/validate", CSV),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["dryRun"], true);
    assert_eq!(report["totalRows"], 3);
    assert_eq!(report["validRows"], 2);
    assert_eq!(report["rows"][2]["status"], "Invalid");

    let (_, page) = send_request(app, get_request("/api/v1/assets")).await;
    assert_eq!(page["totalCount"], 0);
}

#[tokio::test]
async fn test_import_writes_valid_rows() {
    let (app, _) = create_test_router().await;

    let (status, report) = send_request(
        app.clone(),
        text_request(Method::POST, "/api/v1/import/csv", CSV),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["importedRows"], 2);
    assert_eq!(report["failedRows"], 1);
    assert_eq!(report["rows"][0]["assetCode"], "LAP-24-00001");

    let (_, asset) = send_request(app, get_request("/api/v1/assets/by-serial/CSV-001")).await;
    assert_eq!(asset["model"], "EliteBook 840; G10");
    assert_eq!(asset["status"], "InUse");
}

#[tokio::test]
async fn test_stop_on_error_writes_nothing() {
    let (app, _) = create_test_router().await;

    let (status, report) = send_request(
        app.clone(),
        text_request(Method::POST, "/api/v1/import/csv?stopOnError=true", CSV),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["importedRows"], 0);
    assert_eq!(report["rows"][0]["status"], "Skipped");

    let (_, page) = send_request(app, get_request("/api/v1/assets")).await;
    assert_eq!(page["totalCount"], 0);
}

#[tokio::test]
async fn test_export_round_trips_columns() {
    let (app, _) = create_test_router().await;
    send_request(
        app.clone(),
        text_request(Method::POST, "/api/v1/import/csv", CSV),
    )
    .await;

    let (status, csv) =
        send_request_raw(app, get_request("/api/v1/export/csv?search=CSV-001")).await;

    assert_eq!(status, StatusCode::OK);
    let mut lines = csv.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("SerialNumber,AssetTypeCode,Status"));
    assert!(header.ends_with("AssetCode"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("CSV-001,LAP,InUse,2024-03-15"));
    assert!(row.contains("\"EliteBook 840; G10\""));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_template_download() {
    let (app, _) = create_test_router().await;

    let (status, body) = send_request_raw(app, get_request("/api/v1/export/template")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with('#'));
    assert!(body.contains("SerialNumber,AssetTypeCode"));
}
