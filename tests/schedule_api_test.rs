mod common;

use axum::http::{header, Method, StatusCode};
use common::{response_json, response_text, FilePart, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_generate_creates_one_schedule_per_active_stakeholder() {
    let app = TestApp::new().await;
    app.create_stakeholder("Desa A", "Jakarta", 50).await;
    app.create_stakeholder("Desa B", "Bandung", 30).await;
    app.create_stakeholder("Desa C", "Bandung", 20).await;

    let body = app
        .post_json(
            "/api/routines/schedules/generate",
            json!({ "month": 3, "year": 2025 }),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(body["created"], 3);
    assert_eq!(body["message"], "Generated 3 schedules");

    let body = app
        .post_json(
            "/api/routines/schedules/generate",
            json!({ "month": 3, "year": 2025 }),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(body["created"], 0);

    let rows = app.get_json("/api/routines/schedules?month=3&year=2025").await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["pickup_date"] == "2025-03-15"));
    assert!(rows.iter().all(|r| r["status"] == "scheduled"));
}

#[tokio::test]
async fn test_generate_validates_month() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/routines/schedules/generate",
            Some(json!({ "month": 13, "year": 2025 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/routines/schedules/generate",
            Some(json!({ "year": 2025 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_month_filter_returns_only_that_month() {
    let app = TestApp::new().await;
    let id = app.create_stakeholder("Desa A", "Jakarta", 50).await;
    let id = id.to_string();

    for day in ["2025-02-28", "2025-03-01", "2025-03-31", "2025-04-01"] {
        let response = app
            .multipart(
                Method::POST,
                "/api/routines/schedules",
                &[("stakeholder_id", &id), ("pickup_date", day), ("quantity", "10")],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let rows = app.get_json("/api/routines/schedules?month=3&year=2025").await;
    let dates: Vec<_> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["pickup_date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, ["2025-03-01", "2025-03-31"]);
}

#[tokio::test]
async fn test_list_rejects_malformed_month() {
    let app = TestApp::new().await;
    let id = app.create_stakeholder("Desa A", "Jakarta", 50).await.to_string();

    let response = app
        .multipart(
            Method::POST,
            "/api/routines/schedules",
            &[("stakeholder_id", &id), ("pickup_date", "2019-06-15")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    for uri in [
        "/api/routines/schedules?month=13&year=2025",
        "/api/routines/schedules?month=0&year=2025",
        "/api/routines/schedules?month=abc&year=2025",
    ] {
        let response = app.request_authenticated(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "GET {uri}");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json",
            "GET {uri}"
        );
        let body = response_json(response).await;
        assert_eq!(body["message"], "Invalid request");
        assert!(body["error"].is_string());
    }

    let response = app
        .request_authenticated(Method::GET, "/api/routines/analytics?year=next", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["message"], "Invalid request");
}

#[tokio::test]
async fn test_create_with_proof_upload_and_update() {
    let app = TestApp::new().await;
    let stakeholder_id = app.create_stakeholder("Desa A", "Jakarta", 50).await.to_string();

    let response = app
        .multipart(
            Method::POST,
            "/api/routines/schedules",
            &[
                ("stakeholder_id", &stakeholder_id),
                ("pickup_date", "2025-03-15"),
                ("quantity", "50"),
                ("status", "completed"),
                ("pic", "Budi"),
            ],
            Some(FilePart {
                field: "proof_file",
                file_name: "bukti.JPG",
                bytes: b"fake image bytes",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    assert_eq!(created["status"], "completed");
    assert_eq!(created["pic"], "Budi");
    assert_eq!(created["stakeholder"]["institution_name"], "Desa A");

    let proof = created["proof_file"].as_str().unwrap();
    assert!(proof.starts_with("proof-"));
    assert!(proof.ends_with(".jpg"));
    assert!(app.upload_dir().join(proof).exists());

    let response = app
        .request(Method::GET, &format!("/uploads/{proof}"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_text(response).await, "fake image bytes");

    let id = created["id"].as_i64().unwrap();
    let response = app
        .multipart(
            Method::PUT,
            &format!("/api/routines/schedules/{id}"),
            &[("quantity", "35"), ("notes", "Hujan")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = response_json(response).await;
    assert_eq!(updated["quantity"], 35);
    assert_eq!(updated["notes"], "Hujan");
    assert_eq!(updated["proof_file"], proof);
    assert_eq!(updated["pickup_date"], "2025-03-15");
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let app = TestApp::new().await;
    let stakeholder_id = app.create_stakeholder("Desa A", "Jakarta", 50).await.to_string();

    let response = app
        .multipart(
            Method::POST,
            "/api/routines/schedules",
            &[("stakeholder_id", "9999"), ("pickup_date", "2025-03-15")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .multipart(
            Method::POST,
            "/api/routines/schedules",
            &[("stakeholder_id", &stakeholder_id), ("pickup_date", "15/03/2025")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .multipart(
            Method::POST,
            "/api/routines/schedules",
            &[
                ("stakeholder_id", &stakeholder_id),
                ("pickup_date", "2025-03-15"),
                ("status", "archived"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .multipart(Method::PUT, "/api/routines/schedules/9999", &[("quantity", "1")], None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rejected_create_leaves_no_upload_behind() {
    let app = TestApp::new().await;
    let stakeholder_id = app.create_stakeholder("Desa A", "Jakarta", 50).await;

    let response = app
        .multipart(
            Method::POST,
            "/api/routines/schedules",
            &[("stakeholder_id", "9999"), ("pickup_date", "2025-03-15")],
            Some(FilePart {
                field: "proof_file",
                file_name: "bukti.jpg",
                bytes: b"fake image bytes",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(response).await["message"], "Stakeholder not found");
    assert_eq!(app.stored_upload_count(), 0);

    let response = app
        .multipart(
            Method::POST,
            "/api/routines/schedules",
            &[("stakeholder_id", &stakeholder_id.to_string()), ("pickup_date", "2025-03-15")],
            None,
        )
        .await;
    let id = response_json(response).await["id"].as_i64().unwrap();

    let response = app
        .multipart(
            Method::PUT,
            &format!("/api/routines/schedules/{id}"),
            &[("stakeholder_id", "9999")],
            Some(FilePart {
                field: "proof_file",
                file_name: "bukti.jpg",
                bytes: b"fake image bytes",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.stored_upload_count(), 0);
}

#[tokio::test]
async fn test_deleting_stakeholder_removes_its_schedules() {
    let app = TestApp::new().await;
    let id = app.create_stakeholder("Desa A", "Jakarta", 50).await;
    app.create_stakeholder("Desa B", "Bandung", 30).await;
    app.post_json(
        "/api/routines/schedules/generate",
        json!({ "month": 1, "year": 2025 }),
        StatusCode::CREATED,
    )
    .await;

    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/routines/stakeholders/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let rows = app.get_json("/api/routines/schedules?year=2025").await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["stakeholder"]["institution_name"], "Desa B");
}

#[tokio::test]
async fn test_bulk_status_and_bulk_delete() {
    let app = TestApp::new().await;
    app.create_stakeholder("Desa A", "Jakarta", 50).await;
    app.create_stakeholder("Desa B", "Bandung", 30).await;
    app.post_json(
        "/api/routines/schedules/generate",
        json!({ "month": 2, "year": 2025 }),
        StatusCode::CREATED,
    )
    .await;

    let rows = app.get_json("/api/routines/schedules").await;
    let ids: Vec<i64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/routines/schedules/bulk-status",
            Some(json!({ "ids": [ids[0], 424242], "status": "completed" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let rows = app.get_json("/api/routines/schedules?status=completed").await;
    assert!(rows.as_array().unwrap().is_empty());

    let body = app
        .post_json(
            "/api/routines/schedules/bulk-status",
            json!({ "ids": ids, "status": "completed" }),
            StatusCode::OK,
        )
        .await;
    assert_eq!(body["affected"], 2);

    let body = app
        .post_json(
            "/api/routines/schedules/bulk-delete",
            json!({ "ids": [ids[0]] }),
            StatusCode::OK,
        )
        .await;
    assert_eq!(body["affected"], 1);
    assert_eq!(app.get_json("/api/routines/schedules").await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_roster_analytics_and_exports() {
    let app = TestApp::new().await;
    app.create_stakeholder("Desa A", "Jakarta", 50).await;
    app.create_stakeholder("Desa, B", "Bandung", 30).await;
    app.post_json(
        "/api/routines/schedules/generate",
        json!({ "month": 3, "year": 2025 }),
        StatusCode::CREATED,
    )
    .await;

    let roster = app.get_json("/api/routines/schedules/by-stakeholder?year=2025").await;
    let roster = roster.as_array().unwrap();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0]["institution_name"], "Desa A");
    assert_eq!(roster[0]["schedules"].as_array().unwrap().len(), 1);

    let analytics = app.get_json("/api/routines/analytics?year=2025").await;
    assert_eq!(analytics["total_schedules"], 2);
    assert_eq!(analytics["scheduled"], 2);
    assert_eq!(analytics["total_quantity"], 80);
    assert_eq!(analytics["completion_rate"], 0);
    assert_eq!(analytics["unique_branches"], 2);
    assert_eq!(analytics["unique_stakeholders"], 2);

    let response = app
        .request_authenticated(Method::GET, "/api/routines/export.csv?year=2025", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let csv = response_text(response).await;
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("No,Institution,Branch,Quantity,Jan,"));
    assert!(lines[1].starts_with("1,Desa A,Jakarta,50,-,-,2025-03-15,"));
    assert!(lines[2].starts_with("2,\"Desa, B\",Bandung,30,"));

    let response = app
        .request_authenticated(Method::GET, "/api/routines/print?year=2025", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response_text(response).await;
    assert!(html.contains("Desa A"));
}
