//! End-to-end item lifecycle against a real PostgreSQL.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p itemctl-server -- --ignored
//!
//! Each test works in its own throwaway schema so tests can run in parallel
//! and the empty-table checks hold.

use std::str::FromStr;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tower::ServiceExt;

use itemctl_server::db::migrations;
use itemctl_server::{build_router, AppState, ItemPatch, ItemRepo, NewItem};

struct TestDb {
    pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl TestDb {
    async fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let admin = itemctl_server::create_pool(&url)
            .await
            .expect("pool creation failed");

        let schema = format!("itemctl_test_{}", uuid::Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .expect("create schema");

        let options = PgConnectOptions::from_str(&url)
            .expect("valid DATABASE_URL")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .expect("scoped pool");

        migrations::run(&pool).await.expect("migrations");
        Self { pool, admin, schema }
    }

    fn app(&self) -> Router {
        build_router(AppState {
            pool: self.pool.clone(),
        })
    }

    async fn drop_schema(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .expect("drop schema");
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn widget() -> NewItem {
    NewItem {
        name: "Widget".into(),
        description: None,
        price: 9.99,
        category: "tools".into(),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn item_lifecycle_over_http() {
    let db = TestDb::new().await;
    let app = db.app();

    let (status, body) = send(&app, Method::GET, "/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, created) = send(
        &app,
        Method::POST,
        "/items",
        Some(json!({"name": "Widget", "price": 9.99, "category": "tools"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().expect("id").to_owned();
    assert!(!id.is_empty());
    assert!(created["description"].is_null());

    let (status, fetched) = send(&app, Method::GET, &format!("/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/items/{id}"),
        Some(json!({"price": 12.5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 12.5);
    assert_eq!(updated["name"], "Widget");
    assert_eq!(updated["category"], "tools");
    assert_eq!(updated["id"], id.as_str());

    let (status, listed) = send(&app, Method::GET, "/items/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([updated]));

    let (status, body) = send(&app, Method::DELETE, &format!("/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"detail": "Item deleted"}));

    let (status, body) = send(&app, Method::GET, &format!("/items/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Item not found"}));

    db.drop_schema().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn unknown_id_is_404_everywhere() {
    let db = TestDb::new().await;
    let app = db.app();
    let not_found = json!({"detail": "Item not found"});

    let (status, body) = send(&app, Method::GET, "/items/never-inserted", None).await;
    assert_eq!((status, body), (StatusCode::NOT_FOUND, not_found.clone()));

    let (status, body) = send(
        &app,
        Method::PUT,
        "/items/never-inserted",
        Some(json!({"name": "x"})),
    )
    .await;
    assert_eq!((status, body), (StatusCode::NOT_FOUND, not_found.clone()));

    let (status, body) = send(&app, Method::DELETE, "/items/never-inserted", None).await;
    assert_eq!((status, body), (StatusCode::NOT_FOUND, not_found));

    db.drop_schema().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn inserted_ids_are_unique() {
    let db = TestDb::new().await;
    let repo = ItemRepo::new(&db.pool);

    let mut ids = std::collections::HashSet::new();
    for _ in 0..20 {
        let item = repo.insert(widget()).await.expect("insert");
        assert!(!item.id.is_empty());
        assert!(ids.insert(item.id), "duplicate id");
    }
    assert_eq!(repo.list().await.expect("list").len(), 20);

    db.drop_schema().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn repo_update_and_delete_signal_absence() {
    let db = TestDb::new().await;
    let repo = ItemRepo::new(&db.pool);

    let mut new = widget();
    new.description = Some("small".into());
    let item = repo.insert(new).await.expect("insert");
    assert_eq!(repo.get(&item.id).await.expect("get"), Some(item.clone()));

    let patch = ItemPatch {
        description: Some(None),
        ..ItemPatch::default()
    };
    let updated = repo
        .update(&item.id, patch)
        .await
        .expect("update")
        .expect("present");
    assert_eq!(updated.description, None);
    assert_eq!(updated.name, item.name);
    assert_eq!(updated.price, item.price);

    let unchanged = repo
        .update(&item.id, ItemPatch::default())
        .await
        .expect("empty update")
        .expect("present");
    assert_eq!(unchanged, updated);

    assert!(repo.delete(&item.id).await.expect("delete"));
    assert!(!repo.delete(&item.id).await.expect("second delete"));
    assert_eq!(repo.get(&item.id).await.expect("get"), None);
    assert_eq!(
        repo.update(&item.id, ItemPatch::default()).await.expect("update"),
        None
    );

    db.drop_schema().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn migrations_are_idempotent() {
    let db = TestDb::new().await;
    migrations::run(&db.pool).await.expect("second run");
    db.drop_schema().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires database"]
async fn concurrent_disjoint_updates_both_survive() {
    let db = TestDb::new().await;

    for round in 0..50 {
        let item = ItemRepo::new(&db.pool)
            .insert(widget())
            .await
            .expect("insert");

        let rename = {
            let pool = db.pool.clone();
            let id = item.id.clone();
            tokio::spawn(async move {
                let patch = ItemPatch {
                    name: Some("Renamed".into()),
                    ..ItemPatch::default()
                };
                ItemRepo::new(&pool).update(&id, patch).await
            })
        };
        let reprice = {
            let pool = db.pool.clone();
            let id = item.id.clone();
            tokio::spawn(async move {
                let patch = ItemPatch {
                    price: Some(2.0),
                    ..ItemPatch::default()
                };
                ItemRepo::new(&pool).update(&id, patch).await
            })
        };

        rename.await.expect("task").expect("rename").expect("present");
        reprice.await.expect("task").expect("reprice").expect("present");

        let stored = ItemRepo::new(&db.pool)
            .get(&item.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored.name, "Renamed", "round {round}: name lost");
        assert_eq!(stored.price, 2.0, "round {round}: price lost");
        assert_eq!(stored.category, "tools");
    }

    db.drop_schema().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn client_supplied_ids_are_ignored() {
    let db = TestDb::new().await;
    let app = db.app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/items",
        Some(json!({"id": "mine", "name": "Widget", "price": 9.99, "category": "tools"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().expect("id").to_owned();
    assert_ne!(id, "mine");

    let (status, _) = send(&app, Method::GET, "/items/mine", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/items/{id}"),
        Some(json!({"id": "other", "price": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["price"], 1.0);

    let (status, body) = send(&app, Method::GET, "/items/other", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Item not found"}));

    let (status, fetched) = send(&app, Method::GET, &format!("/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    db.drop_schema().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn health_reports_reachable_database() {
    let db = TestDb::new().await;

    let (status, body) = send(&db.app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");

    db.drop_schema().await;
}
