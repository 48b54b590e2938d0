//! Integration tests for the FindIt backend.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::auth::hash_password;
use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::search::SearchIndex;
use crate::{create_router, AppState, DEMO_PASSWORD};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let index_path = temp_dir.path().join("index");

        // Initialize database with the demo seeds
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool.clone()));
        repo.seed_defaults(&hash_password(DEMO_PASSWORD))
            .await
            .expect("Failed to seed");

        // Initialize search index
        let search = Arc::new(SearchIndex::open(&index_path).expect("Failed to init search"));
        let items = repo.list_found_items().await.expect("Failed to list items");
        search.rebuild(&items).await.expect("Failed to rebuild index");

        // Millisecond scan cadence so claims resolve immediately
        let config = Config {
            db_path,
            index_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            scan_tick: Duration::from_millis(1),
            scan_success_delay: Duration::from_millis(1),
        };

        let state = AppState {
            repo,
            search,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            pool,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in and return the session token.
    async fn login(&self, email: &str, password: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "login failed for {}", email);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Register a fresh student account and return the session token.
    async fn register_student(&self, email: &str, name: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "email": email,
                "password": "hunter2!",
                "name": name,
                "role": "student"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "registration failed for {}", email);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_login_demo_student() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "email": "student@example.com", "password": "password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["name"], "John Doe");
    assert_eq!(body["data"]["user"]["role"], "student");
    assert_eq!(body["data"]["user"]["roomNumber"], "A-101");
    assert_eq!(body["data"]["user"]["greenPoints"], 25);
    assert!(body["data"]["token"].as_str().unwrap().len() > 10);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "email": "student@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // Unknown email gets the same answer
    let resp2 = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp2.status(), 401);
}

#[tokio::test]
async fn test_register_session_round_trip() {
    let fixture = TestFixture::new().await;

    let token = fixture
        .register_student("newcomer@example.com", "Nina Rao")
        .await;

    // A fresh student starts with the default room and zero points
    let me_resp = fixture
        .client
        .get(fixture.url("/api/auth/me"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(me_resp.status(), 200);
    let me_body: Value = me_resp.json().await.unwrap();
    assert_eq!(me_body["data"]["roomNumber"], "A-101");
    assert_eq!(me_body["data"]["greenPoints"], 0);

    // Logout tears the session down
    let logout_resp = fixture
        .client
        .post(fixture.url("/api/auth/logout"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(logout_resp.status(), 200);

    let stale_resp = fixture
        .client
        .get(fixture.url("/api/auth/me"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(stale_resp.status(), 401);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/register"))
        .json(&json!({
            "email": "student@example.com",
            "password": "whatever",
            "name": "Impostor",
            "role": "student"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/register"))
        .json(&json!({
            "email": "not-an-email",
            "password": "pw",
            "name": "X",
            "role": "student"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_found_items_browse_all() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/found-items"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_found_items_filter_library_notebook() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/found-items?search=notebook&location=Library"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Blue Notebook");

    // Location alone narrows to the same record
    let resp2 = fixture
        .client
        .get(fixture.url("/api/found-items?location=Library"))
        .send()
        .await
        .unwrap();
    let body2: Value = resp2.json().await.unwrap();
    assert_eq!(body2["data"].as_array().unwrap().len(), 1);

    // A term matching nothing returns an empty set
    let resp3 = fixture
        .client
        .get(fixture.url("/api/found-items?search=notebook&location=Dining%20Hall"))
        .send()
        .await
        .unwrap();
    let body3: Value = resp3.json().await.unwrap();
    assert_eq!(body3["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_claim_requires_auth() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/found-items/1/claim"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_claim_without_matching_report() {
    let fixture = TestFixture::new().await;
    let token = fixture.login("student@example.com", "password").await;

    // Item "2" (Silver Watch) passes verification; no open report matches it
    let resp = fixture
        .client
        .post(fixture.url("/api/found-items/2/claim"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["verified"], true);
    assert_eq!(body["data"]["pointsAwarded"], 0);
    assert!(body["data"]["matchedLostItemId"].is_null());
    assert_eq!(body["data"]["item"]["status"], "claimed");
    assert!(body["data"]["item"]["claimedAt"].is_string());

    // The student balance is untouched without a matching report
    let me: Value = fixture
        .client
        .get(fixture.url("/api/auth/me"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["data"]["greenPoints"], 25);

    // Claimed items disappear from the browse list
    let browse: Value = fixture
        .client
        .get(fixture.url("/api/found-items"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(browse["data"].as_array().unwrap().len(), 3);

    // A second claim on the same item is a conflict
    let again = fixture
        .client
        .post(fixture.url("/api/found-items/2/claim"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 409);
    let again_body: Value = again.json().await.unwrap();
    assert_eq!(again_body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_claim_with_matching_report_awards_points() {
    let fixture = TestFixture::new().await;
    let token = fixture
        .register_student("claimant@example.com", "Omar Haddad")
        .await;

    // Reporting earns 5 points; the name match is case-insensitive
    let report_resp = fixture
        .client
        .post(fixture.url("/api/lost-items"))
        .header("x-session-token", &token)
        .json(&json!({
            "name": "blue notebook",
            "description": "Spiral bound, organic chemistry notes inside",
            "location": "Library",
            "dateLost": "2024-05-01T10:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(report_resp.status(), 200);
    let report_body: Value = report_resp.json().await.unwrap();
    assert_eq!(report_body["data"]["pointsAwarded"], 5);
    assert_eq!(report_body["data"]["report"]["status"], "not_found");
    let report_id = report_body["data"]["report"]["id"].as_str().unwrap().to_string();

    // Claim the seeded "Blue Notebook"; the open report closes and recovery
    // points land on top of the report points
    let claim_resp = fixture
        .client
        .post(fixture.url("/api/found-items/1/claim"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(claim_resp.status(), 200);
    let claim_body: Value = claim_resp.json().await.unwrap();
    assert_eq!(claim_body["data"]["verified"], true);
    assert_eq!(claim_body["data"]["matchedLostItemId"], report_id.as_str());
    assert_eq!(claim_body["data"]["pointsAwarded"], 15);

    let me: Value = fixture
        .client
        .get(fixture.url("/api/auth/me"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["data"]["greenPoints"], 20);

    let report: Value = fixture
        .client
        .get(fixture.url(&format!("/api/lost-items/{}", report_id)))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["data"]["status"], "claimed");
}

#[tokio::test]
async fn test_claim_no_cross_match_for_other_users_report() {
    let fixture = TestFixture::new().await;

    // One student reports a notebook...
    let reporter = fixture
        .register_student("reporter@example.com", "Lena Fischer")
        .await;
    let report_body: Value = fixture
        .client
        .post(fixture.url("/api/lost-items"))
        .header("x-session-token", &reporter)
        .json(&json!({
            "name": "Blue Notebook",
            "description": "Mine, definitely",
            "location": "Library",
            "dateLost": "2024-05-01T10:00:00Z"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let report_id = report_body["data"]["report"]["id"].as_str().unwrap().to_string();

    // ...but a different student claims the found one
    let claimant = fixture.login("student@example.com", "password").await;
    let claim_body: Value = fixture
        .client
        .post(fixture.url("/api/found-items/1/claim"))
        .header("x-session-token", &claimant)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(claim_body["data"]["verified"], true);
    assert!(claim_body["data"]["matchedLostItemId"].is_null());
    assert_eq!(claim_body["data"]["pointsAwarded"], 0);

    // The other student's report stays open
    let report: Value = fixture
        .client
        .get(fixture.url(&format!("/api/lost-items/{}", report_id)))
        .header("x-session-token", &reporter)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["data"]["status"], "not_found");
}

#[tokio::test]
async fn test_claim_verification_failure_is_retryable() {
    let fixture = TestFixture::new().await;

    // "+" has character code 43; 43 % 10 == 3, so its scan always fails
    sqlx::query(
        r#"INSERT INTO found_items (id, name, description, location, date_found, image_url, status, staff_id, staff_name)
           VALUES ('+', 'Lost Keys', 'A ring of three keys', 'Cafeteria', '2024-05-01T10:00:00Z', '', 'available', '2', 'Jane Smith')"#,
    )
    .execute(&fixture.pool)
    .await
    .unwrap();

    let token = fixture.login("student@example.com", "password").await;

    for _ in 0..2 {
        let resp = fixture
            .client
            .post(fixture.url("/api/found-items/+/claim"))
            .header("x-session-token", &token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["verified"], false);
        assert_eq!(body["data"]["pointsAwarded"], 0);
    }

    // The item is still available after failed scans
    let item: Value = fixture
        .client
        .get(fixture.url("/api/found-items/+"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["data"]["status"], "available");
}

#[tokio::test]
async fn test_claim_nonexistent_item() {
    let fixture = TestFixture::new().await;
    let token = fixture.login("student@example.com", "password").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/found-items/no-such-item/claim"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_report_lost_item_staff_earns_no_points() {
    let fixture = TestFixture::new().await;
    let token = fixture.login("staff@example.com", "password").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/lost-items"))
        .header("x-session-token", &token)
        .json(&json!({
            "name": "Clipboard",
            "description": "Grey clipboard with attendance sheets",
            "location": "Lecture Hall",
            "dateLost": "2024-05-02T09:00:00Z"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["pointsAwarded"], 0);
}

#[tokio::test]
async fn test_report_lost_item_validation() {
    let fixture = TestFixture::new().await;
    let token = fixture.login("student@example.com", "password").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/lost-items"))
        .header("x-session-token", &token)
        .json(&json!({
            "name": "",
            "description": "no name given",
            "location": "Library",
            "dateLost": "2024-05-01T10:00:00Z"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_lost_items_visibility() {
    let fixture = TestFixture::new().await;

    let student = fixture
        .register_student("visibility@example.com", "Maya Osei")
        .await;
    fixture
        .client
        .post(fixture.url("/api/lost-items"))
        .header("x-session-token", &student)
        .json(&json!({
            "name": "Umbrella",
            "description": "Black umbrella with wooden handle",
            "location": "Hostel Block A",
            "dateLost": "2024-05-03T10:00:00Z"
        }))
        .send()
        .await
        .unwrap();

    // The reporting student sees exactly their own report
    let mine: Value = fixture
        .client
        .get(fixture.url("/api/lost-items"))
        .header("x-session-token", &student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine["data"].as_array().unwrap().len(), 1);

    // Another student sees none of it
    let other = fixture.login("student@example.com", "password").await;
    let others: Value = fixture
        .client
        .get(fixture.url("/api/lost-items"))
        .header("x-session-token", &other)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(others["data"].as_array().unwrap().len(), 0);

    // Staff see everything
    let staff = fixture.login("staff@example.com", "password").await;
    let all: Value = fixture
        .client
        .get(fixture.url("/api/lost-items"))
        .header("x-session-token", &staff)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_lost_status_transitions_are_one_way() {
    let fixture = TestFixture::new().await;

    let student = fixture
        .register_student("oneway@example.com", "Ben Clarke")
        .await;
    let report_body: Value = fixture
        .client
        .post(fixture.url("/api/lost-items"))
        .header("x-session-token", &student)
        .json(&json!({
            "name": "Headphones",
            "description": "Black over-ear headphones",
            "location": "Study Room",
            "dateLost": "2024-05-06T10:00:00Z"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let report_id = report_body["data"]["report"]["id"].as_str().unwrap().to_string();

    let staff = fixture.login("staff@example.com", "password").await;

    // Students cannot move report statuses
    let denied = fixture
        .client
        .put(fixture.url(&format!("/api/lost-items/{}/status", report_id)))
        .header("x-session-token", &student)
        .json(&json!({ "status": "matched" }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 403);

    // Staff advance not_found -> matched
    let matched = fixture
        .client
        .put(fixture.url(&format!("/api/lost-items/{}/status", report_id)))
        .header("x-session-token", &staff)
        .json(&json!({ "status": "matched" }))
        .send()
        .await
        .unwrap();
    assert_eq!(matched.status(), 200);
    let matched_body: Value = matched.json().await.unwrap();
    assert_eq!(matched_body["data"]["status"], "matched");

    // Going backwards is a conflict
    let backwards = fixture
        .client
        .put(fixture.url(&format!("/api/lost-items/{}/status", report_id)))
        .header("x-session-token", &staff)
        .json(&json!({ "status": "not_found" }))
        .send()
        .await
        .unwrap();
    assert_eq!(backwards.status(), 409);

    // matched -> claimed is fine, and claimed is absorbing
    let claimed = fixture
        .client
        .put(fixture.url(&format!("/api/lost-items/{}/status", report_id)))
        .header("x-session-token", &staff)
        .json(&json!({ "status": "claimed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(claimed.status(), 200);

    let stuck = fixture
        .client
        .put(fixture.url(&format!("/api/lost-items/{}/status", report_id)))
        .header("x-session-token", &staff)
        .json(&json!({ "status": "matched" }))
        .send()
        .await
        .unwrap();
    assert_eq!(stuck.status(), 409);
}

#[tokio::test]
async fn test_staff_logs_found_item() {
    let fixture = TestFixture::new().await;
    let staff = fixture.login("staff@example.com", "password").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/found-items"))
        .header("x-session-token", &staff)
        .json(&json!({
            "name": "Red Scarf",
            "description": "Wool scarf, dark red",
            "location": "Cafeteria",
            "dateFound": "2024-05-04T08:00:00Z",
            "imageUrl": "https://example.com/scarf.jpg"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "available");
    assert_eq!(body["data"]["staffName"], "Jane Smith");

    // Students are rejected by the role gate
    let student = fixture.login("student@example.com", "password").await;
    let denied = fixture
        .client
        .post(fixture.url("/api/found-items"))
        .header("x-session-token", &student)
        .json(&json!({
            "name": "Sneaky Item",
            "description": "Should not be allowed",
            "location": "Library",
            "dateFound": "2024-05-04T08:00:00Z",
            "imageUrl": ""
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 403);
}

#[tokio::test]
async fn test_marketplace_browse_and_filters() {
    let fixture = TestFixture::new().await;

    let all: Value = fixture
        .client
        .get(fixture.url("/api/marketplace/listings"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["data"].as_array().unwrap().len(), 6);

    let clothing: Value = fixture
        .client
        .get(fixture.url("/api/marketplace/listings?category=Clothing"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(clothing["data"].as_array().unwrap().len(), 2);

    let donations: Value = fixture
        .client
        .get(fixture.url("/api/marketplace/listings?kind=donate"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let donated = donations["data"].as_array().unwrap();
    assert_eq!(donated.len(), 1);
    assert_eq!(donated[0]["title"], "Chemistry Lab Coat");
}

#[tokio::test]
async fn test_marketplace_listing_submission() {
    let fixture = TestFixture::new().await;
    let token = fixture.login("student@example.com", "password").await;

    // A valid listing is acknowledged but not added to the catalog
    let resp = fixture
        .client
        .post(fixture.url("/api/marketplace/listings"))
        .header("x-session-token", &token)
        .json(&json!({
            "title": "Graphing Calculator",
            "description": "TI-84, lightly used",
            "category": "Electronics",
            "condition": "Good",
            "price": 900,
            "kind": "sell",
            "imageUrls": ["https://example.com/ti84.jpg"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Graphing Calculator");

    let catalog: Value = fixture
        .client
        .get(fixture.url("/api/marketplace/listings"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog["data"].as_array().unwrap().len(), 6);

    // Selling without a price is invalid
    let no_price = fixture
        .client
        .post(fixture.url("/api/marketplace/listings"))
        .header("x-session-token", &token)
        .json(&json!({
            "title": "Mystery Box",
            "description": "Contents unknown",
            "category": "Other",
            "condition": "Fair",
            "kind": "sell",
            "imageUrls": ["https://example.com/box.jpg"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_price.status(), 400);

    // At least one image is required
    let no_images = fixture
        .client
        .post(fixture.url("/api/marketplace/listings"))
        .header("x-session-token", &token)
        .json(&json!({
            "title": "Invisible Chair",
            "description": "No photos",
            "category": "Furniture",
            "condition": "Good",
            "price": 100,
            "kind": "sell",
            "imageUrls": []
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_images.status(), 400);
}

#[tokio::test]
async fn test_services_providers_and_booking() {
    let fixture = TestFixture::new().await;

    let all: Value = fixture
        .client
        .get(fixture.url("/api/services/providers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["data"].as_array().unwrap().len(), 5);

    let plumbing: Value = fixture
        .client
        .get(fixture.url("/api/services/providers?category=Plumbing"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let plumbers = plumbing["data"].as_array().unwrap();
    assert_eq!(plumbers.len(), 1);
    assert_eq!(plumbers[0]["name"], "Rajesh Kumar");

    let token = fixture.login("student@example.com", "password").await;

    let booked = fixture
        .client
        .post(fixture.url("/api/services/bookings"))
        .header("x-session-token", &token)
        .json(&json!({
            "providerId": "2",
            "date": "2024-05-10",
            "time": "14:00",
            "description": "Desk lamp socket is sparking",
            "location": "A-101"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(booked.status(), 200);
    let booked_body: Value = booked.json().await.unwrap();
    assert_eq!(booked_body["data"]["providerName"], "Anita Sharma");

    // Unknown providers are rejected
    let unknown = fixture
        .client
        .post(fixture.url("/api/services/bookings"))
        .header("x-session-token", &token)
        .json(&json!({
            "providerId": "99",
            "date": "2024-05-10",
            "time": "14:00",
            "description": "Anything",
            "location": "A-101"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 404);
}

#[tokio::test]
async fn test_search_endpoint() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/search?q=notebook&limit=10"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let results = body["data"]["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0]["item"]["name"], "Blue Notebook");
    assert!(results[0]["score"].as_f64().unwrap() > 0.0);

    // Claimed items drop out of the index
    let token = fixture.login("student@example.com", "password").await;
    fixture
        .client
        .post(fixture.url("/api/found-items/1/claim"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();

    let after: Value = fixture
        .client
        .get(fixture.url("/api/search?q=notebook&limit=10"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(after["data"]["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_datastore_is_admin_only() {
    let fixture = TestFixture::new().await;

    let student = fixture.login("student@example.com", "password").await;
    let denied = fixture
        .client
        .get(fixture.url("/api/datastore"))
        .header("x-session-token", &student)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 403);

    let admin = fixture.login("admin@example.com", "password").await;
    let resp = fixture
        .client
        .get(fixture.url("/api/datastore"))
        .header("x-session-token", &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["foundItems"].as_array().unwrap().len(), 4);
    assert!(body["data"]["schemaVersion"].is_number());
    // Credential digests never leave the store
    assert!(body["data"]["users"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_revision_increments_on_writes() {
    let fixture = TestFixture::new().await;
    let staff = fixture.login("staff@example.com", "password").await;

    let initial: Value = fixture
        .client
        .get(fixture.url("/api/datastore/revision"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let initial_revision = initial["data"]["revisionId"].as_i64().unwrap();

    // A staff report increments the revision exactly once (no point award)
    let report: Value = fixture
        .client
        .post(fixture.url("/api/lost-items"))
        .header("x-session-token", &staff)
        .json(&json!({
            "name": "Stapler",
            "description": "Red swingline",
            "location": "Lecture Hall",
            "dateLost": "2024-05-05T09:00:00Z"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["revisionId"].as_i64().unwrap(), initial_revision + 1);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/found-items/non-existent-id"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let token = fixture.login("student@example.com", "password").await;
    let resp2 = fixture
        .client
        .get(fixture.url("/api/lost-items/non-existent-id"))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp2.status(), 404);
}
