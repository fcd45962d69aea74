use carbon_ledger::{build_app, DeletePolicy, MemoryStore, PostgresStore};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    /// POST that must succeed; returns the created row.
    async fn create(&self, path: &str, json: Value) -> Value {
        let response = self.post(path, json).await.expect("request failed");
        let status = response.status();
        let body: Value = response.json().await.expect("invalid JSON body");
        assert_eq!(status, StatusCode::OK, "POST {} failed: {}", path, body);
        body
    }

    /// GET that must succeed; returns the body.
    async fn fetch(&self, path: &str) -> Value {
        let response = self.get(path).await.expect("request failed");
        let status = response.status();
        let body: Value = response.json().await.expect("invalid JSON body");
        assert_eq!(status, StatusCode::OK, "GET {} failed: {}", path, body);
        body
    }
}

async fn spawn_server(store: MemoryStore) -> TestClient {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("No local address");
    let app = build_app(Arc::new(store));

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    TestClient::new(format!("http://{}", address))
}

fn id_of(row: &Value) -> i64 {
    row["id"].as_i64().expect("row without id")
}

#[tokio::test]
async fn test_acme_dashboard_workflow() {
    let client = spawn_server(MemoryStore::new()).await;

    println!("1. Creating company, branch and emissions source");
    let acme = client.create("/companies", json!({"c_name": "Acme"})).await;
    assert_eq!(acme["c_name"], "Acme");
    let acme_id = id_of(&acme);

    let hq = client
        .create(
            "/branches",
            json!({"branch_name": "HQ", "company_id": acme_id}),
        )
        .await;
    assert_eq!(hq["company_id"], acme_id);
    let hq_id = id_of(&hq);

    let factory = client
        .create(
            "/emissionssource",
            json!({"source_type": "Factory", "total_emission_value": 500.0, "branch_id": hq_id}),
        )
        .await;
    let factory_id = id_of(&factory);

    println!("2. Recording footprint and sequestration");
    client
        .create(
            "/footprint",
            json!({"footprint_value": 20.0, "source_id": factory_id}),
        )
        .await;
    client
        .create(
            "/sequestration",
            json!({"seq_value": 15.0, "source_id": factory_id}),
        )
        .await;

    println!("3. Checking summaries");
    let summary = client.fetch(&format!("/company/{}/summary", acme_id)).await;
    assert_eq!(summary["total_emissions"].as_f64(), Some(500.0));
    assert_eq!(summary["total_sequestrations"].as_f64(), Some(15.0));

    let summary = client.fetch(&format!("/branch/{}/summary", hq_id)).await;
    assert_eq!(summary["total_emissions"].as_f64(), Some(500.0));
    assert_eq!(summary["total_sequestrations"].as_f64(), Some(15.0));

    client.create("/companies", json!({"c_name": "Idle Co"})).await;
    let fleet = client.fetch("/companies/summary").await;
    assert_eq!(fleet["footprints"]["Acme"].as_f64(), Some(20.0));
    assert_eq!(fleet["sequestrations"]["Acme"].as_f64(), Some(15.0));
    assert_eq!(fleet["footprints"]["Idle Co"].as_f64(), Some(0.0));

    println!("4. Navigating the master-detail tree");
    let branches = client
        .fetch(&format!("/companies/{}/branches", acme_id))
        .await;
    assert_eq!(branches.as_array().map(Vec::len), Some(1));

    let sources = client
        .fetch(&format!("/branch/{}/emissionssources", hq_id))
        .await;
    assert_eq!(sources[0]["source_type"], "Factory");

    let footprints = client
        .fetch(&format!("/emissionssource/{}/footprints", factory_id))
        .await;
    assert_eq!(footprints[0]["footprint_value"].as_f64(), Some(20.0));

    let sequestrations = client
        .fetch(&format!("/emissionssource/{}/sequestrations", factory_id))
        .await;
    assert_eq!(sequestrations[0]["seq_value"].as_f64(), Some(15.0));

    println!("✅ Dashboard workflow complete");
}

#[tokio::test]
async fn test_company_name_conflict() {
    let client = spawn_server(MemoryStore::new()).await;

    client.create("/companies", json!({"c_name": "Acme"})).await;
    let response = client
        .post("/companies", json!({"c_name": "Acme"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Company already registered");

    let companies = client.fetch("/companies").await;
    assert_eq!(companies.as_array().map(Vec::len), Some(1));

    // Renaming onto an existing name is refused as well
    let other = client.create("/companies", json!({"c_name": "Globex"})).await;
    let response = client
        .put(&format!("/company/{}", id_of(&other)), json!({"c_name": "Acme"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_companies_listed_in_insertion_order_with_paging() {
    let client = spawn_server(MemoryStore::new()).await;

    for name in ["Zeta", "Alpha", "Mid"] {
        client.create("/companies", json!({"c_name": name})).await;
    }

    let all = client.fetch("/companies").await;
    let names: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["c_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);

    let first = client.fetch("/companies?skip=0&limit=1").await;
    assert_eq!(first.as_array().map(Vec::len), Some(1));
    assert_eq!(first[0]["c_name"], "Zeta");

    let second = client.fetch("/companies?skip=1&limit=1").await;
    assert_eq!(second.as_array().map(Vec::len), Some(1));
    assert_eq!(second[0]["c_name"], "Alpha");

    let response = client.get("/companies?skip=-1").await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let client = spawn_server(MemoryStore::new()).await;

    let company = client.create("/companies", json!({"c_name": "Acme"})).await;
    let branch = client
        .create(
            "/branches",
            json!({"branch_name": "HQ", "company_id": id_of(&company)}),
        )
        .await;
    let source = client
        .create(
            "/emissionssource",
            json!({"source_type": "Factory", "total_emission_value": 120.5, "branch_id": id_of(&branch)}),
        )
        .await;
    let source_path = format!("/emissionssource/{}", id_of(&source));

    let response = client
        .put(&source_path, json!({"total_emission_value": 99.0}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = client.fetch(&source_path).await;
    assert_eq!(stored["source_type"], "Factory");
    assert_eq!(stored["branch_id"], id_of(&branch));
    assert_eq!(stored["total_emission_value"].as_f64(), Some(99.0));

    let offset = client
        .create(
            "/carbon_offset",
            json!({
                "offset_type": "reforestation",
                "offset_amount": 2500,
                "date": "2023-01-01",
                "company_id": id_of(&company),
            }),
        )
        .await;
    let offset_path = format!("/carbon_offset/{}", id_of(&offset));

    client
        .put(&offset_path, json!({"offset_amount": 3000}))
        .await
        .unwrap();
    let stored = client.fetch(&offset_path).await;
    assert_eq!(stored["offset_amount"], 3000);
    assert_eq!(stored["date"], "2023-01-01");
    assert_eq!(stored["offset_type"], "reforestation");

    // An explicit null clears the date
    client.put(&offset_path, json!({"date": null})).await.unwrap();
    let stored = client.fetch(&offset_path).await;
    assert!(stored["date"].is_null());
    assert_eq!(stored["offset_amount"], 3000);
}

#[tokio::test]
async fn test_delete_branch_then_not_found() {
    let client = spawn_server(MemoryStore::new()).await;

    let company = client.create("/companies", json!({"c_name": "Acme"})).await;
    let company_id = id_of(&company);
    let branch = client
        .create(
            "/branches",
            json!({"branch_name": "HQ", "company_id": company_id}),
        )
        .await;
    let branch_path = format!("/branch/{}", id_of(&branch));

    let response = client.delete(&branch_path).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: Value = response.json().await.unwrap();
    assert_eq!(deleted["branch_name"], "HQ");

    let branches = client
        .fetch(&format!("/companies/{}/branches", company_id))
        .await;
    assert_eq!(branches, json!([]));

    let response = client.get(&branch_path).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Branch not found");

    let response = client.delete(&branch_path).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_parents_are_rejected() {
    let client = spawn_server(MemoryStore::new()).await;

    let response = client
        .post("/branches", json!({"branch_name": "HQ", "company_id": 404}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Company not found");

    let response = client
        .post("/footprint", json!({"footprint_value": 1.0, "source_id": 404}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get("/company/404/summary").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get("/branch/404/emissionssources").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_offset_type_is_rejected() {
    let client = spawn_server(MemoryStore::new()).await;
    let company = client.create("/companies", json!({"c_name": "Acme"})).await;

    let response = client
        .post(
            "/carbon_offset",
            json!({"offset_type": "wishful_thinking", "offset_amount": 10, "company_id": id_of(&company)}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());

    let offsets = client
        .fetch(&format!("/companies/{}/carbon_offsets", id_of(&company)))
        .await;
    assert_eq!(offsets, json!([]));
}

#[tokio::test]
async fn test_offset_total() {
    let client = spawn_server(MemoryStore::new()).await;
    let company = client.create("/companies", json!({"c_name": "Acme"})).await;
    let company_id = id_of(&company);

    for (offset_type, amount) in [("reforestation", 1200), ("renewable_energy_projects", 800)] {
        client
            .create(
                "/carbon_offset",
                json!({"offset_type": offset_type, "offset_amount": amount, "company_id": company_id}),
            )
            .await;
    }

    let total = client
        .fetch(&format!("/companies/{}/carbon_offsets/total", company_id))
        .await;
    assert_eq!(
        total,
        json!({"company_id": company_id, "total_offset_amount": 2000})
    );
}

#[tokio::test]
async fn test_offset_total_beyond_i64_range() {
    let client = spawn_server(MemoryStore::new()).await;
    let company = client.create("/companies", json!({"c_name": "Acme"})).await;
    let company_id = id_of(&company);

    for _ in 0..2 {
        client
            .create(
                "/carbon_offset",
                json!({"offset_type": "reforestation", "offset_amount": i64::MAX, "company_id": company_id}),
            )
            .await;
    }

    let total = client
        .fetch(&format!("/companies/{}/carbon_offsets/total", company_id))
        .await;
    assert_eq!(total["total_offset_amount"].as_u64(), Some(i64::MAX as u64 * 2));
}

#[tokio::test]
async fn test_paging_within_a_parent() {
    let client = spawn_server(MemoryStore::new()).await;

    println!("1. Creating two companies with branches");
    let acme = id_of(&client.create("/companies", json!({"c_name": "Acme"})).await);
    let globex = id_of(&client.create("/companies", json!({"c_name": "Globex"})).await);

    let mut acme_branches = Vec::new();
    for (company_id, name) in [
        (acme, "First"),
        (globex, "Elsewhere"),
        (acme, "Second"),
        (acme, "Third"),
    ] {
        let branch = client
            .create(
                "/branches",
                json!({"branch_name": name, "company_id": company_id}),
            )
            .await;
        if company_id == acme {
            acme_branches.push(id_of(&branch));
        }
    }

    println!("2. Paging branches of one company");
    let path = format!("/companies/{}/branches", acme);
    let all = client.fetch(&path).await;
    assert_eq!(all.as_array().map(Vec::len), Some(3));

    let first = client.fetch(&format!("{}?skip=0&limit=1", path)).await;
    assert_eq!(first.as_array().map(Vec::len), Some(1));
    assert_eq!(first[0]["branch_name"], "First");

    let second = client.fetch(&format!("{}?skip=1&limit=1", path)).await;
    assert_eq!(second.as_array().map(Vec::len), Some(1));
    assert_eq!(second[0]["branch_name"], "Second");
    assert_eq!(second[0]["company_id"], acme);

    let past_end = client.fetch(&format!("{}?skip=3&limit=1", path)).await;
    assert_eq!(past_end, json!([]));

    println!("3. Paging emissions sources of one branch");
    let (hq, other) = (acme_branches[0], acme_branches[1]);
    for (branch_id, source_type) in [
        (hq, "Boiler"),
        (other, "Fleet"),
        (hq, "Kiln"),
        (hq, "Generator"),
    ] {
        client
            .create(
                "/emissionssource",
                json!({"source_type": source_type, "total_emission_value": 10.0, "branch_id": branch_id}),
            )
            .await;
    }

    let path = format!("/branch/{}/emissionssources", hq);
    let all = client.fetch(&path).await;
    assert_eq!(all.as_array().map(Vec::len), Some(3));

    let first = client.fetch(&format!("{}?skip=0&limit=1", path)).await;
    assert_eq!(first.as_array().map(Vec::len), Some(1));
    assert_eq!(first[0]["source_type"], "Boiler");

    let second = client.fetch(&format!("{}?skip=1&limit=1", path)).await;
    assert_eq!(second.as_array().map(Vec::len), Some(1));
    assert_eq!(second[0]["source_type"], "Kiln");
    assert_eq!(second[0]["branch_id"], hq);

    println!("✅ Paging stays within the parent");
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found_before_conflict() {
    let client = spawn_server(MemoryStore::new()).await;

    client.create("/companies", json!({"c_name": "Acme"})).await;
    let response = client
        .put("/company/999", json!({"c_name": "Acme"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Company not found");

    client
        .create(
            "/regulations",
            json!({"regulation_name": "EU ETS", "description": "Emissions trading"}),
        )
        .await;
    let response = client
        .put("/regulation/999", json!({"regulation_name": "EU ETS"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Regulation not found");
}

#[tokio::test]
async fn test_regulation_crud() {
    let client = spawn_server(MemoryStore::new()).await;

    let regulation = client
        .create(
            "/regulations",
            json!({"regulation_name": "EU ETS", "description": "Emissions trading"}),
        )
        .await;
    let path = format!("/regulation/{}", id_of(&regulation));

    let response = client
        .post(
            "/regulations",
            json!({"regulation_name": "EU ETS", "description": "again"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    client
        .put(&path, json!({"description": "Cap and trade"}))
        .await
        .unwrap();
    let stored = client.fetch(&path).await;
    assert_eq!(stored["regulation_name"], "EU ETS");
    assert_eq!(stored["description"], "Cap and trade");

    let response = client.delete(&path).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(client.fetch("/regulations").await, json!([]));
}

#[tokio::test]
async fn test_restrict_policy_refuses_delete() {
    let client =
        spawn_server(MemoryStore::new().with_delete_policy(DeletePolicy::Restrict)).await;

    let company = client.create("/companies", json!({"c_name": "Acme"})).await;
    client
        .create(
            "/branches",
            json!({"branch_name": "HQ", "company_id": id_of(&company)}),
        )
        .await;

    let response = client
        .delete(&format!("/company/{}", id_of(&company)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    client
        .fetch(&format!("/company/{}", id_of(&company)))
        .await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database in DATABASE_URL"]
async fn test_postgres_store_round_trip() {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let store = PostgresStore::new(&database_url, 5)
        .await
        .expect("Failed to connect");
    store.migrate().await.expect("Failed to migrate");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = build_app(Arc::new(store));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });
    let client = TestClient::new(format!("http://{}", address));

    // Unique per run so the test can be repeated against the same database
    let name = format!("Integration {}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));
    let company = client.create("/companies", json!({"c_name": name})).await;
    let company_id = id_of(&company);
    let branch = client
        .create(
            "/branches",
            json!({"branch_name": "HQ", "company_id": company_id}),
        )
        .await;
    let annex = client
        .create(
            "/branches",
            json!({"branch_name": "Annex", "company_id": company_id}),
        )
        .await;
    let page = client
        .fetch(&format!("/companies/{}/branches?skip=1&limit=1", company_id))
        .await;
    assert_eq!(page.as_array().map(Vec::len), Some(1));
    assert_eq!(page[0]["id"], id_of(&annex));

    let source = client
        .create(
            "/emissionssource",
            json!({"source_type": "Factory", "total_emission_value": 500.0, "branch_id": id_of(&branch)}),
        )
        .await;
    client
        .create(
            "/sequestration",
            json!({"seq_value": 15.0, "source_id": id_of(&source)}),
        )
        .await;

    let summary = client
        .fetch(&format!("/company/{}/summary", company_id))
        .await;
    assert_eq!(summary["total_emissions"].as_f64(), Some(500.0));
    assert_eq!(summary["total_sequestrations"].as_f64(), Some(15.0));

    let response = client
        .post("/companies", json!({"c_name": name}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .delete(&format!("/company/{}", company_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Orphaned by default: the branch survives with its company cleared
    let orphan = client.fetch(&format!("/branch/{}", id_of(&branch))).await;
    assert!(orphan["company_id"].is_null());
}
