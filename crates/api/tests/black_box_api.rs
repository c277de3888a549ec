use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use ausbau_api::app::{AppServices, build_app};
use ausbau_auth::{Guard, JwtClaims};

const JWT_SECRET: &str = "black-box-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(JWT_SECRET.to_string(), AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn client() -> reqwest::Client {
    // Redirects stay visible so guard-exclusivity can be asserted.
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn mint_jwt(guard: Guard, sub: Uuid) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub,
        guard,
        issued_at: now - ChronoDuration::seconds(5),
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn admin_token() -> String {
    mint_jwt(Guard::Admin, Uuid::now_v7())
}

async fn post_json(
    client: &reqwest::Client,
    url: String,
    token: &str,
    body: Value,
) -> (StatusCode, Value) {
    let res = client
        .post(url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    let body: Value = res.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Seed a customer account via the admin surface and hand back its token.
async fn seeded_customer(server: &TestServer, client: &reqwest::Client, email: &str) -> (String, String) {
    let (status, body) = post_json(
        client,
        format!("{}/admin/customers", server.base_url),
        &admin_token(),
        json!({ "name": "Miriam Vogt", "email": email }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["id"].as_str().unwrap().to_string();
    let token = mint_jwt(Guard::Customer, id.parse().unwrap());
    (id, token)
}

/// Seed a category + item (50.00) + variation (10.00) via the admin surface.
async fn seeded_catalog(server: &TestServer, client: &reqwest::Client) -> (String, String) {
    let admin = admin_token();

    let (status, category) = post_json(
        client,
        format!("{}/admin/categories", server.base_url),
        &admin,
        json!({ "name": "Flooring", "scope": "room", "sort_order": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, item) = post_json(
        client,
        format!("{}/admin/items", server.base_url),
        &admin,
        json!({
            "category_id": category["id"],
            "name": "Oak parquet",
            "additional_cost_cents": 5000,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = item["id"].as_str().unwrap().to_string();

    let (status, variation) = post_json(
        client,
        format!("{}/admin/items/{}/variations", server.base_url, item_id),
        &admin,
        json!({ "name": "Brushed", "surcharge_cents": 1000 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let variation_id = variation["id"].as_str().unwrap().to_string();

    (item_id, variation_id)
}

#[tokio::test]
async fn full_configuration_lifecycle() {
    let server = TestServer::spawn().await;
    let client = client();
    let (_customer_id, customer) = seeded_customer(&server, &client, "miriam@example.com").await;
    let (item_id, variation_id) = seeded_catalog(&server, &client).await;

    // Project with a room.
    let (status, project) = post_json(
        &client,
        format!("{}/projects", server.base_url),
        &customer,
        json!({ "name": "Birkenweg 12", "facade_area_sqm": 182.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = project["id"].as_str().unwrap().to_string();

    let (status, room) = post_json(
        &client,
        format!("{}/projects/{}/rooms", server.base_url, project_id),
        &customer,
        json!({ "name": "Living room" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let room_id = room["id"].as_str().unwrap().to_string();

    // Wizard lists the seeded catalog.
    let res = client
        .get(format!("{}/projects/{}/catalog", server.base_url, project_id))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let wizard: Value = res.json().await.unwrap();
    assert_eq!(wizard["categories"][0]["items"][0]["name"], "Oak parquet");

    // Fresh configuration.
    let (status, config) = post_json(
        &client,
        format!("{}/projects/{}/configurations", server.base_url, project_id),
        &customer,
        json!({ "name": "Ground floor" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let config_id = config["id"].as_str().unwrap().to_string();
    assert_eq!(config["is_locked"], json!(false));

    // Replace-all items: (50.00 + 10.00) * 2 = 120.00.
    let res = client
        .put(format!(
            "{}/projects/{}/configurations/{}/items",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .json(&json!({
            "name": "Ground floor",
            "last_position": "step-3",
            "items": [{
                "item_id": item_id,
                "item_variation_id": variation_id,
                "quantity": 2,
                "project_room_id": room_id,
            }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let view: Value = res.json().await.unwrap();
    assert_eq!(view["total_cents"], json!(12000));
    assert_eq!(view["total"], json!("120.00"));
    assert_eq!(view["lines"][0]["location"], json!("Living room"));
    assert_eq!(view["configuration"]["last_position"], json!("step-3"));

    // Lock; locking twice is a no-op success.
    for _ in 0..2 {
        let res = client
            .post(format!(
                "{}/projects/{}/configurations/{}/lock",
                server.base_url, project_id, config_id
            ))
            .bearer_auth(&customer)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let locked: Value = res.json().await.unwrap();
        assert_eq!(locked["is_locked"], json!(true));
        assert_eq!(locked["is_completed"], json!(true));
    }

    // Mutation after lock is rejected and changes nothing.
    let res = client
        .put(format!(
            "{}/projects/{}/configurations/{}/items",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .json(&json!({ "name": "Ground floor", "items": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], json!("locked"));

    let res = client
        .delete(format!(
            "{}/projects/{}/configurations/{}",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!(
            "{}/projects/{}/configurations/{}",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    let view: Value = res.json().await.unwrap();
    assert_eq!(view["lines"].as_array().unwrap().len(), 1);
    assert_eq!(view["total_cents"], json!(12000));

    // Copy forks an unlocked draft with identical items.
    let res = client
        .post(format!(
            "{}/projects/{}/configurations/{}/copy",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let copy: Value = res.json().await.unwrap();
    assert_eq!(copy["name"], json!("Ground floor (Copy)"));
    assert_eq!(copy["is_locked"], json!(false));
    let copy_id = copy["id"].as_str().unwrap();

    let res = client
        .get(format!(
            "{}/projects/{}/configurations/{}",
            server.base_url, project_id, copy_id
        ))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    let copy_view: Value = res.json().await.unwrap();
    assert_eq!(copy_view["total_cents"], json!(12000));
    assert_eq!(
        copy_view["lines"][0]["entry"]["item_id"],
        view["lines"][0]["entry"]["item_id"]
    );
    assert_eq!(
        copy_view["lines"][0]["entry"]["quantity"],
        view["lines"][0]["entry"]["quantity"]
    );

    // Export works on the locked original.
    let res = client
        .get(format!(
            "{}/projects/{}/configurations/{}/export",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let bytes = res.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn foreign_customers_are_denied() {
    let server = TestServer::spawn().await;
    let client = client();
    let (_a_id, customer_a) = seeded_customer(&server, &client, "a@example.com").await;
    let (_b_id, customer_b) = seeded_customer(&server, &client, "b@example.com").await;

    let (status, project) = post_json(
        &client,
        format!("{}/projects", server.base_url),
        &customer_a,
        json!({ "name": "Birkenweg 12" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = project["id"].as_str().unwrap();

    let res = client
        .get(format!(
            "{}/projects/{}/configurations",
            server.base_url, project_id
        ))
        .bearer_auth(&customer_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], json!("forbidden"));
}

#[tokio::test]
async fn replace_items_is_atomic_against_unknown_items() {
    let server = TestServer::spawn().await;
    let client = client();
    let (_id, customer) = seeded_customer(&server, &client, "c@example.com").await;
    let (item_id, _variation_id) = seeded_catalog(&server, &client).await;

    let (_, project) = post_json(
        &client,
        format!("{}/projects", server.base_url),
        &customer,
        json!({ "name": "Lindenhof 3" }),
    )
    .await;
    let project_id = project["id"].as_str().unwrap();
    let (_, config) = post_json(
        &client,
        format!("{}/projects/{}/configurations", server.base_url, project_id),
        &customer,
        json!({ "name": "Variant A" }),
    )
    .await;
    let config_id = config["id"].as_str().unwrap();

    // Establish a known-good list.
    let res = client
        .put(format!(
            "{}/projects/{}/configurations/{}/items",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .json(&json!({ "name": "Variant A", "items": [{ "item_id": item_id }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // One unknown item in the new list: nothing is deleted, nothing inserted.
    let res = client
        .put(format!(
            "{}/projects/{}/configurations/{}/items",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .json(&json!({
            "name": "Variant A",
            "items": [
                { "item_id": item_id },
                { "item_id": Uuid::now_v7().to_string() },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], json!("validation_error"));
    assert_eq!(err["fields"][0]["field"], json!("items[1].item_id"));
    assert!(err["input"]["items"].is_array());

    let res = client
        .get(format!(
            "{}/projects/{}/configurations/{}",
            server.base_url, project_id, config_id
        ))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    let view: Value = res.json().await.unwrap();
    assert_eq!(view["lines"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn wrong_guard_sessions_are_redirected_home() {
    let server = TestServer::spawn().await;
    let client = client();

    // Admin session on a customer route group → admin home.
    let res = client
        .get(format!("{}/projects", server.base_url))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get("location").unwrap(), "/admin");

    // Customer session on an admin route group → customer home.
    let res = client
        .get(format!("{}/admin/customers", server.base_url))
        .bearer_auth(mint_jwt(Guard::Customer, Uuid::now_v7()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get("location").unwrap(), "/");
}

#[tokio::test]
async fn unknown_customer_accounts_cannot_open_projects() {
    let server = TestServer::spawn().await;
    let client = client();

    let stray = mint_jwt(Guard::Customer, Uuid::now_v7());
    let res = client
        .get(format!("{}/projects", server.base_url))
        .bearer_auth(&stray)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let (status, _) = post_json(
        &client,
        format!("{}/projects", server.base_url),
        &stray,
        json!({ "name": "Birkenweg 12" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let server = TestServer::spawn().await;
    let client = client();

    let res = client
        .get(format!("{}/projects", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Liveness stays public.
    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
