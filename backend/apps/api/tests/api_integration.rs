//! End-to-end tests of the HTTP surface.
//!
//! The router is built exactly as in `main.rs` but over the in-memory
//! stores and a recording mailer, so no database or mail API is needed.

use auth::domain::UserRepository;
use auth::domain::value_object::email::Email;
use auth::{
    AuthAppState, AuthConfig, InMemoryUserRepository, RecordingEmailClient, UserRole,
};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use api::build_router;
use api::config::{AppEnv, HttpConfig};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tours::{InMemoryTourRepository, ToursAppState};
use tower::ServiceExt; // For `oneshot` method

const PASSWORD: &str = "Pass1234!";

struct TestApp {
    router: Router,
    users: InMemoryUserRepository,
    mailer: RecordingEmailClient,
}

fn create_test_app() -> TestApp {
    let users = InMemoryUserRepository::new();
    let mailer = RecordingEmailClient::new();
    let http = HttpConfig {
        env: AppEnv::Test,
        body_limit: 10 * 1024,
        frontend_origins: vec!["http://localhost:3000".to_string()],
    };

    let auth_state = AuthAppState::new(users.clone(), mailer.clone(), AuthConfig::for_tests())
        .expect("auth state");
    let tours_state = ToursAppState::new(InMemoryTourRepository::new());

    TestApp {
        router: build_router(&http, tours_state, auth_state, Utc::now()),
        users,
        mailer,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Sign up, then verify with the mailed code. Returns the bearer token.
    async fn verified_user(&self, name: &str, email: &str) -> String {
        let (status, _) = self
            .send(
                "POST",
                "/api/v1/auth/signup",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": PASSWORD,
                    "passwordConfirm": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let otp = self.last_code();
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/auth/verify-email",
                None,
                Some(json!({ "email": email, "otp": otp })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Verified user promoted to `role`. Returns the bearer token.
    async fn user_with_role(&self, name: &str, email: &str, role: UserRole) -> String {
        let token = self.verified_user(name, email).await;
        let mut user = self
            .users
            .find_by_email(&Email::new(email).unwrap())
            .await
            .unwrap()
            .unwrap();
        user.role = role;
        self.users.update(&user).await.unwrap();
        token
    }

    fn last_code(&self) -> String {
        let message = self.mailer.last().expect("no email sent");
        message
            .text
            .split(|c: char| !c.is_ascii_digit())
            .find(|word| word.len() == 6)
            .expect("no code in email")
            .to_string()
    }

    async fn create_tour(&self, token: &str, body: Value) -> Value {
        let (status, body) = self.send("POST", "/api/v1/tours", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["tour"].clone()
    }
}

fn tour_body(name: &str, price: f64, rating: f64) -> Value {
    json!({
        "name": name,
        "duration": 5,
        "maxGroupSize": 25,
        "difficulty": "easy",
        "ratingsAverage": rating,
        "price": price,
        "summary": "Breathtaking hike through the Canadian Banff National Park",
        "imageCover": "tour-1-cover.jpg",
        "startDates": ["2021-04-25T09:00:00Z", "2021-07-20T09:00:00Z"],
    })
}

// ============================================================================
// Health and fallback
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_app();

    let (status, body) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["startedAt"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_test_app();

    let (status, body) = app.send("GET", "/api/v1/nope?x=1", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Can't find /api/v1/nope?x=1 on this server");
}

// ============================================================================
// Tours
// ============================================================================

#[tokio::test]
async fn test_tour_writes_require_a_manager() {
    let app = create_test_app();
    let body = tour_body("The Forest Hiker", 397.0, 4.7);

    let (status, _) = app.send("POST", "/api/v1/tours", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = app.verified_user("Plain User", "user@example.com").await;
    let (status, resp) = app.send("POST", "/api/v1/tours", Some(&user), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(resp["message"], "You do not have permission to perform this action");

    let lead = app
        .user_with_role("Lead Guide", "lead@example.com", UserRole::LeadGuide)
        .await;
    let tour = app.create_tour(&lead, body).await;
    assert_eq!(tour["slug"], "the-forest-hiker");
    assert_eq!(tour["durationInWeeks"], json!(0.71));
}

#[tokio::test]
async fn test_tour_list_envelope_and_pagination() {
    let app = create_test_app();
    let admin = app.user_with_role("Admin User", "admin@example.com", UserRole::Admin).await;
    for (i, price) in [497.0, 397.0, 997.0].into_iter().enumerate() {
        app.create_tour(&admin, tour_body(&format!("Tour number {i} here"), price, 4.5))
            .await;
    }

    let (status, body) = app
        .send("GET", "/api/v1/tours?sort=price&limit=2&fields=name,price", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["results"], 2);
    assert!(body["requestedAt"].is_string());
    let meta = &body["paginationMetaData"];
    assert_eq!(meta["totalDocs"], 3);
    assert_eq!(meta["totalPages"], 2);
    assert_eq!(meta["hasNextPage"], true);
    let tours = body["data"]["tours"].as_array().unwrap();
    assert_eq!(tours[0]["price"], 397.0);
    assert_eq!(tours[1]["price"], 497.0);
    assert!(tours[0].get("summary").is_none());

    let (_, page_two) = app
        .send("GET", "/api/v1/tours?sort=price&limit=2&page=2", None, None)
        .await;
    assert_eq!(page_two["results"], 1);
    assert_eq!(page_two["paginationMetaData"]["hasPrevPage"], true);
}

#[tokio::test]
async fn test_top_five_cheap_alias() {
    let app = create_test_app();
    let admin = app.user_with_role("Admin User", "admin@example.com", UserRole::Admin).await;
    for i in 0..7 {
        let price = 100.0 + f64::from(i) * 50.0;
        app.create_tour(&admin, tour_body(&format!("Budget tour {i} trail"), price, 4.5))
            .await;
    }

    let (status, body) = app
        .send("GET", "/api/v1/tours/top-5-cheap?limit=50", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 5);
    let prices: Vec<f64> = body["data"]["tours"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tour| tour["price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![100.0, 150.0, 200.0, 250.0, 300.0]);
}

#[tokio::test]
async fn test_invalid_input_is_reported_together() {
    let app = create_test_app();
    let admin = app.user_with_role("Admin User", "admin@example.com", UserRole::Admin).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/tours",
            Some(&admin),
            Some(json!({ "name": "Short", "price": 100, "priceDiscount": 150 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid input data. "));
    assert!(message.contains("A tour must have a duration"));
    assert!(message.contains("Discount price (150) should be below regular price"));
}

#[tokio::test]
async fn test_discount_above_price_is_a_bad_request() {
    let app = create_test_app();
    let admin = app.user_with_role("Admin User", "admin@example.com", UserRole::Admin).await;

    let mut body = tour_body("The Discount Hiker", 100.0, 4.5);
    body["priceDiscount"] = json!(150);
    let (status, body) = app.send("POST", "/api/v1/tours", Some(&admin), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "status": "fail",
            "message": "Invalid input data. Discount price (150) should be below regular price",
        })
    );

    let tour = app.create_tour(&admin, tour_body("The Park Camper", 100.0, 4.5)).await;
    let uri = format!("/api/v1/tours/{}", tour["id"].as_str().unwrap());
    let (status, _) = app
        .send("PATCH", &uri, Some(&admin), Some(json!({ "priceDiscount": 120 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_validation_is_a_bad_request() {
    let app = create_test_app();

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(json!({
                "name": "Jonas",
                "email": "jonas@example.com",
                "password": PASSWORD,
                "passwordConfirm": "something-else",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert!(body["message"].as_str().unwrap().starts_with("Invalid input data. "));
}

#[tokio::test]
async fn test_get_update_delete_tour() {
    let app = create_test_app();
    let admin = app.user_with_role("Admin User", "admin@example.com", UserRole::Admin).await;
    let tour = app.create_tour(&admin, tour_body("The Sea Explorer", 497.0, 4.8)).await;
    let uri = format!("/api/v1/tours/{}", tour["id"].as_str().unwrap());

    let (status, body) = app.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tour"]["name"], "The Sea Explorer");

    let (status, body) = app
        .send("PATCH", &uri, Some(&admin), Some(json!({ "name": "The Sea Voyager" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tour"]["slug"], "the-sea-voyager");

    let (status, body) = app.send("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = app.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No tour found with that ID");
}

#[tokio::test]
async fn test_malformed_tour_id_is_400() {
    let app = create_test_app();

    let (status, body) = app.send("GET", "/api/v1/tours/abc", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid id: abc.");
}

#[tokio::test]
async fn test_stats_and_monthly_plan() {
    let app = create_test_app();
    let admin = app.user_with_role("Admin User", "admin@example.com", UserRole::Admin).await;
    app.create_tour(&admin, tour_body("The Forest Hiker", 397.0, 4.7)).await;
    app.create_tour(&admin, tour_body("The Snow Adventurer", 997.0, 4.5)).await;

    let (status, body) = app.send("GET", "/api/v1/tours/tour-stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let stats = body["data"]["stats"].as_array().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["numTours"], 2);

    let (status, body) = app
        .send("GET", "/api/v1/tours/monthly-plan/2021", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let plan = body["data"]["plan"].as_array().unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0]["numTourStarts"], 2);

    let (status, _) = app
        .send("GET", "/api/v1/tours/monthly-plan/next-year", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_requires_verified_email() {
    let app = create_test_app();
    let credentials = json!({ "email": "new@example.com", "password": PASSWORD });

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(json!({
                "name": "New Hiker",
                "email": "new@example.com",
                "password": PASSWORD,
                "passwordConfirm": PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("token").is_none());
    assert_eq!(body["data"]["user"]["isEmailVerified"], false);

    let (status, body) = app
        .send("POST", "/api/v1/auth/login", None, Some(credentials.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["action"],
        "Check your inbox for the verification code or request a new one."
    );

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/auth/verify-email",
            None,
            Some(json!({ "email": "new@example.com", "otp": "not-a-code" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired verification code");
    assert_eq!(
        body["action"],
        "Request a new code from /api/v1/auth/resend-verification."
    );

    let otp = app.last_code();
    let (status, _) = app
        .send(
            "POST",
            "/api/v1/auth/verify-email",
            None,
            Some(json!({ "email": "new@example.com", "otp": otp })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send("POST", "/api/v1/auth/login", None, Some(credentials))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, body) = app.send("GET", "/api/v1/users/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "new@example.com");
}

#[tokio::test]
async fn test_old_token_rejected_after_password_change() {
    let app = create_test_app();
    let old_token = app.verified_user("Hiker", "hiker@example.com").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, body) = app
        .send(
            "PATCH",
            "/api/v1/auth/update-password",
            Some(&old_token),
            Some(json!({
                "currentPassword": PASSWORD,
                "password": "NewPass5678!",
                "passwordConfirm": "NewPass5678!",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.send("GET", "/api/v1/users/me", Some(&old_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User recently changed password! Please log in again.");

    let (status, _) = app.send("GET", "/api/v1/users/me", Some(&new_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_users_admin_routes() {
    let app = create_test_app();
    let user = app.verified_user("Plain User", "user@example.com").await;
    let admin = app.user_with_role("Admin User", "admin@example.com", UserRole::Admin).await;

    let (status, _) = app.send("GET", "/api/v1/users", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send("GET", "/api/v1/users?sort=email", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 2);
    assert_eq!(body["data"]["users"][0]["email"], "admin@example.com");
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = create_test_app();

    let (status, body) = app.send("GET", "/api/v1/users/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "You are not logged in! Please log in to get access.");
}
