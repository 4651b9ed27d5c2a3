pub mod auth;
pub mod families;
pub mod health;
pub mod invitations;
pub mod items;
pub mod reservations;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Every route lives under `/api`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Health
        .route("/health", get(health::health))
        // Auth
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        // Users
        .route("/users/{id}", get(users::get_user).delete(users::delete_user))
        .route("/users/{id}/name", put(users::update_username))
        .route("/users/{id}/email", put(users::update_email))
        .route("/users/{id}/password", put(users::change_password))
        // Families
        .route(
            "/families",
            post(families::create_family).get(families::list_my_families),
        )
        .route("/families/invitations", get(invitations::list_invitations))
        .route(
            "/families/{id}",
            get(families::get_family).delete(families::delete_family),
        )
        .route("/families/{id}/users", get(families::list_members))
        .route(
            "/families/{id}/users/{user_id}",
            axum::routing::delete(families::remove_member),
        )
        // Invitations
        .route("/families/{id}/invite", post(invitations::invite_member))
        .route(
            "/families/{id}/invite/{invite_id}/accept",
            post(invitations::accept_invitation),
        )
        .route(
            "/families/{id}/invite/{invite_id}/decline",
            post(invitations::decline_invitation),
        )
        // Items
        .route("/items", post(items::create_item))
        .route("/items/user/type", get(items::user_item_types))
        .route("/items/family/{id}", get(items::list_family_items))
        .route("/items/family/{id}/type", get(items::family_item_types))
        .route(
            "/items/family/{id}/type/{item_type}",
            get(items::list_family_items_by_type),
        )
        .route(
            "/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        // Reservations
        .route("/reservations", post(reservations::create_reservation))
        .route("/reservations/user", get(reservations::list_my_reservations))
        .route(
            "/reservations/family/{id}",
            get(reservations::list_family_reservations),
        )
        .route(
            "/reservations/family/{id}/type/{item_type}",
            get(reservations::list_family_reservations_by_type),
        )
        .route(
            "/reservations/item/{id}",
            get(reservations::list_item_reservations),
        )
        .route(
            "/reservations/item/{id}/availability",
            get(reservations::check_availability),
        )
        .route(
            "/reservations/{id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use famshare_store::Store;

    use crate::config::AppConfig;
    use crate::AppState;

    fn test_app(registration: Option<&str>) -> Router {
        let dir = tempfile::tempdir().unwrap().keep();
        let store = Store::open_path(&dir.join("famshare.db")).unwrap();
        let registration = registration.map(str::to_string);
        let config = AppConfig::from_lookup(|key| match key {
            "FAMSHARE_DATA_DIR" => Some(dir.display().to_string()),
            "JWT_SECRET" => Some("test-secret".into()),
            "FAMSHARE_REGISTRATION" => registration.clone(),
            _ => None,
        });
        super::router(AppState {
            store: Arc::new(store),
            config,
        })
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Sign up and return `(token, user_id)`.
    async fn signup(app: &Router, username: &str) -> (String, String) {
        let (status, body) = call(
            app,
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "correct horse",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user_id"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app(None);
        let (status, body) = call(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn auth_is_required_and_checked() {
        let app = test_app(None);
        let (status, body) = call(&app, "GET", "/api/families", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "unauthorized");

        let (status, _) = call(&app, "GET", "/api/families", Some("not.a.jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (token, user_id) = signup(&app, "alice").await;
        let (status, body) = call(&app, "GET", "/api/families", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["families"], json!([]));

        let (status, _) = call(
            &app,
            "DELETE",
            &format!("/api/users/{user_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // The token outlives the account but no longer resolves.
        let (status, _) = call(&app, "GET", "/api/families", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_and_closed_registration() {
        let app = test_app(None);
        signup(&app, "alice").await;
        let (status, body) = call(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "alice", "password": "correct horse"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");

        let (status, body) = call(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "alice", "password": "wrong horse"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "unauthorized");

        let closed = test_app(Some("closed"));
        let (status, _) = call(
            &closed,
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "correct horse",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn family_item_and_booking_flow() {
        let app = test_app(None);
        let (t1, _u1) = signup(&app, "alice").await;
        let (t2, u2) = signup(&app, "bob").await;

        // Family + item; the type is normalized.
        let (status, family) =
            call(&app, "POST", "/api/families", Some(&t1), Some(json!({"name": "Smiths"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let family_id = family["id"].as_str().unwrap().to_string();

        let (status, item) = call(
            &app,
            "POST",
            "/api/items",
            Some(&t1),
            Some(json!({"family_id": family_id, "name": "Tent", "type": "camping"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["type"], "Camping");
        let item_id = item["id"].as_str().unwrap().to_string();

        // Invite bob, bob accepts.
        let (status, invite) = call(
            &app,
            "POST",
            &format!("/api/families/{family_id}/invite"),
            Some(&t1),
            Some(json!({"invited_username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let invite_id = invite["id"].as_str().unwrap().to_string();

        let (status, pending) =
            call(&app, "GET", "/api/families/invitations", Some(&t2), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pending["invitations"][0]["family_name"], "Smiths");

        let (status, accepted) = call(
            &app,
            "POST",
            &format!("/api/families/{family_id}/invite/{invite_id}/accept"),
            Some(&t2),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(accepted["role"], "member");

        let (status, again) = call(
            &app,
            "POST",
            &format!("/api/families/{family_id}/invite/{invite_id}/accept"),
            Some(&t2),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(again["kind"], "conflict");

        let (_, members) = call(
            &app,
            "GET",
            &format!("/api/families/{family_id}/users"),
            Some(&t2),
            None,
        )
        .await;
        assert_eq!(members["members"][0]["role"], "owner");
        assert_eq!(members["members"][1]["user_id"], u2.as_str());

        // Bookings: overlap conflicts, touching boundary is fine.
        let (status, _) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&t1),
            Some(json!({
                "item_id": item_id,
                "start_time": "2025-06-01T10:00:00Z",
                "end_time": "2025-06-01T11:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&t2),
            Some(json!({
                "item_id": item_id,
                "start_time": "2025-06-01T12:30:00+02:00",
                "end_time": "2025-06-01T11:30:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, booked) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&t2),
            Some(json!({
                "item_id": item_id,
                "start_time": "2025-06-01T11:00:00Z",
                "end_time": "2025-06-01T12:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(booked["user_id"], u2.as_str());

        let (status, bad) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&t2),
            Some(json!({
                "item_id": item_id,
                "start_time": "2025-06-01T15:00:00Z",
                "end_time": "2025-06-01T15:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(bad["kind"], "bad_request");

        let (status, avail) = call(
            &app,
            "GET",
            &format!(
                "/api/reservations/item/{item_id}/availability\
                 ?start=2025-06-01T12:00:00Z&end=2025-06-01T13:00:00Z"
            ),
            Some(&t2),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(avail["available"], true);

        let (_, listed) = call(
            &app,
            "GET",
            &format!("/api/reservations/family/{family_id}/type/CAMPING"),
            Some(&t1),
            None,
        )
        .await;
        assert_eq!(listed["reservations"].as_array().unwrap().len(), 2);

        let (_, types) = call(&app, "GET", "/api/items/user/type", Some(&t2), None).await;
        assert_eq!(types["types"], json!(["Camping"]));
    }

    #[tokio::test]
    async fn malformed_bodies_and_queries_are_bad_requests() {
        let app = test_app(None);
        let (token, _) = signup(&app, "alice").await;
        let (_, family) = call(
            &app,
            "POST",
            "/api/families",
            Some(&token),
            Some(json!({"name": "Smiths"})),
        )
        .await;
        let (_, item) = call(
            &app,
            "POST",
            "/api/items",
            Some(&token),
            Some(json!({"family_id": family["id"], "name": "Tent", "type": "Camping"})),
        )
        .await;
        let item_id = item["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(&token),
            Some(json!({
                "item_id": item_id,
                "start_time": "tomorrow",
                "end_time": "2025-06-01T11:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");
        assert!(body["error"].as_str().unwrap().contains("start_time"));

        let (status, body) = call(
            &app,
            "POST",
            "/api/families",
            Some(&token),
            Some(json!({"title": "Smiths"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");

        // An unencoded `+` in the offset decodes to a space.
        let (status, body) = call(
            &app,
            "GET",
            &format!(
                "/api/reservations/item/{item_id}/availability\
                 ?start=2025-06-01T12:00:00+02:00&end=2025-06-01T13:00:00Z"
            ),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");
    }
}
