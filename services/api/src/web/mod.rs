pub mod auth;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::{require_admin, require_auth};
pub use rest::{
    create_report_handler, get_report_handler, health_handler, list_reports_handler,
    report_stats_handler, update_status_handler,
};

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use auth::{login_handler, logout_handler, me_handler, signup_handler};
use state::AppState;

/// Builds the API router. Layers that depend on deployment (CORS, tracing,
/// Swagger UI) are added by the binary.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required; report creation resolves the user itself)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/reports", get(list_reports_handler).post(create_report_handler))
        .route("/reports/stats", get(report_stats_handler))
        .route("/reports/{id}", get(get_report_handler));

    // Signed-in routes
    let protected_routes = Router::new()
        .route("/auth/me", get(me_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Admin routes
    let admin_routes = Router::new()
        .route("/reports/{id}/status", patch(update_status_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryIdentityProvider, SeedReportSource, SeedUser};
    use crate::config::Config;
    use crate::web::auth::UserResponse;
    use crate::web::rest::{ReportResponse, ReportsResponse, StatsResponse};
    use async_trait::async_trait;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use civic_connect_core::{
        domain::{Assessment, ScoringRequest},
        ports::{PortError, PortResult, PriorityScorer, ScoringMode},
        scoring::{FallbackScorer, FALLBACK_SCORE_RANGE},
        store::ReportStore,
    };
    use serde_json::{json, Value};
    use std::time::Duration;

    struct UnavailableScorer;

    #[async_trait]
    impl PriorityScorer for UnavailableScorer {
        async fn assess(&self, _request: &ScoringRequest<'_>) -> PortResult<Assessment> {
            Err(PortError::ExternalService("503 Service Unavailable".to_string()))
        }

        fn mode(&self) -> ScoringMode {
            ScoringMode::Live
        }
    }

    async fn server_with(scorer: Arc<dyn PriorityScorer>, loaded: bool) -> TestServer {
        let store = Arc::new(ReportStore::new(scorer));
        if loaded {
            store
                .load(&SeedReportSource::new(Duration::ZERO))
                .await
                .unwrap();
        }
        let identity =
            InMemoryIdentityProvider::with_seed_users(SeedUser::demo_accounts()).unwrap();
        let app_state = Arc::new(AppState {
            store,
            identity: Arc::new(identity),
            config: Arc::new(Config::default()),
        });
        TestServer::new(api_router(app_state)).unwrap()
    }

    async fn server() -> TestServer {
        server_with(Arc::new(FallbackScorer::with_seed(3)), true).await
    }

    /// Logs in and returns the `Cookie` header value carrying the session.
    async fn login(server: &TestServer, email: &str) -> HeaderValue {
        let response = server
            .post("/auth/login")
            .json(&json!({ "email": email, "password": "password123" }))
            .await;
        response.assert_status(StatusCode::OK);
        let set_cookie = response.header(header::SET_COOKIE);
        let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
        HeaderValue::from_str(&pair).unwrap()
    }

    fn pothole() -> Value {
        json!({
            "title": "Pothole",
            "description": "deep hole",
            "category": "pothole",
            "address": "1 Elm St",
            "location": { "type": "Point", "coordinates": [-73.9857, 40.7484] }
        })
    }

    async fn list(server: &TestServer) -> Vec<ReportResponse> {
        match server.get("/reports").await.json::<ReportsResponse>() {
            ReportsResponse::Ready { reports } => reports,
            ReportsResponse::Loading => panic!("store should be ready"),
        }
    }

    #[tokio::test]
    async fn test_list_reports_while_loading() {
        let server = server_with(Arc::new(FallbackScorer::with_seed(1)), false).await;
        let body = server.get("/reports").await.json::<Value>();
        assert_eq!(body, json!({ "state": "loading" }));
        server
            .get("/reports/stats")
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_single_report_reads_signal_loading() {
        let server = server_with(Arc::new(FallbackScorer::with_seed(1)), false).await;
        let cookie = login(&server, "bob@example.com").await;
        let created = server
            .post("/reports")
            .add_header(header::COOKIE, cookie)
            .json(&pothole())
            .await
            .json::<ReportResponse>();

        let response = server.get(&format!("/reports/{}", created.id)).await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "Reports are still loading" })
        );
    }

    #[tokio::test]
    async fn test_list_reports_when_ready() {
        let server = server().await;
        let reports = list(&server).await;
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].location.kind, "Point");

        let health = server.get("/health").await.json::<Value>();
        assert_eq!(health, json!({ "scoring_mode": "fallback", "store": "ready" }));
    }

    #[tokio::test]
    async fn test_health_names_the_model_in_live_mode() {
        let server = server_with(Arc::new(UnavailableScorer), false).await;
        let health = server.get("/health").await.json::<Value>();
        assert_eq!(
            health,
            json!({
                "scoring_mode": "live",
                "scoring_model": "gemini-2.5-flash",
                "store": "uninitialized"
            })
        );
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let stats = server().await.get("/reports/stats").await.json::<StatsResponse>();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.pending, 4);
        assert_eq!(stats.top_category.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_anonymous_submission_is_rejected_and_store_unchanged() {
        let server = server().await;
        let before = list(&server).await;

        let response = server.post("/reports").json(&pothole()).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let after = list(&server).await;
        assert_eq!(
            before.iter().map(|r| r.id).collect::<Vec<_>>(),
            after.iter().map(|r| r.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_signed_in_submission_is_scored_and_prepended() {
        let server = server().await;
        let cookie = login(&server, "bob@example.com").await;
        let bob = server
            .get("/auth/me")
            .add_header(header::COOKIE, cookie.clone())
            .await
            .json::<UserResponse>();

        let response = server
            .post("/reports")
            .add_header(header::COOKIE, cookie)
            .json(&pothole())
            .await;
        response.assert_status(StatusCode::CREATED);
        let report = response.json::<ReportResponse>();

        assert_eq!(report.status, "open");
        assert_eq!(report.upvotes, 1);
        assert_eq!(report.upvoters, vec![bob.user_id]);
        assert_eq!(report.created_by, bob.user_id);
        assert!(FALLBACK_SCORE_RANGE.contains(&report.ai_score));
        assert!(report.ai_summary.contains("Timeframe: Pending Review."));

        let reports = list(&server).await;
        assert_eq!(reports.len(), 6);
        assert_eq!(reports[0].id, report.id);
        let fetched = server
            .get(&format!("/reports/{}", report.id))
            .await
            .json::<ReportResponse>();
        assert_eq!(fetched.title, "Pothole");
    }

    #[tokio::test]
    async fn test_invalid_submission_is_a_bad_request() {
        let server = server().await;
        let cookie = login(&server, "bob@example.com").await;

        let mut body = pothole();
        body["category"] = json!("sinkhole");
        server
            .post("/reports")
            .add_header(header::COOKIE, cookie.clone())
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let mut body = pothole();
        body["title"] = json!("  ");
        server
            .post("/reports")
            .add_header(header::COOKIE, cookie)
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(list(&server).await.len(), 5);
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_errors() {
        let server = server().await;
        let incomplete = json!({ "title": "Pothole" });

        let anonymous = server.post("/reports").json(&incomplete).await;
        anonymous.assert_status(StatusCode::UNAUTHORIZED);
        assert!(anonymous.json::<Value>()["error"].is_string());

        let cookie = login(&server, "bob@example.com").await;
        let signed_in = server
            .post("/reports")
            .add_header(header::COOKIE, cookie.clone())
            .json(&incomplete)
            .await;
        signed_in.assert_status(StatusCode::BAD_REQUEST);
        let error = signed_in.json::<Value>()["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("Invalid JSON data"), "{}", error);

        let not_json = server
            .post("/reports")
            .add_header(header::COOKIE, cookie)
            .text("title=Pothole")
            .await;
        not_json.assert_status(StatusCode::BAD_REQUEST);
        assert!(not_json.json::<Value>()["error"].is_string());

        let login_response = server.post("/auth/login").json(&json!({ "email": "bob@example.com" })).await;
        login_response.assert_status(StatusCode::BAD_REQUEST);
        assert!(login_response.json::<Value>()["error"].is_string());
        assert_eq!(list(&server).await.len(), 5);
    }

    #[tokio::test]
    async fn test_scoring_failure_is_a_bad_gateway_and_stores_nothing() {
        let server = server_with(Arc::new(UnavailableScorer), true).await;
        let cookie = login(&server, "bob@example.com").await;

        let response = server
            .post("/reports")
            .add_header(header::COOKIE, cookie)
            .json(&pothole())
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "Failed to get AI assessment." })
        );
        assert_eq!(list(&server).await.len(), 5);
    }

    #[tokio::test]
    async fn test_status_updates_are_admin_only() {
        let server = server().await;
        let target = list(&server).await[2].clone();
        let path = format!("/reports/{}/status", target.id);
        let body = json!({ "status": "resolved" });

        server
            .patch(&path)
            .json(&body)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let bob = login(&server, "bob@example.com").await;
        server
            .patch(&path)
            .add_header(header::COOKIE, bob)
            .json(&body)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let alice = login(&server, "alice@example.com").await;
        let response = server
            .patch(&path)
            .add_header(header::COOKIE, alice)
            .json(&body)
            .await;
        response.assert_status(StatusCode::OK);
        let updated = response.json::<ReportResponse>();
        assert_eq!(updated.status, "resolved");
        assert_eq!(updated.ai_summary, target.ai_summary);

        let reports = list(&server).await;
        assert_eq!(reports[2].id, target.id);
        assert_eq!(reports[2].status, "resolved");
    }

    #[tokio::test]
    async fn test_status_update_errors() {
        let server = server().await;
        let alice = login(&server, "alice@example.com").await;
        let before = list(&server).await;

        server
            .patch(&format!("/reports/{}/status", uuid::Uuid::new_v4()))
            .add_header(header::COOKIE, alice.clone())
            .json(&json!({ "status": "resolved" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        server
            .patch(&format!("/reports/{}/status", before[0].id))
            .add_header(header::COOKIE, alice)
            .json(&json!({ "status": "closed" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let after = list(&server).await;
        assert_eq!(
            before.iter().map(|r| (r.id, r.status.clone())).collect::<Vec<_>>(),
            after.iter().map(|r| (r.id, r.status.clone())).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_signup_me_and_logout() {
        let server = server().await;
        let response = server
            .post("/auth/signup")
            .json(&json!({
                "name": "Carol",
                "email": "carol@example.com",
                "password": "correct horse"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let set_cookie = response.header(header::SET_COOKIE);
        let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
        let cookie = HeaderValue::from_str(&pair).unwrap();

        let me = server
            .get("/auth/me")
            .add_header(header::COOKIE, cookie.clone())
            .await
            .json::<UserResponse>();
        assert_eq!(me.name, "Carol");
        assert_eq!(me.role, "user");

        server
            .post("/auth/logout")
            .add_header(header::COOKIE, cookie.clone())
            .await
            .assert_status(StatusCode::OK);
        server
            .get("/auth/me")
            .add_header(header::COOKIE, cookie)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .post("/auth/signup")
            .json(&json!({
                "name": "Carol",
                "email": "carol@example.com",
                "password": "correct horse"
            }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_bad_login_is_unauthorized() {
        server()
            .await
            .post("/auth/login")
            .json(&json!({ "email": "bob@example.com", "password": "nope" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
