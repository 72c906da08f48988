use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::queue::handlers;
use crate::features::queue::services::QueueService;

/// Create routes for the queue feature
///
/// Note: Public, used by kiosks, the web form and staff terminals
pub fn routes(service: Arc<QueueService>) -> Router {
    Router::new()
        .route("/queue/generate", post(handlers::generate_ticket))
        .route("/queue/estimate", get(handlers::get_estimate))
        .route(
            "/queue/status/{department_id}",
            get(handlers::get_queue_status),
        )
        .route("/queue/complete", post(handlers::complete_ticket))
        .route("/queue/update-status", post(handlers::update_ticket_status))
        .route("/queue/reset/{department_id}", post(handlers::reset_queue))
        .route(
            "/queue/history/{department_id}",
            get(handlers::get_queue_history),
        )
        .route("/queue/number/{id}", get(handlers::get_queue_number))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::features::queue::stores::InMemoryTicketStore;
    use crate::shared::test_helpers::test_app;

    fn server() -> TestServer {
        TestServer::new(test_app(Arc::new(InMemoryTicketStore::new()))).unwrap()
    }

    async fn generate(server: &TestServer, department_id: i64, transaction_id: i64) -> Value {
        let response = server
            .post("/queue/generate")
            .json(&json!({
                "department_id": department_id,
                "transaction_id": transaction_id
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    #[tokio::test]
    async fn test_generate_issues_numbered_ticket_with_estimate() {
        let server = server();

        let first = generate(&server, 1, 10).await;
        let second = generate(&server, 1, 10).await;

        assert_eq!(first["success"], json!(true));
        assert_eq!(first["data"]["queue_number"], json!("TRE#001"));
        assert_eq!(first["data"]["source"], json!("kiosk"));
        assert_eq!(first["data"]["department"]["name"], json!("Treasury"));
        assert_eq!(first["data"]["transaction"]["name"], json!("Business Permit"));
        assert_eq!(first["data"]["estimated_wait_time"]["minutes"], json!(10));

        assert_eq!(second["data"]["queue_number"], json!("TRE#002"));
        assert_eq!(
            second["data"]["estimated_wait_time"]["formatted"],
            json!("20 minutes")
        );
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_and_unknown_references() {
        let server = server();

        let missing = server
            .post("/queue/generate")
            .json(&json!({ "department_id": 1 }))
            .await;
        missing.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(missing.json::<Value>()["code"], json!("INVALID_ARGUMENT"));

        for (department_id, transaction_id) in [(99, 10), (1, 11), (1, 20), (3, 30)] {
            let response = server
                .post("/queue/generate")
                .json(&json!({
                    "department_id": department_id,
                    "transaction_id": transaction_id
                }))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(response.json::<Value>()["code"], json!("INVALID_ARGUMENT"));
        }
    }

    #[tokio::test]
    async fn test_generate_publishes_latest_issued_signal() {
        let server = server();
        generate(&server, 2, 20).await;

        let latest = server.get("/queue/latest-update/2").await;
        latest.assert_status_ok();
        let body = latest.json::<Value>();
        assert_eq!(body["data"]["queue_number"], json!("ASS#001"));
        assert_eq!(body["data"]["transaction_name"], json!("Property Tax"));

        let all = server.get("/queue/latest-updates").await.json::<Value>();
        assert_eq!(all["meta"]["total"], json!(1));
    }

    #[tokio::test]
    async fn test_complete_then_terminal_is_conflict() {
        let server = server();
        let issued = generate(&server, 1, 10).await;
        let queue_id = issued["data"]["queue_id"].clone();

        let done = server
            .post("/queue/complete")
            .json(&json!({ "queue_id": queue_id }))
            .await;
        done.assert_status_ok();
        assert_eq!(done.json::<Value>()["data"]["status"], json!("completed"));

        let again = server
            .post("/queue/update-status")
            .json(&json!({ "queue_id": queue_id, "status": "successful" }))
            .await;
        again.assert_status(StatusCode::CONFLICT);
        assert_eq!(again.json::<Value>()["code"], json!("INVALID_TRANSITION"));
    }

    #[tokio::test]
    async fn test_update_status_validates_input() {
        let server = server();
        let issued = generate(&server, 1, 10).await;
        let queue_id = issued["data"]["queue_id"].clone();

        let bad_status = server
            .post("/queue/update-status")
            .json(&json!({ "queue_id": queue_id, "status": "completed" }))
            .await;
        bad_status.assert_status(StatusCode::BAD_REQUEST);

        let missing_id = server
            .post("/queue/update-status")
            .json(&json!({ "status": "failed" }))
            .await;
        missing_id.assert_status(StatusCode::BAD_REQUEST);

        let unknown = server
            .post("/queue/complete")
            .json(&json!({ "queue_id": uuid::Uuid::now_v7() }))
            .await;
        unknown.assert_status(StatusCode::NOT_FOUND);

        let failed = server
            .post("/queue/update-status")
            .json(&json!({ "queue_id": queue_id, "status": "failed" }))
            .await;
        failed.assert_status_ok();
        assert_eq!(failed.json::<Value>()["data"]["status"], json!("failed"));
    }

    #[tokio::test]
    async fn test_reset_status_and_history() {
        let server = server();
        let served = generate(&server, 1, 10).await;
        generate(&server, 1, 12).await;
        generate(&server, 1, 10).await;

        server
            .post("/queue/update-status")
            .json(&json!({ "queue_id": served["data"]["queue_id"], "status": "successful" }))
            .await
            .assert_status_ok();

        let reset = server.post("/queue/reset/1").await;
        reset.assert_status_ok();
        assert_eq!(reset.json::<Value>()["data"]["deleted"], json!(2));

        let status = server.get("/queue/status/1").await.json::<Value>();
        assert_eq!(status["meta"]["total"], json!(1));
        assert_eq!(status["data"][0]["status"], json!("successful"));

        let history = server.get("/queue/history/1").await.json::<Value>();
        assert_eq!(history["data"][0]["queue_number"], json!("TRE#001"));

        let next = generate(&server, 1, 10).await;
        assert_eq!(next["data"]["queue_number"], json!("TRE#001"));

        server
            .post("/queue/reset/404")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_number_lookup_and_estimate() {
        let server = server();
        let issued = generate(&server, 2, 20).await;
        let id = issued["data"]["queue_id"].as_str().unwrap().to_string();

        let found = server.get(&format!("/queue/number/{}", id)).await;
        found.assert_status_ok();
        assert_eq!(found.json::<Value>()["data"]["transaction_name"], json!("Property Tax"));

        let estimate = server
            .get("/queue/estimate")
            .add_query_param("department_id", 2)
            .add_query_param("transaction_id", 20)
            .await;
        estimate.assert_status_ok();
        assert_eq!(estimate.json::<Value>()["data"]["minutes"], json!(10));
    }

    #[tokio::test]
    async fn test_malformed_path_and_query_use_json_envelope() {
        let server = server();

        let cases = [
            server.get("/queue/status/abc").await,
            server.get("/queue/number/not-a-uuid").await,
            server
                .get("/queue/estimate")
                .add_query_param("department_id", 1)
                .await,
            server.get("/queue/latest-update/abc").await,
            server
                .get("/queue/currently-serving")
                .add_query_param("department_id", "abc")
                .await,
        ];

        for response in cases {
            response.assert_status(StatusCode::BAD_REQUEST);
            let body = response.json::<Value>();
            assert_eq!(body["success"], json!(false));
            assert_eq!(body["code"], json!("BAD_REQUEST"));
        }
    }

    #[tokio::test]
    async fn test_validation_lists_every_violation() {
        let server = server();

        let response = server
            .post("/queue/generate")
            .json(&json!({ "department_id": 0 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["code"], json!("INVALID_ARGUMENT"));
        let errors = body["errors"].as_array().cloned().unwrap_or_default();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&json!("department_id must be a positive id")));
        assert!(errors.contains(&json!("transaction_id is required")));
    }

    #[tokio::test]
    async fn test_currently_serving_board() {
        let server = server();

        server
            .post("/queue/currently-serving")
            .json(&json!({ "department_id": 1, "queue_number": "TRE#004" }))
            .await
            .assert_status_ok();

        let one = server
            .get("/queue/currently-serving")
            .add_query_param("department_id", 1)
            .await
            .json::<Value>();
        assert_eq!(one["data"]["queue_number"], json!("TRE#004"));

        let idle = server
            .get("/queue/currently-serving")
            .add_query_param("department_id", 2)
            .await
            .json::<Value>();
        assert_eq!(idle["data"], Value::Null);

        let board = server.get("/queue/currently-serving").await.json::<Value>();
        assert_eq!(board["data"].as_array().map(Vec::len), Some(3));
        assert_eq!(board["data"][0]["serving"]["queue_number"], json!("TRE#004"));

        server
            .post("/queue/currently-serving")
            .json(&json!({ "department_id": 77, "queue_number": "XYZ#001" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
