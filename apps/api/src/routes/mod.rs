pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::interview::handlers as interview;
use crate::records::handlers as records;
use crate::state::AppState;
use crate::upload::handlers as upload;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview setup & answers
        .route("/api/v1/domains", get(interview::handle_list_domains))
        .route(
            "/api/v1/domains/:domain/roles",
            get(interview::handle_list_roles),
        )
        .route("/api/v1/interviews", post(interview::handle_create_interview))
        .route(
            "/api/v1/interviews/:session_id",
            delete(interview::handle_end_interview),
        )
        .route(
            "/api/v1/interviews/:session_id/answers",
            post(interview::handle_submit_answer),
        )
        // Evaluation
        .route(
            "/api/v1/interviews/:session_id/feedback",
            post(evaluation::handle_interview_feedback),
        )
        .route("/api/v1/ideal-answer", post(evaluation::handle_ideal_answer))
        // Resume upload
        .route(
            "/api/v1/resumes/upload",
            post(upload::handle_upload_resume)
                .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES)),
        )
        // Users & feedback history
        .route("/api/v1/users", post(records::handle_create_user))
        .route("/api/v1/users/:uid", get(records::handle_get_user))
        .route("/api/v1/feedback", post(records::handle_save_feedback))
        .route(
            "/api/v1/feedback/:user_id",
            get(records::handle_feedback_history),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::evaluation::feedback::BandFeedback;
    use crate::evaluation::scoring::HeuristicRubric;
    use crate::interview::session::MemorySessionStore;
    use crate::llm_client::{LlmError, TextGenerator};
    use crate::retrieval::embedder::HashEmbedder;

    struct Canned;

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Ok("How would you design a REST API for orders?".to_string())
        }
    }

    fn app() -> Router {
        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        build_router(AppState {
            db,
            sessions: Arc::new(MemorySessionStore::default()),
            llm: Arc::new(Canned),
            embedder: Arc::new(HashEmbedder::new(config.embedding_dimensions)),
            scorer: Arc::new(HeuristicRubric),
            feedback: Arc::new(BandFeedback),
            config,
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn start_interview(app: &Router) -> (String, Value) {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/interviews",
                json!({
                    "domain": "Web Development",
                    "role": "Backend Developer",
                    "experience": "senior",
                    "questionCount": 3
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let id = body["sessionId"].as_str().unwrap().to_string();
        (id, body)
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(empty("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_catalog_routes() {
        let app = app();
        let domains = json_body(app.clone().oneshot(empty("GET", "/api/v1/domains")).await.unwrap()).await;
        assert_eq!(domains.as_array().unwrap().len(), 4);

        let roles = json_body(
            app.oneshot(empty("GET", "/api/v1/domains/Data%20Science/roles"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(roles[1], "Machine Learning Engineer");
    }

    #[tokio::test]
    async fn test_interview_flow_scores_submitted_answers() {
        let app = app();
        let (id, body) = start_interview(&app).await;
        assert_eq!(body["questions"].as_array().unwrap().len(), 3);
        assert_eq!(body["degraded"], json!([]));

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/interviews/{id}/answers"),
                json!({
                    "answer": "I would design a REST API with versioned resources because it keeps clients stable.",
                    "questionIndex": 2
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["answersRecorded"], 1);

        let response = app
            .clone()
            .oneshot(empty("POST", &format!("/api/v1/interviews/{id}/feedback")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let feedback = json_body(response).await;
        assert_eq!(feedback["scores"].as_array().unwrap().len(), 1);
        assert_eq!(feedback["scorer"], "heuristic");
        assert_eq!(feedback["feedbackStrategy"], "band");
        assert!(feedback["strength"].is_string());
        assert!(feedback["overallScore"].as_str().unwrap().parse::<u32>().is_ok());
        assert!(feedback["degraded"].is_null());

        let response = app
            .clone()
            .oneshot(empty("DELETE", &format!("/api/v1/interviews/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty("POST", &format!("/api/v1/interviews/{id}/feedback")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_feedback_without_answers_is_rejected() {
        let app = app();
        let (id, _) = start_interview(&app).await;

        let response = app
            .oneshot(empty("POST", &format!("/api/v1/interviews/{id}/feedback")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "NO_ANSWERS");
    }

    #[tokio::test]
    async fn test_answer_for_unknown_question_is_rejected() {
        let app = app();
        let (id, _) = start_interview(&app).await;

        let response = app
            .oneshot(post_json(
                &format!("/api/v1/interviews/{id}/answers"),
                json!({ "answer": "something", "questionIndex": 7 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_answer_with_missing_fields_is_a_validation_error() {
        let app = app();
        let (id, _) = start_interview(&app).await;
        let uri = format!("/api/v1/interviews/{id}/answers");

        let response = app
            .clone()
            .oneshot(post_json(&uri, json!({ "answer": "REST is stateless" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Invalid or missing 'questionIndex'");

        let response = app
            .oneshot(post_json(&uri, json!({ "questionIndex": 0 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            "Invalid or missing 'answer'"
        );
    }

    #[tokio::test]
    async fn test_answer_for_unknown_interview_is_not_found() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/interviews/00000000-0000-0000-0000-000000000000/answers",
                json!({ "answer": "something", "questionIndex": 0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_interview_request_is_rejected() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/interviews",
                json!({ "isCustomJob": true, "experience": "senior" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_ideal_answer() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/ideal-answer",
                json!({ "question": "What is REST?", "userAnswer": "A style" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["response"].is_string());

        let response = app
            .oneshot(post_json("/api/v1/ideal-answer", json!({ "question": "What is REST?" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_extension() {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"cv.exe\"\r\n\
             Content-Type: application/octet-stream\r\n\r\nMZ\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/upload")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_returns_text_resume() {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"cv.txt\"\r\n\
             Content-Type: text/plain\r\n\r\nRust engineer\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/upload")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["resumeText"], "Rust engineer");
    }
}
