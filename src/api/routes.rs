//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{health, metrics_text, predict, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(health))
        // Prediction endpoint
        .route("/predict", post(predict))
        .route("/metrics", get(metrics_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::schemas::HealthPrediction;
    use crate::model::classifier::tests::fixture;
    use crate::model::Predictor;

    fn loaded_state() -> AppState {
        let predictor = Predictor::with_classifier("unused.json", fixture());
        AppState::new(Arc::new(predictor), "0.1.0")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(loaded_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn predict_returns_versioned_result() {
        let app = create_router(loaded_state());
        let body = json!({"age": 52, "bmi": 29.8, "smoker": 1, "exercise_mins": 5, "systolic_bp": 150});

        let response = app.oneshot(post_json("/predict", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let prediction: HealthPrediction = serde_json::from_value(body_json(response).await).unwrap();
        assert!((0.0..=1.0).contains(&prediction.risk_prob));
        assert_eq!(prediction.risk_label, u8::from(prediction.risk_prob >= 0.5));
        assert_eq!(prediction.model_version, "0.1.0");
    }

    #[tokio::test]
    async fn predict_missing_field_is_422() {
        let app = create_router(loaded_state());
        let body = json!({"age": 52, "smoker": 1, "exercise_mins": 5, "systolic_bp": 150});

        let response = app.oneshot(post_json("/predict", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body_json(response).await;
        assert_eq!(detail["detail"][0]["field"], "bmi");
    }

    #[tokio::test]
    async fn predict_malformed_json_is_422() {
        let app = create_router(loaded_state());
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from("{\"age\": 52,"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn predict_without_model_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Predictor::new(dir.path().join("absent.json"));
        let app = create_router(AppState::new(Arc::new(predictor), "0.1.0"));
        let body = json!({"age": 52, "bmi": 29.8, "smoker": 1, "exercise_mins": 5, "systolic_bp": 150});

        let response = app.oneshot(post_json("/predict", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body_json(response).await;
        assert!(detail["detail"].as_str().unwrap().contains("health-index train"));
    }

    #[tokio::test]
    async fn metrics_is_404_without_recorder() {
        let app = create_router(loaded_state());

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_on_predict_is_405() {
        let app = create_router(loaded_state());

        let response = app
            .oneshot(Request::builder().uri("/predict").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
