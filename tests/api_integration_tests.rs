// API Integration Tests
//
// Purpose: Drive every endpoint through the router with an in-memory engine
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use hybrid_scorer_rust::{
        create_router, AppState, EngineSnapshot, LogisticModel, PlantEntry, SalinityIndex,
        SearchIndex, TraitRow, TraitStore,
    };
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    // Helper: Create test app over a small fixed table
    fn create_test_app() -> axum::Router {
        let traits = TraitStore::from_rows(vec![
            TraitRow::new("Acacia", "Fabaceae")
                .with_wood(0.9)
                .with_perennial(0.9)
                .with_temperature(0.8),
            TraitRow::new("Atriplex", "Amaranthaceae")
                .with_wood(0.1)
                .with_perennial(0.7)
                .with_temperature(0.7),
            TraitRow::new("Prosopis", "Fabaceae")
                .with_wood(0.95)
                .with_perennial(1.0)
                .with_temperature(0.9),
            TraitRow::new("Stipa", "Poaceae")
                .with_wood(0.0)
                .with_perennial(0.6)
                .with_temperature(0.35),
        ]);
        let salinity = SalinityIndex::from_pairs(vec![("Acacia", 10.0), ("Atriplex", 70.0)]);

        let model = LogisticModel {
            intercept: -1.0,
            coefficients: [("perc_wood".to_string(), 1.5), ("tavg".to_string(), 2.0)]
                .into_iter()
                .collect(),
            categorical: BTreeMap::new(),
        };
        let names = vec!["perc_wood".to_string(), "perc_per".to_string(), "tavg".to_string()];
        let snapshot = Arc::new(EngineSnapshot::new(traits, salinity, Box::new(model), 0.5, names));

        let search_index = SearchIndex::from_entries(vec![
            PlantEntry::new("sweet acacia", "Acacia"),
            PlantEntry::new("fourwing saltbush", "Atriplex"),
            PlantEntry::new("honey mesquite", "Prosopis"),
        ]);

        create_router(AppState::from_parts(snapshot, search_index))
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    // =========================================================================
    // Section 1: Health Check
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let response = create_test_app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    // =========================================================================
    // Section 2: Pair Prediction
    // =========================================================================

    #[tokio::test]
    async fn test_predict_pair() {
        let response = create_test_app()
            .oneshot(post_json(
                "/api/predict",
                serde_json::json!({"plant_a": "Acacia", "plant_b": "Atriplex"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["plant_a"], "Acacia");
        assert_eq!(body["plant_b"], "Atriplex");
        assert_eq!(body["zone"], "Coastal");
        assert_eq!(body["traits"]["salinity_tolerance"], 70.0);
        assert_eq!(body["recommended_regions"].as_array().unwrap().len(), 11);
        assert!(["STABLE", "VULNERABLE", "THRIVING"].contains(&body["resilience"].as_str().unwrap()));
        assert!(body["explanation"]
            .as_str()
            .unwrap()
            .contains("shared salinity tolerance traits"));
    }

    #[tokio::test]
    async fn test_predict_unknown_plant() {
        let response = create_test_app()
            .oneshot(post_json(
                "/api/predict",
                serde_json::json!({"plant_a": "Acacia", "plant_b": "Quercus"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_response(response).await;
        assert_eq!(body["error"], "Plant not found");
    }

    // =========================================================================
    // Section 3: Best Match
    // =========================================================================

    #[tokio::test]
    async fn test_predict_single() {
        let response = create_test_app()
            .oneshot(post_json("/api/predict-single", serde_json::json!({"plant": "Acacia"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["plant_a"], "Acacia");
        assert_ne!(body["plant_b"], "Acacia");
        assert!(body["score"].is_number());
    }

    #[tokio::test]
    async fn test_predict_single_no_match() {
        let response = create_test_app()
            .oneshot(post_json(
                "/api/predict-single",
                serde_json::json!({"plant": "Acacia", "zone": "atlantis"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["message"], "No match found.");
    }

    #[tokio::test]
    async fn test_predict_single_unknown_plant() {
        let response = create_test_app()
            .oneshot(post_json("/api/predict-single", serde_json::json!({"plant": "Quercus"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_response(response).await["error"], "Plant not found");
    }

    // =========================================================================
    // Section 4: Rankings
    // =========================================================================

    #[tokio::test]
    async fn test_ranks() {
        let app = create_test_app();

        let response = app.clone().oneshot(get("/api/ranks")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let first = json_response(response).await;

        let ranks = first.as_array().unwrap();
        assert!(ranks.len() <= 10);
        let scores: Vec<f64> = ranks.iter().map(|r| r["score"].as_f64().unwrap()).collect();
        assert!(scores.iter().all(|s| *s > 60.0));
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        // second call is served from cache and identical
        let second = json_response(app.oneshot(get("/api/ranks")).await.unwrap()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_ranks_with_sample_size() {
        let response = create_test_app()
            .oneshot(get("/api/ranks?sample_size=2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // two genera -> at most one pair
        let body = json_response(response).await;
        assert!(body.as_array().unwrap().len() <= 1);
    }

    // =========================================================================
    // Section 5: Plant Search
    // =========================================================================

    #[tokio::test]
    async fn test_plant_search() {
        let response = create_test_app()
            .oneshot(get("/api/plants/search?q=ACACIA"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["rows"], 1);
        assert_eq!(body["data"][0]["display_name"], "sweet acacia (Acacia)");
        assert_eq!(body["data"][0]["genus"], "Acacia");
    }

    #[tokio::test]
    async fn test_plant_search_empty_query() {
        let response = create_test_app().oneshot(get("/api/plants/search")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["rows"], 0);
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
