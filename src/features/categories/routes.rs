use axum::{routing::get, Router};

use crate::features::categories::handlers;

/// Create routes for the categories feature
pub fn routes() -> Router {
    Router::new().route(
        "/api/categories/{name}/strategy",
        get(handlers::get_category_strategy),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_strategy_for_known_category() {
        let server = TestServer::new(routes()).unwrap();

        let response = server.get("/api/categories/American/strategy").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["strategy_name"], "American");
    }

    #[tokio::test]
    async fn test_strategy_defaults_to_brazilian() {
        let server = TestServer::new(routes()).unwrap();

        let response = server.get("/api/categories/Portuguese/strategy").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["strategy_name"], "Brazilian");
    }
}
