//! Application router configuration.

use axum::{Router, middleware, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, bar_chart::get_bar_chart, combined::get_combined, endpoints,
    logging::logging_middleware, pie_chart::get_pie_chart, statistics::get_statistics,
    stores::TransactionStore, transactions::get_transactions,
};

/// Return a router with all the app's routes.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::TRANSACTIONS, get(get_transactions::<S>))
        .route(endpoints::STATISTICS, get(get_statistics::<S>))
        .route(endpoints::BAR_CHART, get(get_bar_chart::<S>))
        .route(endpoints::PIE_CHART, get(get_pie_chart::<S>))
        .route(endpoints::COMBINED, get(get_combined::<S>))
        .layer(middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        AnalyticsConfig, AppState, ListingDecemberWrap, endpoints,
        test_utils::{FailingStore, StoreOperation, get_test_store, sample_transactions},
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            get_test_store(sample_transactions()),
            AnalyticsConfig::default(),
        );

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn transactions_returns_page_and_total() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "6")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][0]["title"], "Rain Jacket Women Windbreaker");
        assert_eq!(body["data"][0]["price"], 300.0);
        assert_eq!(body["data"][0]["sold"], true);
        assert_eq!(body["data"][0]["category"], "women's clothing");
        assert_eq!(body["data"][0]["dateOfSale"], "2023-06-15T14:59:54Z");
    }

    #[tokio::test]
    async fn transactions_respects_page_size() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", "2")
            .add_query_param("perPage", "4")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total"], 15);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(4));
        assert_eq!(
            body["data"][0]["title"],
            "John Hardy Women's Legends Naga Gold & Silver Dragon Station Chain Bracelet"
        );
    }

    #[tokio::test]
    async fn transactions_without_month_is_ok() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("search", "monitor")
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["total"], 2);
    }

    #[tokio::test]
    async fn transactions_rejects_invalid_page() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", "0")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn december_listing_can_be_configured() {
        let config = AnalyticsConfig {
            listing_december_wrap: ListingDecemberWrap::NextYear,
            ..Default::default()
        };
        let state = AppState::new(get_test_store(sample_transactions()), config);
        let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "12")
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["total"], 1);
    }

    #[tokio::test]
    async fn statistics_uses_camel_case_fields() {
        let server = get_test_server();

        let response = server
            .get(endpoints::STATISTICS)
            .add_query_param("month", "3")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["totalSale"].is_number());
        assert!(body["soldCount"].is_u64());
        assert!(body["notSoldCount"].is_u64());
    }

    #[tokio::test]
    async fn month_is_required_and_checked() {
        let server = get_test_server();

        for endpoint in [
            endpoints::STATISTICS,
            endpoints::BAR_CHART,
            endpoints::PIE_CHART,
            endpoints::COMBINED,
        ] {
            server
                .get(endpoint)
                .await
                .assert_status(StatusCode::BAD_REQUEST);

            for month in ["0", "13", "june", "1.5"] {
                server
                    .get(endpoint)
                    .add_query_param("month", month)
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            }
        }
    }

    #[tokio::test]
    async fn bar_chart_lists_buckets_in_order() {
        let server = get_test_server();

        let response = server
            .get(endpoints::BAR_CHART)
            .add_query_param("month", "3")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let labels: Vec<_> = body
            .as_array()
            .expect("bar chart should be a JSON array")
            .iter()
            .map(|bucket| bucket["range"].as_str().unwrap_or_default().to_owned())
            .collect();
        assert_eq!(
            labels,
            [
                "0-100",
                "101-200",
                "201-300",
                "301-400",
                "401-500",
                "501-600",
                "601-700",
                "701-800",
                "801-900",
                "901-above",
            ]
        );
        assert_eq!(body[0], json!({"range": "0-100", "count": 7}));
    }

    #[tokio::test]
    async fn pie_chart_uses_id_for_category() {
        let server = get_test_server();

        let response = server
            .get(endpoints::PIE_CHART)
            .add_query_param("month", "12")
            .await;

        response.assert_status_ok();
        response.assert_json(&json!([
            {"_id": "electronics", "count": 3},
            {"_id": "jewelery", "count": 3},
            {"_id": "men's clothing", "count": 1},
            {"_id": "women's clothing", "count": 4},
        ]));
    }

    #[tokio::test]
    async fn combined_has_every_view() {
        let server = get_test_server();

        let response = server
            .get(endpoints::COMBINED)
            .add_query_param("month", "6")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["transactions"]["total"], 2);
        assert!(body["statistics"]["soldCount"].is_u64());
        assert_eq!(body["barChart"].as_array().map(Vec::len), Some(10));
        assert_eq!(body["pieChart"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn combined_rejects_invalid_pagination() {
        let server = get_test_server();

        for (name, value) in [("page", "0"), ("page", "abc"), ("perPage", "-4")] {
            server
                .get(endpoints::COMBINED)
                .add_query_param("month", "3")
                .add_query_param(name, value)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn store_failure_is_server_error_without_partial_body() {
        let state = AppState::new(
            FailingStore::new(StoreOperation::SumPrice),
            AnalyticsConfig::default(),
        );
        let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

        let response = server
            .get(endpoints::COMBINED)
            .add_query_param("month", "3")
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.text();
        assert!(!body.contains("transactions"));
        assert!(!body.contains("SumPrice"));
    }

    #[tokio::test]
    async fn unknown_timezone_is_server_error() {
        let config = AnalyticsConfig {
            local_timezone: "Not/AZone".to_owned(),
            ..Default::default()
        };
        let state = AppState::new(get_test_store(sample_transactions()), config);
        let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

        let response = server
            .get(endpoints::STATISTICS)
            .add_query_param("month", "3")
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
