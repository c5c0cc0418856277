//! End-to-end tests simulating a browser talking to the storefront server
//!
//! These tests verify the complete flow from HTTP request to response,
//! including the session cookie, newsletter subscription against a fake
//! Admin API, recently viewed products and overlay transitions.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storefront::admin::EmailMarketingConsent;
use storefront::core::UpstreamError;
use storefront::prelude::*;

// =============================================================================
// Fake Admin API
// =============================================================================

#[derive(Clone, Default)]
struct FakeAdmin {
    customers: Arc<Mutex<HashMap<String, Customer>>>,
    taken: Arc<Mutex<Vec<String>>>,
    lookup_delay: Duration,
}

impl FakeAdmin {
    fn add(&self, email: &str, state: CustomerEmailMarketingState) {
        let customer = Customer {
            id: format!("gid://shopify/Customer/{}", self.customers.lock().unwrap().len() + 1),
            email: Some(email.to_string()),
            email_marketing_consent: Some(EmailMarketingConsent {
                consent_updated_at: None,
                marketing_opt_in_level: None,
                marketing_state: Some(state),
            }),
        };
        self.customers
            .lock()
            .unwrap()
            .insert(email.to_string(), customer);
    }

    fn state_of(&self, email: &str) -> Option<CustomerEmailMarketingState> {
        self.customers
            .lock()
            .unwrap()
            .get(email)
            .and_then(Customer::marketing_state)
    }
}

#[async_trait]
impl AdminClient for FakeAdmin {
    async fn customer_consent(&self, email: &str) -> StorefrontResult<Option<Customer>> {
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }
        Ok(self.customers.lock().unwrap().get(email).cloned())
    }

    async fn update_marketing_consent(
        &self,
        customer_id: &str,
        consent: &EmailMarketingConsent,
    ) -> StorefrontResult<Option<Customer>> {
        let mut customers = self.customers.lock().unwrap();
        let customer = customers.values_mut().find(|c| c.id == customer_id);
        Ok(customer.map(|c| {
            c.email_marketing_consent = Some(consent.clone());
            c.clone()
        }))
    }

    async fn create_subscriber(
        &self,
        email: &str,
        consent: &EmailMarketingConsent,
    ) -> StorefrontResult<Option<Customer>> {
        if self.taken.lock().unwrap().iter().any(|t| t == email) {
            return Err(UpstreamError::UserErrors {
                field: Some(vec!["email".to_string()]),
                message: "Email has already been taken".to_string(),
            }
            .into());
        }
        let mut customers = self.customers.lock().unwrap();
        let customer = Customer {
            id: format!("gid://shopify/Customer/{}", customers.len() + 1),
            email: Some(email.to_string()),
            email_marketing_consent: Some(consent.clone()),
        };
        customers.insert(email.to_string(), customer.clone());
        Ok(Some(customer))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn create_test_server() -> (TestServer, FakeAdmin) {
    server_with(FakeAdmin::default())
}

fn server_with(admin: FakeAdmin) -> (TestServer, FakeAdmin) {
    let app = StorefrontServerBuilder::new()
        .with_config(StorefrontConfig::default_config())
        .with_admin_client(admin.clone())
        .build()
        .expect("Failed to build router");
    let server = TestServer::try_new(app).expect("Failed to create test server");
    (server, admin)
}

/// `name=value` part of the session cookie set by a response
fn cookie_from(response: &TestResponse) -> HeaderValue {
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("response should start a session")
        .to_str()
        .unwrap();
    let pair = set_cookie.split(';').next().unwrap();
    HeaderValue::from_str(pair).unwrap()
}

// =============================================================================
// Catalog endpoints
// =============================================================================

mod catalog_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let (server, _) = create_test_server();

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "storefront-rs");
    }

    #[tokio::test]
    async fn test_collection_variables() {
        let (server, _) = create_test_server();

        let response = server
            .get("/collections/shirts/variables")
            .add_raw_query_param("sort_by=price-ascending&filter.v.price.gte=10&filter.v.price.lte=50")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(
            body,
            json!({
                "handle": "shirts",
                "filters": [{ "price": { "min": 10.0, "max": 50.0 } }],
                "sortKey": "PRICE",
                "reverse": false,
                "first": 8,
                "endCursor": null
            })
        );
    }

    #[tokio::test]
    async fn test_catalog_variables_uses_product_sort_keys() {
        let (server, _) = create_test_server();

        let response = server
            .get("/catalog/variables")
            .add_raw_query_param("sort_by=manual&cursor=abc&direction=previous")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["sortKey"], "ID");
        assert_eq!(body["last"], 12);
        assert_eq!(body["startCursor"], "abc");
        assert!(body.get("first").is_none());
    }

    #[tokio::test]
    async fn test_catalog_variables_without_query() {
        let (server, _) = create_test_server();

        let body: Value = server.get("/catalog/variables").await.json();
        assert_eq!(body, json!({ "filters": [], "first": 12, "endCursor": null }));
    }

    #[tokio::test]
    async fn test_sort_options() {
        let (server, _) = create_test_server();

        let response = server.get("/sort-options/collection").await;
        response.assert_status_ok();

        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 8);
        assert_eq!(body[0], json!({ "slug": "manual", "displayName": "Featured" }));
    }

    #[tokio::test]
    async fn test_sort_options_unknown_context() {
        let (server, _) = create_test_server();

        let response = server.get("/sort-options/widgets").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_PATH");
    }
}

// =============================================================================
// Session cookie
// =============================================================================

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_new_visitor_gets_cookie() {
        let (server, _) = create_test_server();

        let response = server.get("/overlay").await;
        response.assert_status_ok();

        let cookie = cookie_from(&response);
        assert!(cookie.to_str().unwrap().starts_with("storefront_session="));
    }

    #[tokio::test]
    async fn test_returning_visitor_keeps_cookie() {
        let (server, _) = create_test_server();
        let cookie = cookie_from(&server.get("/overlay").await);

        let response = server.get("/overlay").add_header(COOKIE, cookie).await;
        response.assert_status_ok();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_health_has_no_session() {
        let (server, _) = create_test_server();

        let response = server.get("/health").await;
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}

// =============================================================================
// Recently viewed
// =============================================================================

mod recent_tests {
    use super::*;

    #[tokio::test]
    async fn test_recent_builds_search_query() {
        let (server, _) = create_test_server();

        let first = server.post("/recent").form(&[("title", "Linen Shirt")]).await;
        first.assert_status_ok();
        let cookie = cookie_from(&first);

        let response = server
            .post("/recent")
            .add_header(COOKIE, cookie)
            .form(&[("title", "Wool Socks")])
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(
            body,
            json!({
                "recentlyViewedQuery": "title:Linen Shirt OR title:Wool Socks",
                "error": null
            })
        );
    }

    #[tokio::test]
    async fn test_recent_is_capped_and_deduplicated() {
        let (server, _) = create_test_server();
        let cookie = cookie_from(&server.get("/overlay").await);

        for title in ["A", "B", "C", "D", "B", "E"] {
            server
                .post("/recent")
                .add_header(COOKIE, cookie.clone())
                .form(&[("title", title)])
                .await
                .assert_status_ok();
        }

        let body: Value = server
            .post("/recent")
            .add_header(COOKIE, cookie)
            .form(&[("title", "E")])
            .await
            .json();
        assert_eq!(body["recentlyViewedQuery"], "title:C OR title:D OR title:B OR title:E");
    }

    #[tokio::test]
    async fn test_recent_requires_title() {
        let (server, _) = create_test_server();

        let response = server.post("/recent").form(&[("title", "  ")]).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(
            body,
            json!({
                "recentlyViewedQuery": null,
                "error": { "field": ["title"], "message": "title is required" }
            })
        );
    }

    #[tokio::test]
    async fn test_recent_without_title_field() {
        let (server, _) = create_test_server();

        let response = server.post("/recent").form(&[("other", "x")]).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["recentlyViewedQuery"], Value::Null);
        assert_eq!(body["error"]["message"], "title is required");
    }

    #[tokio::test]
    async fn test_get_redirects_home() {
        let (server, _) = create_test_server();

        let response = server.get("/recent").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/");
    }
}

// =============================================================================
// Newsletter
// =============================================================================

mod newsletter_tests {
    use super::*;

    #[tokio::test]
    async fn test_new_email_is_subscribed() {
        let (server, admin) = create_test_server();

        let response = server
            .post("/newsletter")
            .form(&[("email", "new@example.com")])
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["error"], Value::Null);
        assert_eq!(body["subscriber"]["email"], "new@example.com");
        assert_eq!(
            body["subscriber"]["emailMarketingConsent"]["marketingState"],
            "SUBSCRIBED"
        );
        assert_eq!(
            admin.state_of("new@example.com"),
            Some(CustomerEmailMarketingState::Subscribed)
        );
    }

    #[tokio::test]
    async fn test_existing_customer_is_updated() {
        let (server, admin) = create_test_server();
        admin.add("old@example.com", CustomerEmailMarketingState::NotSubscribed);

        let response = server
            .post("/newsletter")
            .form(&[("email", "old@example.com")])
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["subscriber"]["id"], "gid://shopify/Customer/1");
        assert_eq!(
            admin.state_of("old@example.com"),
            Some(CustomerEmailMarketingState::Subscribed)
        );
    }

    #[tokio::test]
    async fn test_already_subscribed_returns_customer() {
        let (server, admin) = create_test_server();
        admin.add("fan@example.com", CustomerEmailMarketingState::Subscribed);

        let body: Value = server
            .post("/newsletter")
            .form(&[("email", "fan@example.com")])
            .await
            .json();
        assert_eq!(body["subscriber"]["email"], "fan@example.com");
    }

    #[tokio::test]
    async fn test_missing_email() {
        let (server, _) = create_test_server();

        let response = server.post("/newsletter").form(&[("email", "")]).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(
            body,
            json!({
                "subscriber": null,
                "error": { "field": ["email"], "message": "Email is required" }
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let (server, _) = create_test_server();

        let response = server
            .post("/newsletter")
            .form(&[("email", "not-an-email")])
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["subscriber"], Value::Null);
        assert_eq!(body["error"]["message"], "Email is invalid");
        assert_eq!(body["error"]["field"], json!(["email"]));
    }

    #[tokio::test]
    async fn test_user_errors_are_unprocessable() {
        let (server, admin) = create_test_server();
        admin.taken.lock().unwrap().push("dup@example.com".to_string());

        let response = server
            .post("/newsletter")
            .form(&[("email", "dup@example.com")])
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(
            body,
            json!({
                "subscriber": null,
                "error": { "field": ["email"], "message": "Email has already been taken" }
            })
        );
    }

    #[tokio::test]
    async fn test_disabled_without_admin_client() {
        let app = StorefrontServerBuilder::new()
            .with_config(StorefrontConfig::default_config())
            .build()
            .unwrap();
        let server = TestServer::try_new(app).unwrap();

        let response = server
            .post("/newsletter")
            .form(&[("email", "new@example.com")])
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = response.json();
        assert_eq!(body["subscriber"], Value::Null);
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("shop.admin_access_token")
        );
        assert!(body["error"].get("field").is_none());
    }

    #[tokio::test]
    async fn test_slow_subscribe_keeps_concurrent_session_changes() {
        let (server, _) = server_with(FakeAdmin {
            lookup_delay: Duration::from_millis(300),
            ..FakeAdmin::default()
        });
        let cookie = cookie_from(&server.get("/overlay").await);

        let subscribe = async {
            server
                .post("/newsletter")
                .add_header(COOKIE, cookie.clone())
                .form(&[("email", "slow@example.com")])
                .await
        };

        let browse = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            server
                .post("/recent")
                .add_header(COOKIE, cookie.clone())
                .form(&[("title", "Shirt")])
                .await
                .assert_status_ok();
            server
                .post("/overlay/open")
                .add_header(COOKIE, cookie.clone())
                .json(&json!({ "kind": "cart" }))
                .await
                .assert_status_ok();
            server
                .post("/recent")
                .add_header(COOKIE, cookie.clone())
                .form(&[("title", "Hat")])
                .await
                .assert_status_ok();
        };

        let (subscribed, ()) = tokio::join!(subscribe, browse);
        subscribed.assert_status_ok();

        let recent: Value = server
            .post("/recent")
            .add_header(COOKIE, cookie.clone())
            .form(&[("title", "Hat")])
            .await
            .json();
        assert_eq!(recent["recentlyViewedQuery"], "title:Shirt OR title:Hat");

        let overlay: Value = server.get("/overlay").add_header(COOKIE, cookie).await.json();
        assert_eq!(overlay["active"], "cart");
    }
}

// =============================================================================
// Overlay
// =============================================================================

mod overlay_tests {
    use super::*;

    async fn session(server: &TestServer) -> HeaderValue {
        cookie_from(&server.get("/overlay").await)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (server, _) = create_test_server();

        let body: Value = server.get("/overlay").await.json();
        assert_eq!(
            body,
            json!({ "active": "closed", "selectedProduct": null, "selectedVariant": null })
        );
    }

    #[tokio::test]
    async fn test_open_cart_then_search() {
        let (server, _) = create_test_server();
        let cookie = session(&server).await;

        server
            .post("/overlay/open")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "kind": "cart" }))
            .await
            .assert_status_ok();

        let body: Value = server
            .post("/overlay/open")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "kind": "search" }))
            .await
            .json();
        assert_eq!(body["active"], "search");

        let body: Value = server.get("/overlay").add_header(COOKIE, cookie).await.json();
        assert_eq!(body["active"], "search");
    }

    #[tokio::test]
    async fn test_quick_add_flow_and_close() {
        let (server, _) = create_test_server();
        let cookie = session(&server).await;

        server
            .put("/overlay/product")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "id": "gid://shopify/Product/1", "handle": "shirt" }))
            .await
            .assert_status_ok();
        server
            .put("/overlay/variant")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "id": "gid://shopify/ProductVariant/11" }))
            .await
            .assert_status_ok();

        let opened: Value = server
            .post("/overlay/open")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "kind": "product-form" }))
            .await
            .json();
        assert_eq!(opened["active"], "product-form");
        assert_eq!(opened["selectedProduct"]["handle"], "shirt");
        assert_eq!(opened["selectedVariant"]["id"], "gid://shopify/ProductVariant/11");

        let closed: Value = server
            .post("/overlay/close")
            .add_header(COOKIE, cookie.clone())
            .await
            .json();
        assert_eq!(
            closed,
            json!({ "active": "closed", "selectedProduct": null, "selectedVariant": null })
        );

        let again: Value = server
            .post("/overlay/close")
            .add_header(COOKIE, cookie)
            .await
            .json();
        assert_eq!(again, closed);
    }

    #[tokio::test]
    async fn test_clear_selection_with_null() {
        let (server, _) = create_test_server();
        let cookie = session(&server).await;

        server
            .put("/overlay/product")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "id": "gid://shopify/Product/1", "handle": "shirt" }))
            .await
            .assert_status_ok();

        let body: Value = server
            .put("/overlay/product")
            .add_header(COOKIE, cookie)
            .json(&Value::Null)
            .await
            .json();
        assert_eq!(body["selectedProduct"], Value::Null);
    }

    #[tokio::test]
    async fn test_escape_closes() {
        let (server, _) = create_test_server();
        let cookie = session(&server).await;

        server
            .post("/overlay/open")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "kind": "mobile" }))
            .await
            .assert_status_ok();

        let ignored: Value = server
            .post("/overlay/keydown")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "key": "Enter" }))
            .await
            .json();
        assert_eq!(ignored["active"], "mobile");

        let closed: Value = server
            .post("/overlay/keydown")
            .add_header(COOKIE, cookie)
            .json(&json!({ "key": "Escape" }))
            .await
            .json();
        assert_eq!(closed["active"], "closed");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (server, _) = create_test_server();
        let alice = session(&server).await;
        let bob = session(&server).await;

        server
            .post("/overlay/open")
            .add_header(COOKIE, alice.clone())
            .json(&json!({ "kind": "cart" }))
            .await
            .assert_status_ok();

        let body: Value = server.get("/overlay").add_header(COOKIE, bob).await.json();
        assert_eq!(body["active"], "closed");

        let body: Value = server.get("/overlay").add_header(COOKIE, alice).await.json();
        assert_eq!(body["active"], "cart");
    }

    #[tokio::test]
    async fn test_reset_returns_to_initial_state() {
        let (server, _) = create_test_server();
        let cookie = session(&server).await;

        server
            .post("/overlay/open")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "kind": "submenu" }))
            .await
            .assert_status_ok();

        server
            .put("/overlay/product")
            .add_header(COOKIE, cookie.clone())
            .json(&json!({ "id": "gid://shopify/Product/1", "handle": "shirt" }))
            .await
            .assert_status_ok();

        let body: Value = server
            .delete("/overlay")
            .add_header(COOKIE, cookie)
            .await
            .json();
        assert_eq!(
            body,
            json!({ "active": "closed", "selectedProduct": null, "selectedVariant": null })
        );
    }

    #[tokio::test]
    async fn test_unknown_kind_rejected() {
        let (server, _) = create_test_server();

        let response = server
            .post("/overlay/open")
            .json(&json!({ "kind": "drawer" }))
            .await;
        assert!(response.status_code().is_client_error());
    }
}
