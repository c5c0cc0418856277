//! Admin API client

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use super::documents::{
    CREATE_SUBSCRIBER, CUSTOMER_EMAIL_CONSENT_QUERY, Document, UPDATE_CUSTOMER_MARKETING_CONSENT,
};
use super::types::{Customer, CustomerMutationPayload, CustomerQueryItem, EmailMarketingConsent};
use crate::config::ShopConfig;
use crate::core::{ConfigError, StorefrontResult, UpstreamError};

/// Tag applied to customers created from the newsletter form
pub const NEWSLETTER_TAG: &str = "newsletter";

/// Operations the newsletter flow needs from the Admin API
#[async_trait]
pub trait AdminClient: Send + Sync {
    /// Look up a customer and their consent by email address
    async fn customer_consent(&self, email: &str) -> StorefrontResult<Option<Customer>>;

    /// Overwrite the email marketing consent of an existing customer
    async fn update_marketing_consent(
        &self,
        customer_id: &str,
        consent: &EmailMarketingConsent,
    ) -> StorefrontResult<Option<Customer>>;

    /// Create a customer that only exists as a newsletter subscriber
    async fn create_subscriber(
        &self,
        email: &str,
        consent: &EmailMarketingConsent,
    ) -> StorefrontResult<Option<Customer>>;
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CustomerByEmailData {
    customer: Option<CustomerQueryItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsentUpdateData {
    customer_email_marketing_consent_update: Option<CustomerMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerCreateData {
    customer_create: Option<CustomerMutationPayload>,
}

/// [`AdminClient`] over HTTPS with a private app access token
#[derive(Debug, Clone)]
pub struct HttpAdminClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl HttpAdminClient {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> StorefrontResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        })
    }

    /// Client for the shop described by `config`
    pub fn from_config(config: &ShopConfig) -> StorefrontResult<Self> {
        let token = config
            .admin_access_token
            .clone()
            .ok_or_else(|| ConfigError::MissingValue {
                field: "shop.admin_access_token".to_string(),
            })?;
        Self::new(config.admin_endpoint(), token)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        document: Document,
        variables: Value,
    ) -> StorefrontResult<T> {
        tracing::debug!(operation = document.operation_name, "admin API request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&json!({
                "query": document.text(),
                "operationName": document.operation_name,
                "variables": variables,
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: GraphQLResponse<T> = response.json().await?;
        match body.data {
            Some(data) => Ok(data),
            None => {
                let errors = body.errors.map(|e| e.to_string()).unwrap_or_default();
                tracing::error!(operation = document.operation_name, %errors, "admin API returned no data");
                Err(UpstreamError::GraphQL {
                    operation: document.operation_name.to_string(),
                    errors,
                }
                .into())
            }
        }
    }
}

#[async_trait]
impl AdminClient for HttpAdminClient {
    async fn customer_consent(&self, email: &str) -> StorefrontResult<Option<Customer>> {
        let data: CustomerByEmailData = self
            .execute(
                CUSTOMER_EMAIL_CONSENT_QUERY,
                json!({ "identifier": { "emailAddress": email } }),
            )
            .await?;
        Ok(data.customer.map(Customer::from))
    }

    async fn update_marketing_consent(
        &self,
        customer_id: &str,
        consent: &EmailMarketingConsent,
    ) -> StorefrontResult<Option<Customer>> {
        let data: ConsentUpdateData = self
            .execute(
                UPDATE_CUSTOMER_MARKETING_CONSENT,
                json!({
                    "input": {
                        "customerId": customer_id,
                        "emailMarketingConsent": consent,
                    }
                }),
            )
            .await?;

        match data.customer_email_marketing_consent_update {
            Some(payload) => Ok(payload.into_result()?),
            None => Ok(None),
        }
    }

    async fn create_subscriber(
        &self,
        email: &str,
        consent: &EmailMarketingConsent,
    ) -> StorefrontResult<Option<Customer>> {
        let data: CustomerCreateData = self
            .execute(
                CREATE_SUBSCRIBER,
                json!({
                    "input": {
                        "email": email,
                        "emailMarketingConsent": consent,
                        "tags": [NEWSLETTER_TAG],
                    }
                }),
            )
            .await?;

        match data.customer_create {
            Some(payload) => Ok(payload.into_result()?),
            None => Ok(None),
        }
    }
}
