//! Newsletter subscription flow
//!
//! 1. Look the email up in the Admin API.
//! 2. Already subscribed: nothing to do.
//! 3. Unknown email: create a subscriber tagged `newsletter`.
//! 4. Known customer: flip their consent to subscribed.
//!
//! The service does not touch the page session; callers record the returned
//! marketing state themselves.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::client::AdminClient;
use super::types::{Customer, EmailMarketingConsent};
use crate::core::{StorefrontResult, ValidationError};

/// Body of the newsletter form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewsletterForm {
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
}

/// Subscribes shoppers through an [`AdminClient`]
#[derive(Clone)]
pub struct NewsletterService {
    client: Arc<dyn AdminClient>,
}

impl NewsletterService {
    pub fn new(client: Arc<dyn AdminClient>) -> Self {
        Self { client }
    }

    pub async fn subscribe(&self, form: NewsletterForm) -> StorefrontResult<Option<Customer>> {
        let email = form
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ValidationError::field("email", "Email is required"))?
            .to_string();

        NewsletterForm {
            email: Some(email.clone()),
        }
        .validate()?;

        let existing = self.client.customer_consent(&email).await?;

        let subscriber = match existing {
            Some(customer) if customer.is_subscribed() => {
                tracing::debug!(customer_id = %customer.id, "customer already subscribed");
                Some(customer)
            }
            Some(customer) => {
                tracing::info!(customer_id = %customer.id, "updating marketing consent");
                let consent = EmailMarketingConsent::subscribed_at(Utc::now());
                self.client
                    .update_marketing_consent(&customer.id, &consent)
                    .await?
            }
            None => {
                tracing::info!("creating newsletter subscriber");
                let consent = EmailMarketingConsent::subscribed_at(Utc::now());
                self.client.create_subscriber(&email, &consent).await?
            }
        };

        Ok(subscriber)
    }
}
