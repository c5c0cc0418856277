//! Admin API customer types used by the newsletter flow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::UpstreamError;

/// Email marketing state of a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerEmailMarketingState {
    Invalid,
    NotSubscribed,
    Pending,
    Redacted,
    Subscribed,
    Unsubscribed,
}

/// How the customer opted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerMarketingOptInLevel {
    ConfirmedOptIn,
    SingleOptIn,
    Unknown,
}

/// Consent block, both as read from and written to the Admin API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMarketingConsent {
    #[serde(default)]
    pub consent_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub marketing_opt_in_level: Option<CustomerMarketingOptInLevel>,
    #[serde(default)]
    pub marketing_state: Option<CustomerEmailMarketingState>,
}

impl EmailMarketingConsent {
    /// Single opt-in subscription stamped with `now`
    pub fn subscribed_at(now: DateTime<Utc>) -> Self {
        Self {
            consent_updated_at: Some(now),
            marketing_opt_in_level: Some(CustomerMarketingOptInLevel::SingleOptIn),
            marketing_state: Some(CustomerEmailMarketingState::Subscribed),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.marketing_state == Some(CustomerEmailMarketingState::Subscribed)
    }
}

/// A subscriber as returned to the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_marketing_consent: Option<EmailMarketingConsent>,
}

impl Customer {
    pub fn is_subscribed(&self) -> bool {
        self.email_marketing_consent
            .as_ref()
            .is_some_and(EmailMarketingConsent::is_subscribed)
    }

    pub fn marketing_state(&self) -> Option<CustomerEmailMarketingState> {
        self.email_marketing_consent
            .as_ref()
            .and_then(|c| c.marketing_state)
    }
}

/// `userErrors` entry of an Admin API mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Common shape of `customerCreate` / `customerEmailMarketingConsentUpdate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMutationPayload {
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

impl CustomerMutationPayload {
    /// The first user error wins, as the form shows a single message
    pub fn into_result(self) -> Result<Option<Customer>, UpstreamError> {
        match self.user_errors.into_iter().next() {
            Some(UserError { field, message }) => Err(UpstreamError::UserErrors { field, message }),
            None => Ok(self.customer),
        }
    }
}

/// `customerByIdentifier` result shape
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerQueryItem {
    pub id: String,
    #[serde(default)]
    pub default_email_address: Option<DefaultEmailAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DefaultEmailAddress {
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub marketing_opt_in_level: Option<CustomerMarketingOptInLevel>,
    #[serde(default)]
    pub marketing_state: Option<CustomerEmailMarketingState>,
    #[serde(default)]
    pub marketing_updated_at: Option<DateTime<Utc>>,
}

impl From<CustomerQueryItem> for Customer {
    fn from(item: CustomerQueryItem) -> Self {
        let address = item.default_email_address;
        Customer {
            id: item.id,
            email: address.as_ref().and_then(|a| a.email_address.clone()),
            email_marketing_consent: address.map(|a| EmailMarketingConsent {
                consent_updated_at: a.marketing_updated_at,
                marketing_opt_in_level: a.marketing_opt_in_level,
                marketing_state: a.marketing_state,
            }),
        }
    }
}
