//! Admin API integration (newsletter subscription)

pub mod client;
pub mod documents;
pub mod newsletter;
pub mod types;

pub use client::{AdminClient, HttpAdminClient, NEWSLETTER_TAG};
pub use newsletter::{NewsletterForm, NewsletterService};
pub use types::{
    Customer, CustomerEmailMarketingState, CustomerMarketingOptInLevel, EmailMarketingConsent,
    UserError,
};
