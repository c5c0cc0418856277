//! GraphQL documents sent to the Admin API

const CUSTOMER_QUERY_FRAGMENT: &str = r#"
  fragment CustomerQueryItem on Customer {
    id
    defaultEmailAddress {
      emailAddress
      marketingOptInLevel
      marketingState
      marketingUpdatedAt
    }
  }
"#;

const CUSTOMER_MUTATE_FRAGMENT: &str = r#"
  fragment CustomerMutateItem on Customer {
    id
    email
    emailMarketingConsent {
      consentUpdatedAt
      marketingOptInLevel
      marketingState
    }
  }
"#;

const CUSTOMER_EMAIL_CONSENT_OPERATION: &str = r#"
  query CustomerByEmail($identifier: CustomerIdentifierInput!) {
    customer: customerByIdentifier(identifier: $identifier) {
      ...CustomerQueryItem
    }
  }
"#;

const UPDATE_MARKETING_CONSENT_OPERATION: &str = r#"
  mutation CustomerEmailMarketingConsentUpdate($input: CustomerEmailMarketingConsentUpdateInput!) {
    customerEmailMarketingConsentUpdate(input: $input) {
      customer {
        ...CustomerMutateItem
      }
      userErrors {
        field
        message
      }
    }
  }
"#;

const CREATE_SUBSCRIBER_OPERATION: &str = r#"
  mutation NewSubscriber($input: CustomerInput!) {
    customerCreate(input: $input) {
      customer {
        ...CustomerMutateItem
      }
      userErrors {
        field
        message
      }
    }
  }
"#;

/// A named operation plus the fragment it spreads
#[derive(Debug, Clone, Copy)]
pub struct Document {
    pub operation_name: &'static str,
    fragment: &'static str,
    body: &'static str,
}

impl Document {
    /// Full request text: fragment followed by the operation
    pub fn text(&self) -> String {
        format!("{}{}", self.fragment, self.body)
    }
}

pub const CUSTOMER_EMAIL_CONSENT_QUERY: Document = Document {
    operation_name: "CustomerByEmail",
    fragment: CUSTOMER_QUERY_FRAGMENT,
    body: CUSTOMER_EMAIL_CONSENT_OPERATION,
};

pub const UPDATE_CUSTOMER_MARKETING_CONSENT: Document = Document {
    operation_name: "CustomerEmailMarketingConsentUpdate",
    fragment: CUSTOMER_MUTATE_FRAGMENT,
    body: UPDATE_MARKETING_CONSENT_OPERATION,
};

pub const CREATE_SUBSCRIBER: Document = Document {
    operation_name: "NewSubscriber",
    fragment: CUSTOMER_MUTATE_FRAGMENT,
    body: CREATE_SUBSCRIBER_OPERATION,
};
