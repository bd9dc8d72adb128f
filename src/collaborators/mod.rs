//! Boundaries to services the gateway does not own
//!
//! The surrounding product talks to a document store, a payment provider, an
//! email service and an identity provider. Only the identity check is wired
//! into the gateway; the other traits fix the shape of those calls so callers
//! can be written and tested against fakes.

pub mod identity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GatewayResult;

pub use identity::HttpIdentityVerifier;

/// A stored document: its id and raw fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Read-all and append-only access to a document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_all(&self, collection: &str) -> GatewayResult<Vec<Document>>;

    async fn append_audit_record(&self, data: serde_json::Value) -> GatewayResult<()>;
}

/// Parameters for a hosted checkout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub price_id: String,
    /// Connected account that receives the funds
    pub destination_account: String,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
}

#[async_trait]
pub trait PaymentSessions: Send + Sync {
    async fn create_session(&self, request: CheckoutRequest) -> GatewayResult<CheckoutSession>;
}

/// An outbound email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: Email) -> GatewayResult<()>;
}

/// Notifier used when no email service is configured: accepts and drops
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredNotifier;

#[async_trait]
impl Notifier for UnconfiguredNotifier {
    async fn send(&self, email: Email) -> GatewayResult<()> {
        debug!(subject = %email.subject, "No email service configured, dropping message");
        Ok(())
    }
}

/// Identity established from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject_id: String,
}

/// Verifies bearer tokens against an identity provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a token to its subject, or fail with `Unauthorized`
    async fn verify_token(&self, token: &str) -> GatewayResult<VerifiedIdentity>;
}
