//! Request and response types exchanged over the public REST API.
//!
//! All bodies are JSON with camelCase field names. None of the response types
//! carry the sealed secret columns; the only way to read a secret is
//! [`SecretResponse`] from the dedicated secret endpoint.

use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Kind of vault item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Subscription,
    Account,
}

impl ItemType {
    /// Parse the query-string form (`SUBSCRIPTION` / `ACCOUNT`).
    pub fn from_query(s: &str) -> Option<Self> {
        match s {
            "SUBSCRIPTION" => Some(ItemType::Subscription),
            "ACCOUNT" => Some(ItemType::Account),
            _ => None,
        }
    }
}

/// Billing period of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingDuration {
    Monthly,
    Semiannual,
    Annual,
}

impl BillingDuration {
    /// Number of months covered by one billing period.
    pub fn months(self) -> u32 {
        match self {
            BillingDuration::Monthly => 1,
            BillingDuration::Semiannual => 6,
            BillingDuration::Annual => 12,
        }
    }
}

/// A numeric form field that may arrive as a JSON number or as a string
/// (form-encoded clients send `"9.99"` or `""`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberField {
    Number(f64),
    Text(String),
}

// ---------------------------------------------------------------------------
// Item endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /api/items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(rename = "type", default, deserialize_with = "non_null")]
    pub item_type: Option<ItemType>,
    #[serde(default, deserialize_with = "non_null")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub email: Option<String>,
    /// Plaintext secret. Empty or absent means "no secret".
    #[serde(default, deserialize_with = "non_null")]
    pub password: Option<String>,
    pub value: Option<NumberField>,
    pub billing_day: Option<NumberField>,
    #[serde(default, deserialize_with = "non_null")]
    pub duration: Option<BillingDuration>,
    #[serde(default, deserialize_with = "non_null")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub icon_path: Option<String>,
}

/// Request body for `PATCH /api/items/:id`.
///
/// Absent fields are left unchanged. An empty `password` clears the stored
/// secret; an empty `email`, `notes` or `iconPath` clears that field.
/// Explicit `null` is rejected everywhere except `value` and `billingDay`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(rename = "type", default, deserialize_with = "non_null")]
    pub item_type: Option<ItemType>,
    #[serde(default, deserialize_with = "non_null")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub password: Option<String>,
    pub value: Option<NumberField>,
    pub billing_day: Option<NumberField>,
    #[serde(default, deserialize_with = "non_null")]
    pub duration: Option<BillingDuration>,
    #[serde(default, deserialize_with = "non_null")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub icon_path: Option<String>,
}

/// Optional field that may be omitted but not sent as `null`.
fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)?
        .map(Some)
        .ok_or_else(|| D::Error::custom("field must not be null"))
}

/// Query string for `GET /api/items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListItemsQuery {
    /// `SUBSCRIPTION` or `ACCOUNT`; any other value disables the filter.
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    /// Case-insensitive substring match on the item name.
    pub search: Option<String>,
}

/// Public view of an item. Never includes secret material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    pub email: Option<String>,
    pub value: Option<f64>,
    pub billing_day: Option<u8>,
    pub duration: Option<BillingDuration>,
    pub notes: Option<String>,
    pub icon_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response body for `GET /api/items/:id/secret`.
///
/// `password: null` means no secret is set, not that decryption failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretResponse {
    pub password: Option<String>,
}

/// Response body for `DELETE /api/items/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// One subscription in the upcoming-billing list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBilling {
    pub id: Uuid,
    pub name: String,
    pub value: f64,
    pub billing_day: u8,
    pub duration: BillingDuration,
}

/// Response body for `GET /api/items/stats/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Sum of all subscriptions normalised to a monthly amount, 2 decimals.
    pub monthly_total: f64,
    /// At most five subscriptions ordered by billing day.
    pub upcoming_billings: Vec<UpcomingBilling>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
