use crate::config::AppConfig;
use crate::error::AppError;
use hmac::{Hmac, Mac};
use megaphone::db::{DbError, PgPool};
use megaphone::models::PaymentStatus;
use megaphone::update_payments_by_order_id;
use reqwest::Client;
use serde_json::{json, Value};
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const RAZORPAY_BASE_URL: &str = "https://api.razorpay.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin Razorpay REST client for the order-creation path. Reconciliation
/// of asynchronous events happens in `apply_payment_event`.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    key_id: Option<String>,
    key_secret: Option<String>,
}

impl RazorpayClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client must build");

        RazorpayClient {
            client,
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
        }
    }

    /// Creates a gateway order for an amount in minor units. The full
    /// response is returned opaque so callers can persist it for audit.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        notes: Option<&Value>,
    ) -> Result<Value, AppError> {
        let (key_id, key_secret) = match (&self.key_id, &self.key_secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(AppError::Upstream(
                    "Razorpay env not configured".to_string(),
                ))
            }
        };

        let payload = json!({
            "amount": amount,
            "currency": currency,
            "receipt": Uuid::new_v4().to_string(),
            "notes": notes.cloned().unwrap_or_else(|| json!({})),
        });

        let response = self
            .client
            .post(format!("{}/orders", RAZORPAY_BASE_URL))
            .basic_auth(key_id, Some(key_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Order creation failed ({}): {}",
                status, body
            )));
        }

        Ok(body)
    }
}

/// Hex-encoded HMAC-SHA256 over the raw request body, compared in constant
/// time against the signature header.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let signature = match hex::decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Event-type to status-transition mapping. Anything unrecognized updates
/// nothing; gateways send far more event types than we track.
pub fn status_for_event(event_type: &str) -> Option<PaymentStatus> {
    if event_type == "payment.captured" {
        Some(PaymentStatus::Captured)
    } else if event_type == "payment.authorized" {
        Some(PaymentStatus::Authorized)
    } else if event_type.starts_with("payment.failed") {
        Some(PaymentStatus::Failed)
    } else {
        None
    }
}

#[derive(Debug, PartialEq)]
pub struct PaymentEventFields {
    pub event_type: String,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub entity: Value,
}

pub fn extract_event_fields(event: &Value) -> PaymentEventFields {
    let entity = event
        .pointer("/payload/payment/entity")
        .cloned()
        .unwrap_or(Value::Null);

    PaymentEventFields {
        event_type: event
            .get("event")
            .and_then(|v| v.as_str())
            .unwrap_or("razorpay")
            .to_string(),
        order_id: entity
            .get("order_id")
            .and_then(|v| v.as_str())
            .map(String::from),
        payment_id: entity.get("id").and_then(|v| v.as_str()).map(String::from),
        entity,
    }
}

/// Applies one gateway event against every payment carrying its order id.
/// The payment id is recorded on capture; redelivered events re-apply the
/// same target status, so duplicates are harmless. Returns how many rows
/// changed.
pub fn apply_payment_event(pool: &PgPool, event: &Value) -> Result<usize, DbError> {
    let fields = extract_event_fields(event);

    let order_id = match fields.order_id {
        Some(order_id) => order_id,
        None => return Ok(0),
    };

    let new_status = match status_for_event(&fields.event_type) {
        Some(status) => status,
        None => return Ok(0),
    };

    let payment_id = if new_status == PaymentStatus::Captured {
        fields.payment_id.as_deref()
    } else {
        None
    };

    let updated =
        update_payments_by_order_id(pool, &order_id, new_status, payment_id, fields.entity)?;

    tracing::info!(
        "Webhook {} moved {} payment(s) on order {} to {}",
        fields.event_type,
        updated,
        order_id,
        new_status.as_str()
    );

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_signature_accepts_valid() {
        let body = br#"{"event":"payment.captured"}"#;
        let signature = sign("topsecret", body);
        assert!(verify_webhook_signature("topsecret", body, &signature));
    }

    #[test]
    fn test_signature_rejects_tampered_body() {
        let signature = sign("topsecret", b"original");
        assert!(!verify_webhook_signature("topsecret", b"tampered", &signature));
    }

    #[test]
    fn test_signature_rejects_wrong_secret() {
        let body = b"payload";
        let signature = sign("one-secret", body);
        assert!(!verify_webhook_signature("another-secret", body, &signature));
    }

    #[test]
    fn test_signature_rejects_garbage() {
        assert!(!verify_webhook_signature("secret", b"payload", "not-hex"));
        assert!(!verify_webhook_signature("secret", b"payload", ""));
    }

    #[test]
    fn test_status_for_event_mapping() {
        assert_eq!(
            status_for_event("payment.captured"),
            Some(PaymentStatus::Captured)
        );
        assert_eq!(
            status_for_event("payment.authorized"),
            Some(PaymentStatus::Authorized)
        );
        assert_eq!(
            status_for_event("payment.failed"),
            Some(PaymentStatus::Failed)
        );
        assert_eq!(
            status_for_event("payment.failed.timeout"),
            Some(PaymentStatus::Failed)
        );
        assert_eq!(status_for_event("order.paid"), None);
        assert_eq!(status_for_event(""), None);
    }

    #[test]
    fn test_extract_event_fields() {
        let event = serde_json::json!({
            "event": "payment.captured",
            "payload": {
                "payment": {
                    "entity": {
                        "id": "pay_123",
                        "order_id": "order_456",
                        "amount": 50000,
                    }
                }
            }
        });

        let fields = extract_event_fields(&event);
        assert_eq!(fields.event_type, "payment.captured");
        assert_eq!(fields.order_id.as_deref(), Some("order_456"));
        assert_eq!(fields.payment_id.as_deref(), Some("pay_123"));
        assert_eq!(fields.entity.get("amount").unwrap(), 50000);
    }

    #[test]
    fn test_extract_event_fields_missing_payload() {
        let fields = extract_event_fields(&serde_json::json!({"event": "ping"}));
        assert_eq!(fields.event_type, "ping");
        assert_eq!(fields.order_id, None);
        assert_eq!(fields.payment_id, None);
    }
}
