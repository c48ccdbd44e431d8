use crate::config::AppConfig;
use crate::services::payments::{apply_payment_event, verify_webhook_signature};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use megaphone::create_webhook_event;
use megaphone::db::PgPool;
use serde_json::Value;

pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Inbound payment-gateway events. The gateway retries on any non-2xx, so
/// after the signature gate everything downstream is best-effort: parse and
/// reconciliation problems are logged, the audit row is written if it can
/// be, and the response is 200 "ok" regardless.
///
/// Signature checking happens before anything is persisted; an
/// unauthenticated payload never reaches the audit log.
#[post("/webhooks/razorpay")]
pub async fn handle_razorpay_webhook(
    req: HttpRequest,
    body: web::Bytes,
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    if config.require_webhook_signature {
        let secret = match &config.razorpay_webhook_secret {
            Some(secret) => secret,
            None => {
                tracing::error!("Webhook signature required but no secret is configured");
                return HttpResponse::BadRequest().body("Invalid signature");
            }
        };

        let signature = req
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());

        match signature {
            Some(signature) if verify_webhook_signature(secret, &body, signature) => {}
            _ => {
                tracing::warn!("Rejected razorpay webhook with missing or invalid signature");
                return HttpResponse::BadRequest().body("Invalid signature");
            }
        }
    }

    let (event, event_type) = match serde_json::from_slice::<Value>(&body) {
        Ok(event) => {
            let event_type = event
                .get("event")
                .and_then(|v| v.as_str())
                .unwrap_or("razorpay")
                .to_string();
            (event, event_type)
        }
        Err(e) => {
            tracing::warn!("Unparseable razorpay webhook payload: {}", e);
            (
                Value::String(String::from_utf8_lossy(&body).into_owned()),
                "unparseable".to_string(),
            )
        }
    };

    if event.is_object() {
        if let Err(e) = apply_payment_event(&pool, &event) {
            tracing::error!("Failed to apply razorpay event {}: {}", event_type, e);
        }
    }

    if let Err(e) = create_webhook_event(&pool, "RAZORPAY", &event_type, event) {
        tracing::error!("Failed to log razorpay webhook event: {}", e);
    }

    HttpResponse::Ok().body("ok")
}
