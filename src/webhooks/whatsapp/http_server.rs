use actix_web::{get, post, web, HttpResponse, Responder};
use megaphone::create_webhook_event;
use megaphone::db::PgPool;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ProviderQuery {
    pub provider: Option<String>,
}

/// Delivery/read receipts and inbound messages from the WhatsApp channel
/// providers. Payloads are only archived for replay and debugging; no
/// state transition hangs off them yet.
#[post("/webhooks/whatsapp")]
pub async fn handle_whatsapp_webhook(
    query: web::Query<ProviderQuery>,
    body: web::Bytes,
    pool: web::Data<PgPool>,
) -> impl Responder {
    let provider = query
        .provider
        .as_deref()
        .unwrap_or("META")
        .to_uppercase();

    let payload = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    if let Err(e) = create_webhook_event(&pool, &provider, "whatsapp-webhook", payload) {
        tracing::error!("Failed to log whatsapp webhook event: {}", e);
    }

    HttpResponse::Ok().body("ok")
}

/// Provider verification handshakes probe with a GET.
#[get("/webhooks/whatsapp")]
pub async fn verify_whatsapp_webhook() -> impl Responder {
    "ok"
}
