use crate::auth::TenantContext;
use crate::error::AppError;
use crate::services::payments::RazorpayClient;
use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use megaphone::db::PgPool;
use megaphone::{create_payment, find_contact_by_id, get_payments_with_contact, PaymentInput};
use serde::{Deserialize, Serialize};
use serde_json::json;

const CURRENCY: &str = "INR";

#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub id: i32,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[get("/payments")]
pub async fn list_payments(
    pool: web::Data<PgPool>,
    ctx: TenantContext,
) -> Result<HttpResponse, AppError> {
    let rows = get_payments_with_contact(&pool, ctx.tenant_id)?;

    let payments: Vec<PaymentView> = rows
        .into_iter()
        .map(|(payment, contact)| PaymentView {
            id: payment.id,
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status,
            contact_name: contact.name,
            contact_phone: contact.phone,
            razorpay_order_id: payment.razorpay_order_id,
            razorpay_payment_id: payment.razorpay_payment_id,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(payments))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub contact_id: i32,
    pub amount_in_paise: i64,
    pub notes: Option<serde_json::Value>,
}

#[post("/payments")]
pub async fn create_payment_endpoint(
    pool: web::Data<PgPool>,
    razorpay: web::Data<RazorpayClient>,
    ctx: TenantContext,
    body: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    if request.amount_in_paise <= 0 {
        return Err(AppError::Validation(
            "Amount must be a positive number of paise".to_string(),
        ));
    }

    let contact = find_contact_by_id(&pool, ctx.tenant_id, request.contact_id)?
        .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))?;

    let order = razorpay
        .create_order(request.amount_in_paise, CURRENCY, request.notes.as_ref())
        .await?;

    let order_id = order.get("id").and_then(|v| v.as_str());

    let payment = create_payment(
        &pool,
        PaymentInput {
            tenant_id: ctx.tenant_id,
            contact_id: contact.id,
            amount: request.amount_in_paise,
            currency: CURRENCY,
            razorpay_order_id: order_id,
            // Full gateway response kept opaque for audit.
            metadata: order.clone(),
        },
    )?;

    tracing::info!(
        "Created payment {} (order {:?}) for contact {} in tenant {}",
        payment.id,
        payment.razorpay_order_id,
        contact.id,
        ctx.tenant_id
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "payment": payment,
        "order": order,
    })))
}
