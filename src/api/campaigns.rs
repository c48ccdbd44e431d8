use crate::auth::TenantContext;
use crate::error::AppError;
use crate::services::dispatch::send_campaign;
use crate::services::whatsapp::WhatsAppSender;
use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use megaphone::db::PgPool;
use megaphone::{
    count_contacts_by_ids, create_campaign_with_recipients, find_template_by_id,
    get_campaigns_with_stats, CreateCampaignInput,
};
use serde::Deserialize;
use serde_json::json;

#[get("/campaigns")]
pub async fn list_campaigns(
    pool: web::Data<PgPool>,
    ctx: TenantContext,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(get_campaigns_with_stats(&pool, ctx.tenant_id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub name: String,
    pub template_id: i32,
    pub contact_ids: Vec<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[post("/campaigns")]
pub async fn create_campaign(
    pool: web::Data<PgPool>,
    ctx: TenantContext,
    body: web::Json<CreateCampaignRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    let name = request.name.trim();
    if name.is_empty() || request.contact_ids.is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let template = find_template_by_id(&pool, ctx.tenant_id, request.template_id)?
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;

    // Partial matches are rejected outright; a cross-tenant id must never
    // silently shrink the recipient list.
    let resolved = count_contacts_by_ids(&pool, ctx.tenant_id, &request.contact_ids)?;
    if resolved != request.contact_ids.len() as i64 {
        return Err(AppError::Validation("Some contacts not found".to_string()));
    }

    let campaign = create_campaign_with_recipients(
        &pool,
        CreateCampaignInput {
            tenant_id: ctx.tenant_id,
            name,
            template_id: template.id,
            scheduled_at: request.scheduled_at,
            created_by_id: &ctx.user_id,
            contact_ids: &request.contact_ids,
        },
    )?;

    tracing::info!(
        "Created campaign {} with {} recipients for tenant {}",
        campaign.id,
        campaign.estimated_recipients,
        ctx.tenant_id
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "campaign": campaign,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCampaignRequest {
    pub campaign_id: i32,
}

#[post("/campaigns/send")]
pub async fn send_campaign_endpoint(
    pool: web::Data<PgPool>,
    sender: web::Data<WhatsAppSender>,
    ctx: TenantContext,
    body: web::Json<SendCampaignRequest>,
) -> Result<HttpResponse, AppError> {
    let summary = send_campaign(&pool, &sender, &ctx, body.campaign_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "summary": summary,
    })))
}
