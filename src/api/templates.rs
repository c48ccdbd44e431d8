use crate::auth::TenantContext;
use crate::error::AppError;
use actix_web::{get, post, web, HttpResponse};
use megaphone::db::PgPool;
use megaphone::models::ChannelProvider;
use megaphone::{create_template, get_templates, TemplateInput};
use serde::Deserialize;
use serde_json::json;

#[get("/templates")]
pub async fn list_templates(
    pool: web::Data<PgPool>,
    ctx: TenantContext,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(get_templates(&pool, ctx.tenant_id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: String,
    pub channel_provider: String,
    pub content: String,
    pub variables: Option<Vec<String>>,
}

#[post("/templates")]
pub async fn create_template_endpoint(
    pool: web::Data<PgPool>,
    ctx: TenantContext,
    body: web::Json<CreateTemplateRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    let name = request.name.trim();
    let content = request.content.trim();

    if name.is_empty() || content.is_empty() {
        return Err(AppError::Validation(
            "Name, channel provider, and content are required".to_string(),
        ));
    }

    let provider = ChannelProvider::parse(&request.channel_provider)
        .ok_or_else(|| AppError::Validation("Invalid channel provider".to_string()))?;

    let variables = request.variables.unwrap_or_default();

    // The (tenant_id, name) unique index turns a duplicate into a Conflict.
    let template = create_template(
        &pool,
        ctx.tenant_id,
        TemplateInput {
            name,
            channel_provider: provider.as_str(),
            content,
            variables: &variables,
        },
    )
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => {
            AppError::Conflict("Template with this name already exists".to_string())
        }
        other => other,
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "template": template,
    })))
}
