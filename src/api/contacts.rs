use crate::auth::TenantContext;
use crate::error::AppError;
use crate::services::import::run_import;
use crate::services::segment::{filter_by_tags, parse_tag_list};
use actix_web::{get, post, web, HttpResponse};
use megaphone::db::PgPool;
use megaphone::{create_contact, find_contact_by_phone, get_contacts, ContactInput};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub include_tags: Option<String>,
    pub exclude_tags: Option<String>,
}

#[get("/contacts")]
pub async fn list_contacts(
    pool: web::Data<PgPool>,
    ctx: TenantContext,
    query: web::Query<ContactListQuery>,
) -> Result<HttpResponse, AppError> {
    let contacts = get_contacts(&pool, ctx.tenant_id)?;

    let include = query
        .include_tags
        .as_deref()
        .map(parse_tag_list)
        .unwrap_or_default();
    let exclude = query
        .exclude_tags
        .as_deref()
        .map(parse_tag_list)
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(filter_by_tags(contacts, &include, &exclude)))
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[post("/contacts")]
pub async fn create_contact_endpoint(
    pool: web::Data<PgPool>,
    ctx: TenantContext,
    body: web::Json<CreateContactRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    let name = request.name.trim();
    let phone = request.phone.trim();

    if name.is_empty() || phone.is_empty() {
        return Err(AppError::Validation(
            "Name and phone are required".to_string(),
        ));
    }

    if find_contact_by_phone(&pool, ctx.tenant_id, phone)?.is_some() {
        return Err(AppError::Conflict(
            "Contact with this phone number already exists".to_string(),
        ));
    }

    let tags = request.tags.unwrap_or_default();

    let contact = create_contact(
        &pool,
        ctx.tenant_id,
        ContactInput {
            name,
            phone,
            email: request.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
            tags: &tags,
        },
    )?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "contact": contact,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportContactsRequest {
    pub contacts: Vec<serde_json::Map<String, serde_json::Value>>,
    pub phone_column: Option<String>,
}

#[post("/contacts/import")]
pub async fn import_contacts(
    pool: web::Data<PgPool>,
    ctx: TenantContext,
    body: web::Json<ImportContactsRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    let report = run_import(&pool, ctx.tenant_id, &request.contacts, request.phone_column)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!(
            "Import completed. Created: {}, Updated: {}, Failed: {}",
            report.created, report.updated, report.failed
        ),
        "results": report,
    })))
}
