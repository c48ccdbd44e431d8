use crate::error::AppError;
use actix_web::{post, web, HttpResponse};
use megaphone::db::PgPool;
use megaphone::models::CompanyType;
use megaphone::{
    create_tenant_with_admin, find_tenant_by_slug, find_user_by_email, CreateTenantInput,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub company_name: String,
    pub company_type: String,
    pub admin_name: String,
    pub email: String,
    pub user_id: String,
}

/// Tenant slug from the company name: lowercased, non-alphanumeric runs
/// collapsed to single dashes, edges trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Tenant bootstrap: a new organization plus its admin user, written in one
/// transaction. Identity itself lives with the external provider; only the
/// provider's user id is linked here.
#[post("/tenants")]
pub async fn create_tenant(
    pool: web::Data<PgPool>,
    body: web::Json<CreateTenantRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    let company_name = request.company_name.trim();
    let admin_name = request.admin_name.trim();
    let email = request.email.trim();
    let user_id = request.user_id.trim();

    if company_name.len() < 2 {
        return Err(AppError::Validation(
            "Company name must be at least 2 characters".to_string(),
        ));
    }
    if admin_name.len() < 2 {
        return Err(AppError::Validation(
            "Name must be at least 2 characters".to_string(),
        ));
    }
    if user_id.is_empty() {
        return Err(AppError::Validation("User id is required".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let company_type = CompanyType::parse(&request.company_type)
        .ok_or_else(|| AppError::Validation("Invalid company type".to_string()))?;

    let slug = slugify(company_name);
    if slug.is_empty() {
        return Err(AppError::Validation("Invalid company name".to_string()));
    }

    if find_user_by_email(&pool, email)?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    if find_tenant_by_slug(&pool, &slug)?.is_some() {
        return Err(AppError::Conflict("Company name already taken".to_string()));
    }

    let (tenant, user) = create_tenant_with_admin(
        &pool,
        CreateTenantInput {
            company_name,
            slug: &slug,
            company_type: company_type.as_str(),
            admin_user_id: user_id,
            admin_name,
            admin_email: email,
        },
    )?;

    tracing::info!("Created tenant {} ({})", tenant.id, tenant.slug);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "tenant": tenant,
        "user": user,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Sunrise Public School"), "sunrise-public-school");
    }

    #[test]
    fn test_slugify_collapses_runs_and_trims() {
        assert_eq!(slugify("  St. Mary's -- Clinic!  "), "st-mary-s-clinic");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_keeps_digits() {
        assert_eq!(slugify("Clinic 24x7"), "clinic-24x7");
    }
}
