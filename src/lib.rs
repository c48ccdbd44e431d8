use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

pub mod db;
pub mod models;
pub mod schema;

use self::models::*;
use db::{DbError, PgPool};

/// How many times a contact upsert retries after losing the
/// insert-vs-insert race to a concurrent writer. The unique index on
/// `(tenant_id, phone)` is the final arbiter.
const UPSERT_MAX_ATTEMPTS: usize = 3;

// ---------------------------------------------------------------------------
// Tenants and users
// ---------------------------------------------------------------------------

pub struct CreateTenantInput<'a> {
    pub company_name: &'a str,
    pub slug: &'a str,
    pub company_type: &'a str,
    pub admin_user_id: &'a str,
    pub admin_name: &'a str,
    pub admin_email: &'a str,
}

pub fn create_tenant_with_admin(
    pool: &PgPool,
    input: CreateTenantInput,
) -> Result<(Tenant, User), DbError> {
    use self::schema::{tenants, users};

    let conn = &mut pool.get()?;

    let result = conn.transaction::<_, DieselError, _>(|conn| {
        let tenant: Tenant = diesel::insert_into(tenants::table)
            .values(&NewTenant {
                name: input.company_name,
                slug: input.slug,
                company_type: input.company_type,
            })
            .get_result(conn)?;

        let user: User = diesel::insert_into(users::table)
            .values(&NewUser {
                id: input.admin_user_id,
                name: input.admin_name,
                email: input.admin_email,
                role: "ADMIN",
                tenant_id: tenant.id,
            })
            .get_result(conn)?;

        Ok((tenant, user))
    })?;

    Ok(result)
}

pub fn find_tenant_by_slug(pool: &PgPool, slug_value: &str) -> Result<Option<Tenant>, DbError> {
    use schema::tenants::dsl::*;

    let conn = &mut pool.get()?;

    Ok(tenants
        .filter(slug.eq(slug_value))
        .first::<Tenant>(conn)
        .optional()?)
}

pub fn find_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, DbError> {
    use schema::users::dsl::*;

    let conn = &mut pool.get()?;

    Ok(users
        .filter(id.eq(user_id))
        .first::<User>(conn)
        .optional()?)
}

pub fn find_user_by_email(pool: &PgPool, email_value: &str) -> Result<Option<User>, DbError> {
    use schema::users::dsl::*;

    let conn = &mut pool.get()?;

    Ok(users
        .filter(email.eq(email_value))
        .first::<User>(conn)
        .optional()?)
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

pub struct ContactInput<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub tags: &'a [String],
}

pub fn get_contacts(pool: &PgPool, tenant: i32) -> Result<Vec<Contact>, DbError> {
    use schema::contacts::dsl::*;

    let conn = &mut pool.get()?;

    Ok(contacts
        .filter(tenant_id.eq(tenant))
        .order(created_at.desc())
        .load::<Contact>(conn)?)
}

pub fn create_contact(
    pool: &PgPool,
    tenant: i32,
    input: ContactInput,
) -> Result<Contact, DbError> {
    use self::schema::contacts;

    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(contacts::table)
        .values(&NewContact {
            tenant_id: tenant,
            name: input.name,
            phone: input.phone,
            email: input.email,
            tags: input.tags,
        })
        .get_result(conn)?)
}

pub fn find_contact_by_phone(
    pool: &PgPool,
    tenant: i32,
    phone_value: &str,
) -> Result<Option<Contact>, DbError> {
    use schema::contacts::dsl::*;

    let conn = &mut pool.get()?;

    Ok(contacts
        .filter(tenant_id.eq(tenant))
        .filter(phone.eq(phone_value))
        .first::<Contact>(conn)
        .optional()?)
}

pub fn find_contact_by_id(
    pool: &PgPool,
    tenant: i32,
    contact_id: i32,
) -> Result<Option<Contact>, DbError> {
    use schema::contacts::dsl::*;

    let conn = &mut pool.get()?;

    Ok(contacts
        .filter(tenant_id.eq(tenant))
        .filter(id.eq(contact_id))
        .first::<Contact>(conn)
        .optional()?)
}

pub fn count_contacts_by_ids(
    pool: &PgPool,
    tenant: i32,
    contact_ids: &[i32],
) -> Result<i64, DbError> {
    use schema::contacts::dsl::*;

    let conn = &mut pool.get()?;

    Ok(contacts
        .filter(tenant_id.eq(tenant))
        .filter(id.eq_any(contact_ids))
        .count()
        .get_result(conn)?)
}

/// A candidate contact produced by the importer, keyed by trimmed phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactUpsert {
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Set union of existing and incoming tags, existing order preserved and
/// new tags appended in first-seen order.
pub fn merge_tags(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = existing.to_vec();
    for tag in incoming {
        if !merged.iter().any(|t| t == tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

/// Insert-or-update a contact by `(tenant_id, phone)` as a bounded
/// compare-and-set loop: a lost insert race (unique violation) retries as
/// an update against the row the winner wrote. Tags accumulate as a set
/// union; name and email take the latest values.
pub fn upsert_contact_by_phone(
    pool: &PgPool,
    tenant: i32,
    candidate: &ContactUpsert,
) -> Result<UpsertOutcome, DbError> {
    use schema::contacts::dsl::*;

    for _ in 0..UPSERT_MAX_ATTEMPTS {
        if let Some(existing) = find_contact_by_phone(pool, tenant, &candidate.phone)? {
            let merged = merge_tags(&existing.tags, &candidate.tags);

            let conn = &mut pool.get()?;
            diesel::update(contacts.filter(id.eq(existing.id)))
                .set((
                    name.eq(&candidate.name),
                    email.eq(candidate.email.as_deref()),
                    tags.eq(&merged),
                ))
                .execute(conn)?;

            return Ok(UpsertOutcome::Updated);
        }

        let conn = &mut pool.get()?;
        let inserted = diesel::insert_into(contacts)
            .values(&NewContact {
                tenant_id: tenant,
                name: &candidate.name,
                phone: &candidate.phone,
                email: candidate.email.as_deref(),
                tags: &candidate.tags,
            })
            .execute(conn);

        match inserted {
            Ok(_) => return Ok(UpsertOutcome::Created),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                // A concurrent import won the insert; retry as an update.
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(DbError::UpsertRace(candidate.phone.clone()))
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub struct TemplateInput<'a> {
    pub name: &'a str,
    pub channel_provider: &'a str,
    pub content: &'a str,
    pub variables: &'a [String],
}

pub fn get_templates(pool: &PgPool, tenant: i32) -> Result<Vec<Template>, DbError> {
    use schema::templates::dsl::*;

    let conn = &mut pool.get()?;

    Ok(templates
        .filter(tenant_id.eq(tenant))
        .order(created_at.desc())
        .load::<Template>(conn)?)
}

pub fn create_template(
    pool: &PgPool,
    tenant: i32,
    input: TemplateInput,
) -> Result<Template, DbError> {
    use self::schema::templates;

    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(templates::table)
        .values(&NewTemplate {
            tenant_id: tenant,
            name: input.name,
            channel_provider: input.channel_provider,
            content: input.content,
            variables: input.variables,
        })
        .get_result(conn)?)
}

pub fn find_template_by_id(
    pool: &PgPool,
    tenant: i32,
    template_id: i32,
) -> Result<Option<Template>, DbError> {
    use schema::templates::dsl::*;

    let conn = &mut pool.get()?;

    Ok(templates
        .filter(tenant_id.eq(tenant))
        .filter(id.eq(template_id))
        .first::<Template>(conn)
        .optional()?)
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

pub struct CreateCampaignInput<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub template_id: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_by_id: &'a str,
    pub contact_ids: &'a [i32],
}

/// Campaign row plus its frozen PENDING recipient snapshot, written
/// all-or-nothing in one transaction.
pub fn create_campaign_with_recipients(
    pool: &PgPool,
    input: CreateCampaignInput,
) -> Result<Campaign, DbError> {
    use self::schema::{campaign_contacts, campaigns};

    let conn = &mut pool.get()?;

    let status = if input.scheduled_at.is_some() {
        CampaignStatus::Scheduled
    } else {
        CampaignStatus::Draft
    };

    let campaign = conn.transaction::<_, DieselError, _>(|conn| {
        let campaign: Campaign = diesel::insert_into(campaigns::table)
            .values(&NewCampaign {
                tenant_id: input.tenant_id,
                name: input.name,
                template_id: input.template_id,
                status: status.as_str(),
                scheduled_at: input.scheduled_at,
                estimated_recipients: input.contact_ids.len() as i32,
                created_by_id: input.created_by_id,
            })
            .get_result(conn)?;

        let recipients: Vec<NewCampaignContact> = input
            .contact_ids
            .iter()
            .map(|&contact_id| NewCampaignContact {
                campaign_id: campaign.id,
                contact_id,
                status: RecipientStatus::Pending.as_str(),
            })
            .collect();

        diesel::insert_into(campaign_contacts::table)
            .values(&recipients)
            .execute(conn)?;

        Ok(campaign)
    })?;

    Ok(campaign)
}

#[derive(Debug, serde::Serialize)]
pub struct CampaignOverview {
    pub campaign: Campaign,
    pub template_name: String,
    pub channel_provider: String,
    pub recipient_count: i64,
}

pub fn get_campaigns_with_stats(
    pool: &PgPool,
    tenant: i32,
) -> Result<Vec<CampaignOverview>, DbError> {
    use self::schema::{campaign_contacts, campaigns, templates};
    use std::collections::HashMap;

    let conn = &mut pool.get()?;

    let rows: Vec<(Campaign, String, String)> = campaigns::table
        .inner_join(templates::table.on(campaigns::template_id.eq(templates::id)))
        .filter(campaigns::tenant_id.eq(tenant))
        .order(campaigns::created_at.desc())
        .select((
            Campaign::as_select(),
            templates::name,
            templates::channel_provider,
        ))
        .load(conn)?;

    let campaign_ids: Vec<i32> = rows.iter().map(|(c, _, _)| c.id).collect();

    let counts: HashMap<i32, i64> = campaign_contacts::table
        .filter(campaign_contacts::campaign_id.eq_any(&campaign_ids))
        .group_by(campaign_contacts::campaign_id)
        .select((
            campaign_contacts::campaign_id,
            diesel::dsl::count(campaign_contacts::id),
        ))
        .load::<(i32, i64)>(conn)?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|(campaign, template_name, channel_provider)| {
            let recipient_count = counts.get(&campaign.id).copied().unwrap_or(0);
            CampaignOverview {
                campaign,
                template_name,
                channel_provider,
                recipient_count,
            }
        })
        .collect())
}

pub fn find_campaign_by_id(
    pool: &PgPool,
    tenant: i32,
    campaign_id: i32,
) -> Result<Option<Campaign>, DbError> {
    use schema::campaigns::dsl::*;

    let conn = &mut pool.get()?;

    Ok(campaigns
        .filter(tenant_id.eq(tenant))
        .filter(id.eq(campaign_id))
        .first::<Campaign>(conn)
        .optional()?)
}

/// Exclusive dispatch claim: DRAFT/SCHEDULED -> SENDING as a single
/// conditional update. Returns false when another caller already holds the
/// claim or the campaign is already sent.
pub fn claim_campaign_for_send(
    pool: &PgPool,
    tenant: i32,
    campaign_id: i32,
) -> Result<bool, DbError> {
    use schema::campaigns::dsl::*;

    let conn = &mut pool.get()?;

    let updated = diesel::update(
        campaigns
            .filter(id.eq(campaign_id))
            .filter(tenant_id.eq(tenant))
            .filter(status.eq_any(vec![
                CampaignStatus::Draft.as_str(),
                CampaignStatus::Scheduled.as_str(),
            ])),
    )
    .set(status.eq(CampaignStatus::Sending.as_str()))
    .execute(conn)?;

    Ok(updated > 0)
}

pub fn mark_campaign_sent(pool: &PgPool, campaign_id: i32) -> Result<(), DbError> {
    use schema::campaigns::dsl::*;

    let conn = &mut pool.get()?;

    diesel::update(campaigns.filter(id.eq(campaign_id)))
        .set(status.eq(CampaignStatus::Sent.as_str()))
        .execute(conn)?;

    Ok(())
}

pub fn get_campaign_recipients(
    pool: &PgPool,
    campaign: i32,
    limit: i64,
) -> Result<Vec<(CampaignContact, Contact)>, DbError> {
    use self::schema::{campaign_contacts, contacts};

    let conn = &mut pool.get()?;

    Ok(campaign_contacts::table
        .inner_join(contacts::table.on(campaign_contacts::contact_id.eq(contacts::id)))
        .filter(campaign_contacts::campaign_id.eq(campaign))
        .order(campaign_contacts::id.asc())
        .limit(limit)
        .select((CampaignContact::as_select(), Contact::as_select()))
        .load(conn)?)
}

pub fn update_campaign_contact_status(
    pool: &PgPool,
    campaign_contact_id: i32,
    new_status: RecipientStatus,
) -> Result<(), DbError> {
    use schema::campaign_contacts::dsl::*;

    let conn = &mut pool.get()?;

    diesel::update(campaign_contacts.filter(id.eq(campaign_contact_id)))
        .set(status.eq(new_status.as_str()))
        .execute(conn)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub struct MessageInput<'a> {
    pub tenant_id: i32,
    pub campaign_id: i32,
    pub contact_id: i32,
    pub status: MessageStatus,
    pub provider_message_id: Option<&'a str>,
    pub error: Option<&'a str>,
    pub sent_at: Option<DateTime<Utc>>,
}

pub fn create_message(pool: &PgPool, input: MessageInput) -> Result<Message, DbError> {
    use self::schema::messages;

    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(messages::table)
        .values(&NewMessage {
            tenant_id: input.tenant_id,
            campaign_id: input.campaign_id,
            contact_id: input.contact_id,
            status: input.status.as_str(),
            provider_message_id: input.provider_message_id,
            error: input.error,
            sent_at: input.sent_at,
        })
        .get_result(conn)?)
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

pub struct PaymentInput<'a> {
    pub tenant_id: i32,
    pub contact_id: i32,
    pub amount: i64,
    pub currency: &'a str,
    pub razorpay_order_id: Option<&'a str>,
    pub metadata: serde_json::Value,
}

pub fn create_payment(pool: &PgPool, input: PaymentInput) -> Result<Payment, DbError> {
    use self::schema::payments;

    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(payments::table)
        .values(&NewPayment {
            tenant_id: input.tenant_id,
            contact_id: input.contact_id,
            amount: input.amount,
            currency: input.currency,
            status: PaymentStatus::Created.as_str(),
            razorpay_order_id: input.razorpay_order_id,
            metadata: input.metadata,
        })
        .get_result(conn)?)
}

pub fn get_payments_with_contact(
    pool: &PgPool,
    tenant: i32,
) -> Result<Vec<(Payment, Contact)>, DbError> {
    use self::schema::{contacts, payments};

    let conn = &mut pool.get()?;

    Ok(payments::table
        .inner_join(contacts::table.on(payments::contact_id.eq(contacts::id)))
        .filter(payments::tenant_id.eq(tenant))
        .order(payments::created_at.desc())
        .select((Payment::as_select(), Contact::as_select()))
        .load(conn)?)
}

/// Applies a gateway event to every payment carrying the given order id.
/// Redelivered events land on the same target status, so reapplication is
/// idempotent.
pub fn update_payments_by_order_id(
    pool: &PgPool,
    order_id: &str,
    new_status: PaymentStatus,
    payment_id: Option<&str>,
    entity: serde_json::Value,
) -> Result<usize, DbError> {
    use schema::payments::dsl::*;

    let conn = &mut pool.get()?;

    let target = payments.filter(razorpay_order_id.eq(order_id));

    let updated = match payment_id {
        Some(pid) => diesel::update(target)
            .set((
                status.eq(new_status.as_str()),
                razorpay_payment_id.eq(pid),
                metadata.eq(&entity),
                updated_at.eq(Utc::now()),
            ))
            .execute(conn)?,
        None => diesel::update(target)
            .set((
                status.eq(new_status.as_str()),
                metadata.eq(&entity),
                updated_at.eq(Utc::now()),
            ))
            .execute(conn)?,
    };

    Ok(updated)
}

// ---------------------------------------------------------------------------
// Webhook events
// ---------------------------------------------------------------------------

pub fn create_webhook_event(
    pool: &PgPool,
    provider_name: &str,
    event_type_name: &str,
    payload_value: serde_json::Value,
) -> Result<WebhookEvent, DbError> {
    use self::schema::webhook_events;

    let conn = &mut pool.get()?;

    Ok(diesel::insert_into(webhook_events::table)
        .values(&NewWebhookEvent {
            provider: provider_name,
            event_type: event_type_name,
            payload: payload_value,
        })
        .get_result(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_tags_union() {
        let merged = merge_tags(&tags(&["parent", "grade-5"]), &tags(&["grade-5", "fees-due"]));
        assert_eq!(merged, tags(&["parent", "grade-5", "fees-due"]));
    }

    #[test]
    fn test_merge_tags_idempotent() {
        let existing = tags(&["a", "b"]);
        let once = merge_tags(&existing, &tags(&["b", "c"]));
        let twice = merge_tags(&once, &tags(&["b", "c"]));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_tags_empty_incoming() {
        let existing = tags(&["a"]);
        assert_eq!(merge_tags(&existing, &[]), existing);
    }

    #[test]
    fn test_merge_tags_empty_existing() {
        assert_eq!(merge_tags(&[], &tags(&["x", "x", "y"])), tags(&["x", "y"]));
    }
}
