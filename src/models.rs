use crate::schema::{
    campaign_contacts, campaigns, contacts, messages, payments, templates, tenants, users,
    webhook_events,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelProvider {
    Gupshup,
    Twilio,
    Meta,
}

impl ChannelProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelProvider::Gupshup => "GUPSHUP",
            ChannelProvider::Twilio => "TWILIO",
            ChannelProvider::Meta => "META",
        }
    }

    pub fn parse(s: &str) -> Option<ChannelProvider> {
        match s.to_uppercase().as_str() {
            "GUPSHUP" => Some(ChannelProvider::Gupshup),
            "TWILIO" => Some(ChannelProvider::Twilio),
            "META" => Some(ChannelProvider::Meta),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "DRAFT",
            CampaignStatus::Scheduled => "SCHEDULED",
            CampaignStatus::Sending => "SENDING",
            CampaignStatus::Sent => "SENT",
        }
    }

    pub fn parse(s: &str) -> Option<CampaignStatus> {
        match s {
            "DRAFT" => Some(CampaignStatus::Draft),
            "SCHEDULED" => Some(CampaignStatus::Scheduled),
            "SENDING" => Some(CampaignStatus::Sending),
            "SENT" => Some(CampaignStatus::Sent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientStatus {
    Pending,
    Sent,
    Failed,
}

impl RecipientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientStatus::Pending => "PENDING",
            RecipientStatus::Sent => "SENT",
            RecipientStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Sent,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "SENT",
            MessageStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Created,
    Authorized,
    Captured,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "CREATED",
            PaymentStatus::Authorized => "AUTHORIZED",
            PaymentStatus::Captured => "CAPTURED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyType {
    School,
    Clinic,
    Hospital,
    College,
    University,
    Other,
}

impl CompanyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyType::School => "SCHOOL",
            CompanyType::Clinic => "CLINIC",
            CompanyType::Hospital => "HOSPITAL",
            CompanyType::College => "COLLEGE",
            CompanyType::University => "UNIVERSITY",
            CompanyType::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<CompanyType> {
        match s.to_uppercase().as_str() {
            "SCHOOL" => Some(CompanyType::School),
            "CLINIC" => Some(CompanyType::Clinic),
            "HOSPITAL" => Some(CompanyType::Hospital),
            "COLLEGE" => Some(CompanyType::College),
            "UNIVERSITY" => Some(CompanyType::University),
            "OTHER" => Some(CompanyType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tenant {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub company_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTenant<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub company_type: &'a str,
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub tenant_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub tenant_id: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Contact {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewContact<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub tags: &'a [String],
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Template {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub channel_provider: String,
    pub content: String,
    pub variables: Vec<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTemplate<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub channel_provider: &'a str,
    pub content: &'a str,
    pub variables: &'a [String],
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = campaigns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Campaign {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub template_id: i32,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub estimated_recipients: i32,
    pub created_by_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = campaigns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCampaign<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub template_id: i32,
    pub status: &'a str,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub estimated_recipients: i32,
    pub created_by_id: &'a str,
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = campaign_contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CampaignContact {
    pub id: i32,
    pub campaign_id: i32,
    pub contact_id: i32,
    pub status: String,
}

#[derive(Insertable)]
#[diesel(table_name = campaign_contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCampaignContact<'a> {
    pub campaign_id: i32,
    pub contact_id: i32,
    pub status: &'a str,
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    pub id: i32,
    pub tenant_id: i32,
    pub campaign_id: i32,
    pub contact_id: i32,
    pub status: String,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMessage<'a> {
    pub tenant_id: i32,
    pub campaign_id: i32,
    pub contact_id: i32,
    pub status: &'a str,
    pub provider_message_id: Option<&'a str>,
    pub error: Option<&'a str>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Payment {
    pub id: i32,
    pub tenant_id: i32,
    pub contact_id: i32,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPayment<'a> {
    pub tenant_id: i32,
    pub contact_id: i32,
    pub amount: i64,
    pub currency: &'a str,
    pub status: &'a str,
    pub razorpay_order_id: Option<&'a str>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = webhook_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WebhookEvent {
    pub id: i32,
    pub provider: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = webhook_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWebhookEvent<'a> {
    pub provider: &'a str,
    pub event_type: &'a str,
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_provider_parse_case_insensitive() {
        assert_eq!(ChannelProvider::parse("gupshup"), Some(ChannelProvider::Gupshup));
        assert_eq!(ChannelProvider::parse("TWILIO"), Some(ChannelProvider::Twilio));
        assert_eq!(ChannelProvider::parse("Meta"), Some(ChannelProvider::Meta));
        assert_eq!(ChannelProvider::parse("smtp"), None);
    }

    #[test]
    fn test_campaign_status_round_trip() {
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Scheduled,
            CampaignStatus::Sending,
            CampaignStatus::Sent,
        ] {
            assert_eq!(CampaignStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CampaignStatus::parse("PAUSED"), None);
    }
}
