use crate::auth::TenantContext;
use crate::error::AppError;
use crate::services::whatsapp::WhatsAppSender;
use chrono::Utc;
use megaphone::db::PgPool;
use megaphone::models::{ChannelProvider, MessageStatus, RecipientStatus};
use megaphone::{
    claim_campaign_for_send, create_message, find_campaign_by_id, find_template_by_id,
    get_campaign_recipients, mark_campaign_sent, update_campaign_contact_status, MessageInput,
};
use serde::Serialize;

/// Hard ceiling on recipients attempted per send call, not a pagination
/// cursor. Campaigns beyond this size need a larger dispatch design.
pub const MAX_RECIPIENTS_PER_SEND: i64 = 100;

#[derive(Debug, Default, Serialize)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Fans a campaign out to its frozen recipient snapshot. Each recipient is
/// attempted exactly once per dispatch; the gateway outcome is appended as
/// an immutable Message row and mirrored onto the recipient status, and a
/// failure for one recipient never halts the rest. The campaign ends SENT
/// regardless of individual outcomes.
///
/// Re-dispatch is guarded: the DRAFT/SCHEDULED -> SENDING claim is a single
/// conditional update, so a second call fails instead of re-sending to
/// everyone.
pub async fn send_campaign(
    pool: &PgPool,
    sender: &WhatsAppSender,
    ctx: &TenantContext,
    campaign_id: i32,
) -> Result<DispatchSummary, AppError> {
    let campaign = find_campaign_by_id(pool, ctx.tenant_id, campaign_id)?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;

    let template = find_template_by_id(pool, ctx.tenant_id, campaign.template_id)?
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;

    let provider = ChannelProvider::parse(&template.channel_provider).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown channel provider: {}",
            template.channel_provider
        ))
    })?;

    if !claim_campaign_for_send(pool, ctx.tenant_id, campaign.id)? {
        return Err(AppError::Validation(
            "Campaign was already dispatched".to_string(),
        ));
    }

    let recipients = get_campaign_recipients(pool, campaign.id, MAX_RECIPIENTS_PER_SEND)?;

    tracing::info!(
        "Dispatching campaign {} ({}) to {} recipients via {}",
        campaign.id,
        campaign.name,
        recipients.len(),
        provider.as_str()
    );

    let mut summary = DispatchSummary {
        attempted: recipients.len(),
        ..Default::default()
    };

    for (recipient, contact) in &recipients {
        // Template content goes out verbatim; placeholder substitution is
        // a client-side concern at campaign build time.
        let result = sender.send(provider, &contact.phone, &template.content).await;

        let (message_status, recipient_status) = if result.ok {
            summary.sent += 1;
            (MessageStatus::Sent, RecipientStatus::Sent)
        } else {
            summary.failed += 1;
            (MessageStatus::Failed, RecipientStatus::Failed)
        };

        if let Err(e) = create_message(
            pool,
            MessageInput {
                tenant_id: ctx.tenant_id,
                campaign_id: campaign.id,
                contact_id: contact.id,
                status: message_status,
                provider_message_id: result.provider_message_id.as_deref(),
                error: result.error.as_deref(),
                sent_at: if result.ok { Some(Utc::now()) } else { None },
            },
        ) {
            tracing::error!(
                "Failed to record message for contact {} in campaign {}: {}",
                contact.id,
                campaign.id,
                e
            );
        }

        if let Err(e) = update_campaign_contact_status(pool, recipient.id, recipient_status) {
            tracing::error!(
                "Failed to update recipient {} in campaign {}: {}",
                recipient.id,
                campaign.id,
                e
            );
        }
    }

    mark_campaign_sent(pool, campaign.id)?;

    tracing::info!(
        "Campaign {} dispatched: {} sent, {} failed",
        campaign.id,
        summary.sent,
        summary.failed
    );

    Ok(summary)
}
