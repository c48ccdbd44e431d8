use crate::config::AppConfig;
use megaphone::models::ChannelProvider;
use reqwest::Client;
use std::time::Duration;

pub mod gupshup;
pub mod meta;
pub mod twilio;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-recipient gateway outcome. Transport errors, missing credentials and
/// non-2xx responses are all folded in here; callers never see an `Err`.
#[derive(Debug, Clone, Default)]
pub struct SendResult {
    pub ok: bool,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
}

impl SendResult {
    pub fn success(provider_message_id: Option<String>) -> Self {
        SendResult {
            ok: true,
            provider_message_id,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        SendResult {
            ok: false,
            provider_message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Outbound WhatsApp gateway, one interchangeable integration per channel
/// provider. Messages are routed by the template's declared provider.
#[derive(Clone)]
pub struct WhatsAppSender {
    client: Client,
    config: AppConfig,
}

impl WhatsAppSender {
    pub fn new(config: AppConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client must build");

        WhatsAppSender { client, config }
    }

    pub async fn send(&self, provider: ChannelProvider, to_phone: &str, body: &str) -> SendResult {
        match provider {
            ChannelProvider::Gupshup => {
                gupshup::send(&self.client, &self.config, to_phone, body).await
            }
            ChannelProvider::Twilio => {
                twilio::send(&self.client, &self.config, to_phone, body).await
            }
            ChannelProvider::Meta => meta::send(&self.client, &self.config, to_phone, body).await,
        }
    }
}
