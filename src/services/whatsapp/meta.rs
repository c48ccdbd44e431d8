use super::SendResult;
use crate::config::AppConfig;
use reqwest::Client;
use serde_json::json;

const GRAPH_API_VERSION: &str = "v20.0";

pub async fn send(client: &Client, config: &AppConfig, to_phone: &str, body: &str) -> SendResult {
    let (token, phone_id) = match (&config.meta_waba_token, &config.meta_waba_phone_id) {
        (Some(token), Some(phone_id)) => (token, phone_id),
        _ => return SendResult::failure("Meta env not configured"),
    };

    let url = format!(
        "https://graph.facebook.com/{}/{}/messages",
        GRAPH_API_VERSION, phone_id
    );

    let payload = json!({
        "messaging_product": "whatsapp",
        "to": to_phone,
        "type": "text",
        "text": { "body": body },
    });

    let response = match client.post(url).bearer_auth(token).json(&payload).send().await {
        Ok(response) => response,
        Err(e) => return SendResult::failure(e.to_string()),
    };

    let ok = response.status().is_success();
    let json: serde_json::Value = response.json().await.unwrap_or_default();

    if ok {
        SendResult::success(
            json.pointer("/messages/0/id")
                .and_then(|v| v.as_str())
                .map(String::from),
        )
    } else {
        SendResult::failure(json.to_string())
    }
}
