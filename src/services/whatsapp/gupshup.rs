use super::SendResult;
use crate::config::AppConfig;
use reqwest::Client;

pub async fn send(client: &Client, config: &AppConfig, to_phone: &str, body: &str) -> SendResult {
    let (api_key, base_url) = match (&config.gupshup_api_key, &config.gupshup_base_url) {
        (Some(key), Some(url)) => (key, url),
        _ => return SendResult::failure("Gupshup env not configured"),
    };

    let source = config.gupshup_source.as_deref().unwrap_or("");

    let params = [
        ("channel", "whatsapp"),
        ("source", source),
        ("destination", to_phone),
        ("message", body),
    ];

    let response = match client
        .post(format!("{}/msg", base_url))
        .header("apikey", api_key)
        .form(&params)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return SendResult::failure(e.to_string()),
    };

    let ok = response.status().is_success();
    let json: serde_json::Value = response.json().await.unwrap_or_default();

    if ok {
        SendResult::success(
            json.get("messageId")
                .and_then(|v| v.as_str())
                .map(String::from),
        )
    } else {
        SendResult::failure(json.to_string())
    }
}
