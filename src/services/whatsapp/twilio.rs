use super::SendResult;
use crate::config::AppConfig;
use reqwest::Client;

pub async fn send(client: &Client, config: &AppConfig, to_phone: &str, body: &str) -> SendResult {
    let (account_sid, auth_token, from_number) = match (
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_whatsapp_number,
    ) {
        (Some(sid), Some(token), Some(from)) => (sid, token, from),
        _ => return SendResult::failure("Twilio env not configured"),
    };

    let url = format!(
        "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
        account_sid
    );

    let to = format!("whatsapp:{}", to_phone);
    let params = [
        ("From", from_number.as_str()),
        ("To", to.as_str()),
        ("Body", body),
    ];

    let response = match client
        .post(url)
        .basic_auth(account_sid, Some(auth_token))
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
        SendResult::success(json.get("sid").and_then(|v| v.as_str()).map(String::from))
    } else {
        SendResult::failure(json.to_string())
    }
}
