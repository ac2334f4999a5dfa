use crate::pool::LendingConfig;
use rocket::State;
use tracing::warn;

/// Sends one SMS through the Africa's Talking messaging API. Empty
/// return means delivered to the provider; the provider's own queueing
/// is not awaited.
pub async fn send_sms(
    client: &State<reqwest::Client>,
    config: &State<LendingConfig>,
    formatted_phone: &str,
    message: &str,
) -> Result<(), String> {
    let url = config.sms_api_node.to_owned() + "/version1/messaging";
    let to = format!("+{}", formatted_phone);
    let params = [
        ("username", config.sms_username.as_str()),
        ("to", to.as_str()),
        ("message", message),
    ];

    let result = client
        .post(url)
        .header("apiKey", &config.sms_api_key)
        .header("Accept", "application/json")
        .form(&params)
        .send()
        .await;

    match result {
        Ok(response) => {
            if response.status().is_success() {
                Ok(())
            } else {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let error_message = format!("SMS provider returned {}: {}", status, body);
                warn!("{}", error_message);
                Err(error_message)
            }
        }
        Err(error) => {
            let error_message = format!("Error connecting SMS provider: {}", error);
            warn!("{}", error_message);
            Err(error_message)
        }
    }
}
