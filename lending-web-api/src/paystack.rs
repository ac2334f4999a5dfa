use crate::pool::LendingConfig;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use tracing::warn;

const DEFAULT_DISPLAY_TEXT: &str = "Please enter your M-Pesa PIN when prompted";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
struct ChargePayload {
    email: String,
    /// Smallest currency unit, cents
    amount: i64,
    currency: String,
    mobile_money: MobileMoney,
    reference: String,
    metadata: ChargeMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
struct MobileMoney {
    phone: String,
    provider: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
struct ChargeMetadata {
    application_id: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde")]
struct ChargeResponse {
    status: bool,
    message: Option<String>,
    data: Option<ChargeResponseData>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(crate = "rocket::serde")]
struct ChargeResponseData {
    reference: Option<String>,
    display_text: Option<String>,
}

/// The gateway requires an email per charge; it is derived from the
/// phone number, never collected.
fn charge_email(formatted_phone: &str) -> String {
    format!("{}@helapesa.com", formatted_phone.replace('+', ""))
}

pub fn amount_to_cents(amount: i64) -> i64 {
    amount * 100
}

/// Opens a mobile-money charge with the gateway. Returns
/// (display_text, error_message); an empty error means success.
pub async fn initiate_mobile_money_charge(
    client: &State<reqwest::Client>,
    config: &State<LendingConfig>,
    formatted_phone: &str,
    amount: i64,
    application_id: &str,
    reference: &str,
) -> (String, String) {
    let payload = ChargePayload {
        email: charge_email(formatted_phone),
        amount: amount_to_cents(amount),
        currency: "KES".to_owned(),
        mobile_money: MobileMoney {
            phone: formatted_phone.to_owned(),
            provider: "mpesa".to_owned(),
        },
        reference: reference.to_owned(),
        metadata: ChargeMetadata {
            application_id: application_id.to_owned(),
        },
    };

    let url = config.paystack_api_node.to_owned() + "/charge";
    let result = client
        .post(url)
        .bearer_auth(&config.paystack_secret_key)
        .json(&payload)
        .send()
        .await;

    match result {
        Ok(response) => match response.json::<ChargeResponse>().await {
            Ok(charge) => {
                if charge.status {
                    let display_text = charge
                        .data
                        .and_then(|data| data.display_text)
                        .unwrap_or_else(|| DEFAULT_DISPLAY_TEXT.to_owned());
                    (display_text, "".to_owned())
                } else {
                    let error_message = charge
                        .message
                        .unwrap_or_else(|| "Failed to initiate payment".to_owned());
                    warn!("Gateway refused charge: {}", error_message);
                    ("".to_owned(), error_message)
                }
            }
            Err(error) => {
                let error_message = format!("Error parsing charge response: {}", error);
                warn!("{}", error_message);
                ("".to_owned(), error_message)
            }
        },
        Err(error) => {
            let error_message = format!("Error connecting payment gateway: {}", error);
            warn!("{}", error_message);
            ("".to_owned(), error_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_derived_from_the_phone() {
        assert_eq!(charge_email("+254712345678"), "254712345678@helapesa.com");
    }

    #[test]
    fn amounts_convert_to_cents() {
        assert_eq!(amount_to_cents(500), 50000);
        assert_eq!(amount_to_cents(0), 0);
    }

    #[test]
    fn charge_payload_serializes_gateway_shape() {
        let payload = ChargePayload {
            email: charge_email("+254712345678"),
            amount: amount_to_cents(500),
            currency: "KES".to_owned(),
            mobile_money: MobileMoney {
                phone: "+254712345678".to_owned(),
                provider: "mpesa".to_owned(),
            },
            reference: "hela_abc_1".to_owned(),
            metadata: ChargeMetadata {
                application_id: "abc".to_owned(),
            },
        };
        let json = rocket::serde::json::to_string(&payload).unwrap();
        assert!(json.contains("\"amount\":50000"));
        assert!(json.contains("\"provider\":\"mpesa\""));
        assert!(json.contains("\"currency\":\"KES\""));
    }
}
