use crate::dto::{ChatMessage, ChatRequest, ChatRole, ResponseData, RESPONSE_INTERNAL_ERROR};
use crate::pool::LendingConfig;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::response::stream::ByteStream;
use rocket::serde::Serialize;
use rocket::{serde::json::Json, State};
use tracing::warn;

const SYSTEM_PROMPT: &str = "You are the Hela Loans assistant, a friendly and professional \
virtual assistant for a mobile loan service in Kenya.\n\
\n\
ABOUT HELA LOANS:\n\
- Quick mobile loans disbursed directly to M-Pesa after approval\n\
- Loan limits are calculated from the applicant's profile\n\
- A minimum verified savings balance of KES 500 unlocks disbursement\n\
\n\
HOW IT WORKS:\n\
1. Complete the loan application form\n\
2. The system calculates a personalised loan limit\n\
3. Select the desired amount\n\
4. Meet the savings requirement\n\
5. Receive funds via M-Pesa\n\
\n\
GUIDELINES:\n\
- Keep answers concise and helpful\n\
- For account-specific issues, direct users to Talk to Support\n\
- Never share or ask for passwords, PINs, or OTPs\n\
- Use Kenyan Shillings (KES) for currency references";

#[derive(Clone, Debug, Serialize)]
#[serde(crate = "rocket::serde")]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Proxies the conversation to the AI gateway and streams the
/// `data:`-chunked completion back as-is. Consumers abort by closing
/// the stream.
#[post("/chat", format = "application/json", data = "<chat_request>")]
pub async fn chat(
    lending_config: &State<LendingConfig>,
    client: &State<reqwest::Client>,
    chat_request: Json<ChatRequest>,
) -> Result<ByteStream![Vec<u8>], Custom<Json<ResponseData<String>>>> {
    let mut messages = vec![ChatMessage {
        role: ChatRole::System,
        content: SYSTEM_PROMPT.to_owned(),
    }];
    messages.extend(chat_request.into_inner().messages);

    let payload = CompletionRequest {
        model: lending_config.ai_model.to_owned(),
        messages,
        stream: true,
    };

    let url = lending_config.ai_gateway_node.to_owned() + "/v1/chat/completions";
    let result = client
        .post(url)
        .bearer_auth(&lending_config.ai_gateway_key)
        .json(&payload)
        .send()
        .await;

    let response = match result {
        Ok(response) => response,
        Err(error) => {
            warn!("Error connecting AI gateway: {}", error);
            return Err(Custom(
                Status::InternalServerError,
                Json(ResponseData::new(
                    RESPONSE_INTERNAL_ERROR,
                    "Error connecting AI gateway".to_owned(),
                    None,
                )),
            ));
        }
    };

    match response.status().as_u16() {
        429 => {
            warn!("AI gateway rate limited");
            return Err(Custom(
                Status::TooManyRequests,
                Json(ResponseData::new(
                    429,
                    "Rate limited, please try again shortly".to_owned(),
                    None,
                )),
            ));
        }
        402 => {
            warn!("AI gateway requires payment");
            return Err(Custom(
                Status::PaymentRequired,
                Json(ResponseData::new(
                    402,
                    "Service temporarily unavailable".to_owned(),
                    None,
                )),
            ));
        }
        status if status >= 400 => {
            warn!("AI gateway returned {}", status);
            return Err(Custom(
                Status::InternalServerError,
                Json(ResponseData::new(
                    RESPONSE_INTERNAL_ERROR,
                    "AI gateway error".to_owned(),
                    None,
                )),
            ));
        }
        _ => {}
    }

    let mut response = response;
    Ok(ByteStream! {
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => yield chunk.to_vec(),
                Ok(None) => break,
                Err(error) => {
                    warn!("Stream error from AI gateway: {}", error);
                    break;
                }
            }
        }
    })
}
