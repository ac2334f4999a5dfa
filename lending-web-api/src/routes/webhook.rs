use crate::dto::{
    ResponseData, RESPONSE_BAD_REQUEST, RESPONSE_INTERNAL_ERROR, RESPONSE_OK,
    RESPONSE_UNAUTHORIZED,
};
use crate::pool::{Db, LendingConfig};
use crate::reconcile;
use crate::reconcile::GatewayEvent;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::status::Custom;
use rocket::{serde::json::Json, State};
use sea_orm_rocket::Connection;
use tracing::{error, info, warn};

/// The raw signature header. A missing header fails the guard with
/// 401 before the handler body runs, so no writes can happen.
#[derive(Debug)]
pub struct GatewaySignature(pub String);

#[derive(Debug)]
pub enum SignatureError {
    Missing,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GatewaySignature {
    type Error = SignatureError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.headers().get_one("x-paystack-signature") {
            None => Outcome::Failure((Status::Unauthorized, SignatureError::Missing)),
            Some(signature) => Outcome::Success(GatewaySignature(signature.to_owned())),
        }
    }
}

/// Signature check runs over the raw body, before any parsing.
#[post("/payments/webhook", data = "<body>")]
pub async fn webhook(
    conn: Connection<'_, Db>,
    lending_config: &State<LendingConfig>,
    signature: GatewaySignature,
    body: String,
) -> Custom<Json<ResponseData<String>>> {
    if !reconcile::verify_signature(&lending_config.paystack_secret_key, &body, &signature.0) {
        error!("Invalid webhook signature");
        return Custom(
            Status::Unauthorized,
            Json(ResponseData::new(
                RESPONSE_UNAUTHORIZED,
                "Invalid signature".to_owned(),
                None,
            )),
        );
    }

    let event: GatewayEvent = match rocket::serde::json::from_str(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("Unparseable webhook payload: {}", err);
            return Custom(
                Status::BadRequest,
                Json(ResponseData::new(
                    RESPONSE_BAD_REQUEST,
                    "Unparseable payload".to_owned(),
                    None,
                )),
            );
        }
    };
    info!("Gateway webhook received: {}", event.event);

    let db = conn.into_inner();
    match reconcile::apply_event(db, &event).await {
        Ok(()) => Custom(
            Status::Ok,
            Json(ResponseData::new(
                RESPONSE_OK,
                "".to_owned(),
                Some("received".to_owned()),
            )),
        ),
        Err(err) => {
            error!("Webhook error: {}", err);
            Custom(
                Status::InternalServerError,
                Json(ResponseData::new(
                    RESPONSE_INTERNAL_ERROR,
                    "Error applying event".to_owned(),
                    None,
                )),
            )
        }
    }
}
