mod auth;
mod cors;
mod dto;
mod eligibility;
mod maintenance;
mod paystack;
mod phone;
mod pool;
mod reconcile;
mod reference;
mod routes;
mod sms;
mod sql_stmt;
mod timing;

use dto::{ResponseData, RESPONSE_BAD_REQUEST, RESPONSE_INTERNAL_ERROR, RESPONSE_UNAUTHORIZED};
use pool::Db;
use rocket::{serde::json::Json, Config, Request};
use sea_orm_rocket::Database;
use std::collections::HashSet;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[macro_use]
extern crate rocket;

#[get("/")]
async fn health_ping() -> &'static str {
    ""
}

#[get("/maintenance_mode")]
async fn maintenance_mode() -> Json<ResponseData<&'static str>> {
    let response = ResponseData {
        code: Some(503),
        status_code: None,
        message: "".to_string(),
        data: None,
    };
    Json(response)
}

#[catch(404)]
async fn bad_request(req: &Request<'_>) -> Json<ResponseData<String>> {
    let message = format!("Couldn't find '{}'", req.uri());
    Json(ResponseData::new(RESPONSE_BAD_REQUEST, message, None))
}

#[catch(401)]
async fn unauthorized() -> Json<ResponseData<String>> {
    Json(ResponseData::new(
        RESPONSE_UNAUTHORIZED,
        "Authentication required".to_owned(),
        None,
    ))
}

#[catch(500)]
async fn internal_error() -> Json<ResponseData<String>> {
    Json(ResponseData::new(
        RESPONSE_INTERNAL_ERROR,
        "Whoops! Looks like we messed up.".to_owned(),
        None,
    ))
}

#[launch]
async fn rocket() -> _ {
    let lending_config = Config::figment().extract::<pool::LendingConfig>().unwrap();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &lending_config.rust_log);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                format!("lending_web_api={}", &lending_config.web_api_log)
                    .parse()
                    .expect("Error parsing directive"),
            ),
        )
        .with_span_events(FmtSpan::FULL)
        .init();

    let reqwest_client = reqwest::Client::builder()
        .build()
        .expect("Reqwest client failed to initialize!");

    let allowed_domains: HashSet<String> = lending_config
        .cors_allowed_domains
        .split(',')
        .map(|s| s.to_owned())
        .collect();

    rocket::build()
        .register("/", catchers![internal_error, unauthorized, bad_request])
        .attach(Db::init())
        .attach(timing::RequestTimer)
        .attach(maintenance::MaintenanceMode)
        .manage(lending_config)
        .manage(reqwest_client)
        .attach(cors::OriginHeader { allowed_domains })
        .attach(routes::mount())
        .mount("/", routes![health_ping, maintenance_mode])
}
