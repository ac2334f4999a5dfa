use rocket::fairing::AdHoc;

pub mod admin;
pub mod application;
pub mod chat;
pub mod loan;
pub mod password_reset;
pub mod payment;
pub mod savings;
pub mod support;
pub mod webhook;

pub fn mount() -> AdHoc {
    AdHoc::on_ignite("Attaching Routes", |rocket| async {
        rocket.mount(
            "/",
            routes![
                admin::overview,
                admin::list_applications,
                admin::list_deposits,
                admin::list_withdrawals,
                admin::list_support,
                admin::list_disbursements,
                admin::decide_application,
                admin::verify_deposit,
                admin::decide_withdrawal,
                admin::reply_support,
                admin::disburse,
                application::submit,
                application::latest,
                chat::chat,
                loan::proceed,
                password_reset::send_reset_code,
                password_reset::verify_reset_code,
                payment::initiate,
                savings::submit_deposit,
                savings::summary,
                savings::request_withdrawal,
                support::submit,
                support::mine,
                webhook::webhook
            ],
        )
    })
}
