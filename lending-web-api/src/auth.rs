use crate::dto::ROLE_ADMIN;
use crate::pool::LendingConfig;
use hmac::{Hmac, Mac};
use jwt::token::verified::VerifyWithKey;
use lending_db_entity::db::user_roles::{Column as UserRoleColumn, Entity as UserRole};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use sha2::Sha256;
use std::{collections::BTreeMap, str::FromStr};
use tracing::{info, warn};
use uuid::Uuid;

/// Authenticated caller, extracted from the bearer session token.
///
/// Session issuance lives in the external auth service; this side only
/// verifies the shared-key signature and the expiry claim.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Debug)]
pub enum AuthError {
    Missing,
    Invalid,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<LendingConfig>>().await {
            Outcome::Success(config) => config,
            _ => return Outcome::Failure((Status::InternalServerError, AuthError::Missing)),
        };
        match req.headers().get_one("Authorization") {
            None => Outcome::Failure((Status::Unauthorized, AuthError::Missing)),
            Some(header) => {
                let token = header.strip_prefix("Bearer ").unwrap_or(header);
                match verify_session_token(&config.jwt_key, token) {
                    Some(user_id) => Outcome::Success(AuthUser { user_id }),
                    None => Outcome::Failure((Status::Unauthorized, AuthError::Invalid)),
                }
            }
        }
    }
}

pub fn verify_session_token(jwt_key: &str, token: &str) -> Option<Uuid> {
    let key: Hmac<Sha256> = match Hmac::new_from_slice(jwt_key.as_bytes()) {
        Ok(key) => key,
        Err(error) => {
            warn!("Faulty JWT key: {}", error);
            return None;
        }
    };
    let claims: BTreeMap<String, String> = match token.verify_with_key(&key) {
        Ok(claims) => claims,
        Err(error) => {
            info!("JWT verification error: {}", error);
            return None;
        }
    };

    let user_id = match claims.get("sub") {
        Some(sub) => match Uuid::parse_str(sub) {
            Ok(user_id) => user_id,
            Err(error) => {
                warn!("Bad subject claim: {}", error);
                return None;
            }
        },
        None => {
            info!("Token has no subject claim");
            return None;
        }
    };

    let expiry: chrono::DateTime<chrono::Local> = match claims.get("expiry") {
        Some(expiry) => match chrono::DateTime::from_str(expiry) {
            Ok(expiry) => expiry,
            Err(error) => {
                warn!("Bad expiry string: {}", error);
                return None;
            }
        },
        None => {
            info!("Token has no expiry claim");
            return None;
        }
    };
    let now = chrono::Local::now();
    if now.le(&expiry) {
        Some(user_id)
    } else {
        info!("Session token is expired");
        None
    }
}

/// Role gate evaluated before any admin-scoped query runs. Admin data
/// never leaves the database on a failed lookup.
pub async fn require_admin(db: &DatabaseConnection, user_id: Uuid) -> Result<(), String> {
    let role = UserRole::find()
        .filter(UserRoleColumn::UserId.eq(user_id))
        .filter(UserRoleColumn::Role.eq(ROLE_ADMIN))
        .one(db)
        .await;
    match role {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            info!("Admin access refused for user {}", user_id);
            Err("Admin access required".to_owned())
        }
        Err(error) => {
            warn!("Error checking admin role: {}", error);
            Err("Error checking permissions".to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jwt::SignWithKey;

    fn sign_token(jwt_key: &str, sub: &str, expiry: &str) -> String {
        let key: Hmac<Sha256> = Hmac::new_from_slice(jwt_key.as_bytes()).unwrap();
        let mut claims: BTreeMap<&str, &str> = BTreeMap::new();
        claims.insert("sub", sub);
        claims.insert("expiry", expiry);
        claims.sign_with_key(&key).unwrap()
    }

    #[test]
    fn valid_token_yields_user_id() {
        let user_id = Uuid::new_v4();
        let expiry = chrono::Local::now()
            .checked_add_days(chrono::Days::new(1))
            .unwrap()
            .to_string();
        let token = sign_token("test-key", &user_id.to_string(), &expiry);
        assert_eq!(verify_session_token("test-key", &token), Some(user_id));
    }

    #[test]
    fn expired_token_is_refused() {
        let user_id = Uuid::new_v4();
        let expiry = chrono::Local::now()
            .checked_sub_days(chrono::Days::new(1))
            .unwrap()
            .to_string();
        let token = sign_token("test-key", &user_id.to_string(), &expiry);
        assert_eq!(verify_session_token("test-key", &token), None);
    }

    #[test]
    fn wrong_key_is_refused() {
        let user_id = Uuid::new_v4();
        let expiry = chrono::Local::now()
            .checked_add_days(chrono::Days::new(1))
            .unwrap()
            .to_string();
        let token = sign_token("other-key", &user_id.to_string(), &expiry);
        assert_eq!(verify_session_token("test-key", &token), None);
    }

    #[test]
    fn garbage_subject_is_refused() {
        let expiry = chrono::Local::now()
            .checked_add_days(chrono::Days::new(1))
            .unwrap()
            .to_string();
        let token = sign_token("test-key", "not-a-uuid", &expiry);
        assert_eq!(verify_session_token("test-key", &token), None);
    }
}
