//! Bus authentication mode selection.
//!
//! Non-production environments connect with user/password when both are
//! configured, otherwise unauthenticated. Production requires JWT
//! authentication: the token is fetched from an external auth endpoint and
//! connection nonces are signed with the configured seed. Missing
//! production credentials are a startup error.

use serde::{Deserialize, Serialize};
use tracing::info;

use courier_types::config::{BusConfig, Environment};
use courier_types::error::TransportError;

/// Resolved authentication material for the bus connection.
#[derive(Debug, Clone)]
pub enum BusAuth {
    None,
    UserPassword { user: String, password: String },
    Jwt { jwt: String, seed: String },
}

/// The credential mode implied by configuration, before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthMode {
    None,
    UserPassword,
    Jwt,
}

pub(crate) fn select_mode(
    config: &BusConfig,
    environment: Environment,
) -> Result<AuthMode, TransportError> {
    if environment.is_production() {
        let complete = config.auth_url.as_deref().is_some_and(|s| !s.is_empty())
            && config.access_key.as_deref().is_some_and(|s| !s.is_empty())
            && config.secret_key.as_deref().is_some_and(|s| !s.is_empty());
        if !complete {
            return Err(TransportError::Connection(
                "production requires bus auth URL, access key, and secret key".to_string(),
            ));
        }
        return Ok(AuthMode::Jwt);
    }

    match (&config.user, &config.password) {
        (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
            Ok(AuthMode::UserPassword)
        }
        _ => Ok(AuthMode::None),
    }
}

#[derive(Serialize)]
struct JwtRequest<'a> {
    access_key: &'a str,
    secret_key: &'a str,
}

#[derive(Deserialize)]
struct JwtResponse {
    value: String,
}

/// Fetch a connection JWT from the auth endpoint.
async fn fetch_jwt(
    auth_url: &str,
    access_key: &str,
    secret_key: &str,
) -> Result<String, TransportError> {
    let response = reqwest::Client::new()
        .post(auth_url)
        .json(&JwtRequest {
            access_key,
            secret_key,
        })
        .send()
        .await
        .map_err(|e| TransportError::Connection(format!("bus JWT auth request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(TransportError::Connection(format!(
            "bus JWT auth failed: HTTP {}",
            response.status().as_u16()
        )));
    }

    let body: JwtResponse = response
        .json()
        .await
        .map_err(|e| TransportError::Connection(format!("bus JWT auth response invalid: {e}")))?;
    Ok(body.value)
}

/// Resolve the authentication material for the configured environment.
pub async fn resolve_auth(
    config: &BusConfig,
    environment: Environment,
) -> Result<BusAuth, TransportError> {
    match select_mode(config, environment)? {
        AuthMode::None => {
            info!("connecting to bus without authentication");
            Ok(BusAuth::None)
        }
        AuthMode::UserPassword => {
            info!("connecting to bus with user/password authentication");
            Ok(BusAuth::UserPassword {
                user: config.user.clone().unwrap_or_default(),
                password: config.password.clone().unwrap_or_default(),
            })
        }
        AuthMode::Jwt => {
            info!("connecting to bus with JWT authentication");
            // select_mode guarantees these are present.
            let auth_url = config.auth_url.clone().unwrap_or_default();
            let access_key = config.access_key.clone().unwrap_or_default();
            let secret_key = config.secret_key.clone().unwrap_or_default();
            let jwt = fetch_jwt(&auth_url, &access_key, &secret_key).await?;
            Ok(BusAuth::Jwt {
                jwt,
                seed: secret_key,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
