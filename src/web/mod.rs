//! Human-verification page.
//!
//! GET renders the CAPTCHA challenge for a valid verify token; POST checks
//! the answer with the provider and hands back a success token as a
//! ready-to-paste /start command. Every failure path renders an error page;
//! nothing escapes as a raw 500.

mod captcha;
mod pages;

use std::sync::Arc;

use axum::extract::{Host, Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::token::{TokenClaims, TokenCodec, TokenError, TokenKind};

/// State shared by the verification-page handlers.
#[derive(Clone)]
pub struct WebState {
    pub config: Arc<Config>,
    pub tokens: Arc<TokenCodec>,
    pub bot_username: String,
    pub http: reqwest::Client,
}

/// Router serving the verification page at the configured URL's path.
pub fn router(state: WebState) -> Router {
    let path = match state.config.verify_url.path() {
        "" | "/" => "/verify".to_string(),
        p => p.to_string(),
    };
    Router::new()
        .route(&path, get(verify_page).post(verify_submit))
        .with_state(state)
}

#[derive(Deserialize)]
struct VerifyParams {
    token: Option<String>,
}

#[derive(Deserialize)]
struct SubmitForm {
    #[serde(rename = "g-recaptcha-response")]
    captcha_response: Option<String>,
    verify_token: Option<String>,
}

async fn verify_page(
    State(state): State<WebState>,
    Query(params): Query<VerifyParams>,
) -> Html<String> {
    let Some(token) = params.token.filter(|t| !t.is_empty()) else {
        return pages::error_page("Missing token parameter.");
    };
    let claims = match decode_verify_token(&state, &token) {
        Ok(claims) => claims,
        Err(page) => return page,
    };
    debug!("rendering CAPTCHA form for user {}", claims.user_id);
    pages::captcha_form(&state.config.recaptcha_site_key, &token)
}

async fn verify_submit(
    State(state): State<WebState>,
    Host(host): Host,
    Form(form): Form<SubmitForm>,
) -> Html<String> {
    let (Some(answer), Some(token)) = (
        nonempty(form.captcha_response),
        nonempty(form.verify_token),
    ) else {
        return pages::error_page("Incomplete submission (missing CAPTCHA answer or token).");
    };
    let claims = match decode_verify_token(&state, &token) {
        Ok(claims) => claims,
        Err(page) => return page,
    };

    let outcome =
        match captcha::verify(&state.http, &state.config.recaptcha_secret_key, &answer).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("CAPTCHA verification call failed: {e}");
                return pages::error_page("CAPTCHA check failed (network error), please retry.");
            }
        };
    if !outcome.success
        || !hostname_allowed(&state.config.verify_url, &host, outcome.hostname.as_deref())
    {
        debug!("CAPTCHA rejected: {:?}", outcome.error_codes);
        return pages::error_page("Human verification failed, please go back and retry.");
    }

    // The success token inherits the verify token's expiry: passing the
    // CAPTCHA does not extend the window.
    let success = match state.tokens.issue_success(claims.user_id, claims.exp) {
        Ok(token) => token,
        Err(e) => {
            warn!("issuing success token failed: {e}");
            return pages::error_page("Internal error, please try again later.");
        }
    };
    pages::success_page(&state.bot_username, &success)
}

fn decode_verify_token(state: &WebState, token: &str) -> Result<TokenClaims, Html<String>> {
    let claims = state.tokens.decode(token).map_err(|e| match e {
        TokenError::Expired => pages::error_page(
            "The link has expired. Go back to Telegram and request a new one.",
        ),
        TokenError::Invalid => pages::error_page("Invalid link or token."),
    })?;
    if claims.kind != TokenKind::Verify {
        return Err(pages::error_page("Wrong token type."));
    }
    Ok(claims)
}

/// The CAPTCHA provider reports the hostname that solved the challenge; it
/// must be the request's host or the configured verification-page host.
fn hostname_allowed(verify_url: &Url, request_host: &str, reported: Option<&str>) -> bool {
    let Some(reported) = reported else {
        return false;
    };
    let request_host = request_host.split(':').next().unwrap_or(request_host);
    if reported == request_host {
        return true;
    }
    verify_url.host_str().is_some_and(|h| h == reported)
}

fn nonempty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_check_accepts_request_host_with_port() {
        let url = Url::parse("https://bot.example.com/verify").unwrap();
        assert!(hostname_allowed(&url, "other.example.com:8443", Some("other.example.com")));
    }

    #[test]
    fn hostname_check_accepts_configured_host() {
        let url = Url::parse("https://bot.example.com/verify").unwrap();
        assert!(hostname_allowed(&url, "proxy.internal", Some("bot.example.com")));
    }

    #[test]
    fn hostname_check_rejects_foreign_and_missing_hosts() {
        let url = Url::parse("https://bot.example.com/verify").unwrap();
        assert!(!hostname_allowed(&url, "bot.example.com", Some("evil.example.net")));
        assert!(!hostname_allowed(&url, "bot.example.com", None));
    }
}
