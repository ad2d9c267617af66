//! The authentication chain, first match wins: peer token, trusted
//! header, digest, then anonymous in regression mode. GETs set the CSRF
//! cookie; mutations must echo it back in a header.

use crate::app::AppState;
use crate::errors::ApiError;
use crate::peer::auth::{
    sign_cookie, verify_cookie, verify_peer, COOKIE_HEADER, COOKIE_NAME, PEER_AUTH_HEADER,
};
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, SET_COOKIE, WWW_AUTHENTICATE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use md5::{Digest, Md5};
use owlcap_store::{Datastore, User};
use owlcap_utils::unix_time::unix_now;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The identity the auth chain resolved, injected into request
/// extensions for handlers and the history layer.
#[derive(Clone)]
pub struct AuthedUser {
    pub user: User,
    /// True when the request arrived with a valid peer token. S2S-only
    /// endpoints require this.
    pub via_peer_token: bool,
}

pub async fn auth_layer(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let authed = match resolve_identity(&state, &req, &path_and_query).await {
        Ok(authed) => authed,
        Err(resp) => return resp,
    };

    if !authed.user.enabled {
        return ApiError::Auth(format!("User {} is disabled", authed.user.user_id))
            .into_response();
    }

    // CSRF: mutations from browsers must echo the cookie back. Peer
    // traffic is bound by its own (much shorter) token window instead.
    let mutating = !matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS);
    if mutating && !authed.via_peer_token && !state.config.regression_tests {
        let header = req
            .headers()
            .get(COOKIE_HEADER)
            .and_then(|v| v.to_str().ok());
        let Some(token) = header else {
            return ApiError::Auth("Missing cookie token header".to_string()).into_response();
        };
        if let Err(e) = verify_cookie(&state.config.password_secret, token, &authed.user.user_id) {
            return ApiError::Auth(format!("Cookie token rejected: {e}")).into_response();
        }
    }

    let user_id = authed.user.user_id.clone();
    let set_cookie = *req.method() == Method::GET && jar.get(COOKIE_NAME).is_none();
    req.extensions_mut().insert(authed);
    let mut resp = next.run(req).await;

    if set_cookie {
        if let Ok(token) = sign_cookie(&state.config.password_secret, &user_id) {
            let cookie = format!("{COOKIE_NAME}={token}; Path=/; SameSite=Strict");
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                resp.headers_mut().append(SET_COOKIE, value);
            }
        }
    }
    resp
}

async fn resolve_identity(
    state: &AppState,
    req: &Request,
    path_and_query: &str,
) -> Result<AuthedUser, Response> {
    // (a) Peer token.
    if let Some(token) = req.headers().get(PEER_AUTH_HEADER) {
        let token = token
            .to_str()
            .map_err(|_| ApiError::Auth("Peer token is not ASCII".to_string()).into_response())?;
        let payload = verify_peer(
            state.config.server_secret_or_password(),
            token,
            path_and_query,
        )
        .map_err(|e| ApiError::Auth(format!("Peer token rejected: {e}")).into_response())?;
        let user = match fetch_user(state, &payload.user_id).await {
            Ok(user) => user,
            // Node-to-node traffic (cron forwards, receive) signs with the
            // node name rather than a person; trust the sealed token.
            Err(_) => system_user(&payload.user_id),
        };
        return Ok(AuthedUser {
            user,
            via_peer_token: true,
        });
    }

    // (b) Trusted header from an authenticating reverse proxy.
    if let Some(header_name) = &state.config.user_name_header {
        if let Some(value) = req.headers().get(header_name.as_str()) {
            if let Some(required) = &state.config.required_auth_header {
                let want = state.config.required_auth_header_val.as_deref();
                let have = req
                    .headers()
                    .get(required.as_str())
                    .and_then(|v| v.to_str().ok());
                match (want, have) {
                    (Some(want), Some(have)) if want == have => {}
                    (None, Some(_)) => {}
                    _ => {
                        return Err(ApiError::Auth(
                            "Required auth header missing or wrong".to_string(),
                        )
                        .into_response())
                    }
                }
            }
            let user_id = value
                .to_str()
                .map_err(|_| {
                    ApiError::Auth("User header is not ASCII".to_string()).into_response()
                })?
                .to_string();
            let user = match fetch_user(state, &user_id).await {
                Ok(user) => user,
                Err(e) => match auto_create_user(state, &user_id).await {
                    Some(user) => user,
                    None => return Err(e.into_response()),
                },
            };
            return Ok(AuthedUser {
                user,
                via_peer_token: false,
            });
        }
    }

    // (c) Digest.
    if let Some(authorization) = req.headers().get(AUTHORIZATION) {
        let authorization = authorization.to_str().unwrap_or_default();
        let user = check_digest(state, req.method().as_str(), authorization).await?;
        return Ok(AuthedUser {
            user,
            via_peer_token: false,
        });
    }

    // (d) Anonymous, regression runs only.
    if state.config.regression_tests {
        return Ok(AuthedUser {
            user: anonymous_user(),
            via_peer_token: false,
        });
    }

    Err(digest_challenge(state))
}

/// Cache-through user fetch.
pub async fn fetch_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    if let Some(user) = state.auth.users.get(user_id) {
        return Ok(user);
    }
    let user = state
        .stores
        .db
        .get_user(user_id)
        .await
        .map_err(|_| ApiError::Auth(format!("Unknown user {user_id}")))?;
    state.auth.users.put(user.clone());
    Ok(user)
}

/// Header-auth users can be minted from the configured template.
async fn auto_create_user(state: &AppState, user_id: &str) -> Option<User> {
    let tmpl = state.config.user_auto_create_tmpl.as_ref()?;
    let rendered = tmpl.replace("${userId}", user_id);
    let mut user: User = match serde_json::from_str(&rendered) {
        Ok(user) => user,
        Err(e) => {
            warn!("userAutoCreateTmpl does not parse: {e}");
            return None;
        }
    };
    user.user_id = user_id.to_string();
    if let Err(e) = state.stores.db.create_user(&user).await {
        warn!("Unable to auto-create user {user_id}: {e}");
        return None;
    }
    debug!("Auto-created user {user_id} from template");
    state.auth.users.put(user.clone());
    Some(user)
}

/// Peer-token identity with no user row behind it: the other viewer
/// proved it holds the fleet secret, which is the highest trust we have.
fn system_user(user_id: &str) -> User {
    User {
        user_id: user_id.to_string(),
        user_name: user_id.to_string(),
        enabled: true,
        create_enabled: false,
        remove_enabled: true,
        packet_search: true,
        web_enabled: true,
        ..Default::default()
    }
}

fn anonymous_user() -> User {
    User {
        user_id: "anonymous".to_string(),
        user_name: "Anonymous".to_string(),
        enabled: true,
        create_enabled: true,
        remove_enabled: true,
        packet_search: true,
        web_enabled: true,
        ..Default::default()
    }
}

fn md5_hex(data: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Stateless challenge nonce: opaque, hour-granular, bound to the fleet
/// secret.
fn digest_nonce(state: &AppState) -> String {
    let hour = unix_now().unwrap_or(0) / 3600;
    md5_hex(&format!("{}:{hour}", state.config.password_secret))
}

fn digest_challenge(state: &AppState) -> Response {
    let challenge = format!(
        "Digest realm=\"{}\", nonce=\"{}\", qop=\"auth\"",
        state.config.http_realm,
        digest_nonce(state)
    );
    let mut resp = StatusCode::UNAUTHORIZED.into_response();
    if let Ok(value) = HeaderValue::from_str(&challenge) {
        resp.headers_mut().insert(WWW_AUTHENTICATE, value);
    }
    resp
}

fn parse_digest_header(header: &str) -> Option<HashMap<String, String>> {
    let rest = header.strip_prefix("Digest ")?;
    let mut fields = HashMap::new();
    for part in rest.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        fields.insert(
            key.trim().to_string(),
            value.trim().trim_matches('"').to_string(),
        );
    }
    Some(fields)
}

/// RFC 2617 verification against the user's HA1 store.
async fn check_digest(
    state: &AppState,
    method: &str,
    authorization: &str,
) -> Result<User, Response> {
    let Some(fields) = parse_digest_header(authorization) else {
        return Err(digest_challenge(state));
    };
    let (Some(username), Some(uri), Some(nonce), Some(response)) = (
        fields.get("username"),
        fields.get("uri"),
        fields.get("nonce"),
        fields.get("response"),
    ) else {
        return Err(digest_challenge(state));
    };

    let user = fetch_user(state, username)
        .await
        .map_err(|e| e.into_response())?;
    if user.pass_store.is_empty() {
        return Err(ApiError::Auth(format!("User {username} has no password")).into_response());
    }

    let ha2 = md5_hex(&format!("{method}:{uri}"));
    let expected = match (fields.get("qop"), fields.get("nc"), fields.get("cnonce")) {
        (Some(qop), Some(nc), Some(cnonce)) => {
            md5_hex(&format!("{}:{nonce}:{nc}:{cnonce}:{qop}:{ha2}", user.pass_store))
        }
        _ => md5_hex(&format!("{}:{nonce}:{ha2}", user.pass_store)),
    };
    if expected != *response {
        return Err(ApiError::Auth("Bad digest response".to_string()).into_response());
    }
    Ok(user)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn digest_header_parsing() {
        let fields = parse_digest_header(
            "Digest username=\"alice\", realm=\"Owlcap\", nonce=\"abc\", uri=\"/api/hunts\", \
             response=\"deadbeef\", qop=auth, nc=00000001, cnonce=\"xyz\"",
        )
        .unwrap();
        assert_eq!(fields["username"], "alice");
        assert_eq!(fields["uri"], "/api/hunts");
        assert_eq!(fields["qop"], "auth");
        assert!(parse_digest_header("Basic Zm9vOmJhcg==").is_none());
    }

    #[test]
    fn digest_math_matches_rfc2617() {
        // HA1 for alice:Owlcap:secret
        let ha1 = md5_hex("alice:Owlcap:secret");
        let ha2 = md5_hex("GET:/api/hunts");
        let expected = md5_hex(&format!("{ha1}:nonce1:00000001:cn:auth:{ha2}"));
        // The same inputs must reproduce; digest auth is pure arithmetic.
        let again = md5_hex(&format!("{ha1}:nonce1:00000001:cn:auth:{ha2}"));
        assert_eq!(expected, again);
        assert_eq!(ha1.len(), 32);
    }
}
