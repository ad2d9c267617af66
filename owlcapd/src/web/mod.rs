//! The HTTP front: auth chain, CSRF, history, response-time header, and
//! the handler table.

pub mod api;
pub mod auth;
pub mod history;
pub mod response_time;

use crate::app::AppState;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// Long scroll-backed downloads get twenty minutes, then the request dies.
const REQUEST_DEADLINE: Duration = Duration::from_secs(20 * 60);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::misc::health))
        // Hunts
        .route("/api/hunt", post(api::hunts::create_hunt))
        .route("/api/hunts", get(api::hunts::list_hunts))
        .route("/api/hunt/:id", delete(api::hunts::delete_hunt))
        .route("/api/hunt/:id/pause", put(api::hunts::pause_hunt))
        .route("/api/hunt/:id/play", put(api::hunts::play_hunt))
        .route(
            "/:node/hunt/:huntid/remote/:sessionid",
            get(api::hunts::remote_hunt_session),
        )
        // Cron queries
        .route("/api/user/cron", post(api::crons::create_cron))
        .route("/api/user/crons", get(api::crons::list_crons))
        .route(
            "/api/user/cron/:key",
            post(api::crons::update_cron).delete(api::crons::delete_cron),
        )
        // Sessions and scrub
        .route("/api/session/:id/pcap", get(api::sessions::session_pcap))
        .route("/api/delete", post(api::sessions::delete_sessions))
        .route("/:node/delete/:what/:sid", get(api::sessions::remote_delete))
        .route("/api/sessions/receive", post(api::sessions::receive))
        .route(
            "/:node/session/:id/forward",
            post(api::sessions::forward_session),
        )
        // Stats and plumbing
        .route("/api/files", get(api::misc::list_files))
        .route("/api/stats", get(api::misc::stats))
        .route("/api/lookup", post(api::misc::create_lookup))
        .route("/api/esadmin/cancel", post(api::misc::esadmin_cancel))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            history::history_layer,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            response_time::response_time_layer,
        ))
        .layer(CorsLayer::very_permissive())
        .layer(TimeoutLayer::new(REQUEST_DEADLINE))
        .with_state(state)
}

/// Binds and serves. A bind failure is fatal at boot; the caller exits 1.
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.view_host, state.config.view_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Viewer listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::peer::auth::{sign_peer, PEER_AUTH_HEADER};
    use crate::testutil::fixture;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn regression_fixture() -> crate::testutil::Fixture {
        let fx = fixture();
        // Rebuild with regression auth so requests need no credentials.
        let mut config = fx.state.config.clone();
        config.regression_tests = true;
        let dir = fx.dir;
        let (state, db) = crate::app::AppState::for_tests(config);
        crate::testutil::Fixture { state, db, dir }
    }

    #[tokio::test]
    async fn health_answers_with_response_time_header() {
        let fx = regression_fixture();
        let resp = router(fx.state.clone())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .headers()
            .contains_key(crate::web::response_time::RESPONSE_TIME_HEADER));
        assert_eq!(
            resp.headers().get("X-Frame-Options").unwrap(),
            "DENY"
        );
    }

    #[tokio::test]
    async fn no_credentials_means_a_digest_challenge() {
        let fx = fixture();
        let resp = router(fx.state.clone())
            .oneshot(Request::get("/api/hunts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let challenge = resp.headers().get("www-authenticate").unwrap();
        assert!(challenge.to_str().unwrap().starts_with("Digest realm="));
    }

    #[tokio::test]
    async fn receive_rejects_non_peer_identities() {
        let fx = regression_fixture();
        let resp = router(fx.state.clone())
            .oneshot(
                Request::post("/api/sessions/receive?saveId=x-1")
                    .body(Body::from(vec![0u8; 16]))
                    .unwrap(),
            )
            .await
            .unwrap();
        // Anonymous regression identity is not a peer token.
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn peer_tokens_authenticate_and_bind_to_the_path() {
        let fx = fixture();
        fx.add_user("alice", false);
        let path = "/api/hunts";
        let token = sign_peer(
            fx.state.config.server_secret_or_password(),
            "alice",
            path,
        )
        .unwrap();

        let resp = router(fx.state.clone())
            .oneshot(
                Request::get(path)
                    .header(PEER_AUTH_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // The same token on a different path is rejected.
        let resp = router(fx.state.clone())
            .oneshot(
                Request::get("/api/files")
                    .header(PEER_AUTH_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn non_owned_sessions_route_toward_the_owner() {
        let fx = regression_fixture();
        fx.db.put_session(owlcap_store::Session {
            id: "s-far".to_string(),
            node: "capture02".to_string(),
            file_id: vec![1],
            packet_pos: vec![-1, 24],
            ..Default::default()
        });
        // capture02 isn't in the fleet map, so the hop fails to resolve;
        // the point is that the request went to routing, not local disk.
        let resp = router(fx.state.clone())
            .oneshot(
                Request::get("/api/session/s-far/pcap")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn history_records_authenticated_requests() {
        let fx = regression_fixture();
        let _ = router(fx.state.clone())
            .oneshot(Request::get("/api/hunts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let entries = fx.db.history_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].api, "/api/hunts");
        assert_eq!(entries[0].user_id, "anonymous");
    }
}
