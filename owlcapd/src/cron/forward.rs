//! Ships a session (SPI + packets) to a remote cluster's receive
//! endpoint, framed so the receiver can split the two without parsing.

use crate::app::AppState;
use crate::errors::ApiError;
use crate::peer::auth::{sign_peer, PEER_AUTH_HEADER};
use crate::pcaps;
use owlcap_store::Session;
use owlcap_utils::base36;
use owlcap_utils::unix_time::unix_now_ms;

/// `u32 BE spiLen | u32 BE reserved-zero | u32 BE pcapLen | spi | pcap`.
pub fn frame_session(spi_json: &[u8], pcap_bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + spi_json.len() + pcap_bytes.len());
    out.extend_from_slice(&(spi_json.len() as u32).to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&(pcap_bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(spi_json);
    out.extend_from_slice(pcap_bytes);
    out
}

/// Splits a received frame back into `(spi_json, pcap_bytes)`.
pub fn unframe_session(body: &[u8]) -> Result<(&[u8], &[u8]), ApiError> {
    if body.len() < 12 {
        return Err(ApiError::Validation("Forward frame too short".to_string()));
    }
    let spi_len = u32::from_be_bytes([body[0], body[1], body[2], body[3]]) as usize;
    let pcap_len = u32::from_be_bytes([body[8], body[9], body[10], body[11]]) as usize;
    let spi_start = 12;
    let pcap_start = spi_start + spi_len;
    if body.len() < pcap_start + pcap_len {
        return Err(ApiError::Validation(format!(
            "Forward frame truncated: framed {} + {} bytes, got {}",
            spi_len,
            pcap_len,
            body.len() - 12
        )));
    }
    Ok((
        &body[spi_start..pcap_start],
        &body[pcap_start..pcap_start + pcap_len],
    ))
}

/// The per-operation id the receiver correlates frames with.
pub fn make_save_id(node_name: &str) -> String {
    let now = unix_now_ms().unwrap_or(0);
    format!("{node_name}-{}", base36::encode(now))
}

/// Reads a locally owned session's bytes and POSTs the frame to the
/// remote cluster.
pub async fn forward_local_session(
    state: &AppState,
    cluster_name: &str,
    session: &Session,
) -> Result<(), ApiError> {
    let cluster = state
        .config
        .remote_clusters
        .get(cluster_name)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown remote cluster {cluster_name}")))?;

    let (pcap_bytes, new_positions) = pcaps::session_pcap_bytes(state, session).await?;

    // SPI goes over with packetPos rewritten to offsets in the shipped
    // mini-file; the receiver assigns its own file number.
    let mut spi = session.clone();
    spi.packet_pos = new_positions;
    spi.file_id = Vec::new();
    let spi_json = serde_json::to_vec(&spi)
        .map_err(|e| ApiError::Backend(format!("Unable to serialize SPI: {e}")))?;

    let save_id = make_save_id(&state.cluster.node_name);
    let path = format!("/api/sessions/receive?saveId={save_id}");
    let secret = cluster
        .secret()
        .unwrap_or_else(|| state.config.server_secret_or_password());
    let token = sign_peer(secret, &state.cluster.node_name, &path)
        .map_err(|e| ApiError::Backend(format!("Unable to sign forward token: {e}")))?;

    let url = format!("{}{}", cluster.url.trim_end_matches('/'), path);
    let scheme = if url.starts_with("https") { "https" } else { "http" };
    let client = state.cluster.peers.for_scheme(scheme);
    let resp = client
        .post(&url)
        .header(PEER_AUTH_HEADER, token)
        // Fixed-length framing; the receiver reads Content-Length.
        .header("content-type", "application/x-www-form-urlencoded")
        .body(frame_session(&spi_json, &pcap_bytes))
        .send()
        .await
        .map_err(|e| ApiError::Transport(format!("Cluster {cluster_name} unreachable: {e}")))?;
    if !resp.status().is_success() {
        return Err(ApiError::Backend(format!(
            "Cluster {cluster_name} refused session {}: HTTP {}",
            session.id,
            resp.status()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn frame_layout() {
        let spi = br#"{"node":"n1"}"#;
        let pcap = [0xAAu8; 40];
        let frame = frame_session(spi, &pcap);
        assert_eq!(&frame[0..4], &(spi.len() as u32).to_be_bytes());
        assert_eq!(&frame[4..8], &[0, 0, 0, 0]);
        assert_eq!(&frame[8..12], &(pcap.len() as u32).to_be_bytes());
        assert_eq!(&frame[12..12 + spi.len()], spi);

        let (spi_back, pcap_back) = unframe_session(&frame).unwrap();
        assert_eq!(spi_back, spi);
        assert_eq!(pcap_back, &pcap);
    }

    #[test]
    fn truncated_frames_are_rejected() {
        let frame = frame_session(b"{}", &[1, 2, 3]);
        assert!(unframe_session(&frame[..frame.len() - 1]).is_err());
        assert!(unframe_session(&[0u8; 4]).is_err());
    }

    #[test]
    fn save_ids_carry_the_node_name() {
        let id = make_save_id("capture01");
        assert!(id.starts_with("capture01-"));
        let suffix = id.strip_prefix("capture01-").unwrap();
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
