//! Local packet access for sessions this node owns: decode for packet
//! search, raw bytes for download/forward, and the destructive scrub
//! policy.

use crate::app::AppState;
use crate::errors::ApiError;
use owlcap_pcap::{scrub_packet, DecodedPacket, OpenMode, GLOBAL_HEADER_LEN};
use owlcap_store::{Datastore, Session};
use owlcap_utils::unix_time::unix_now_ms;
use serde_json::json;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Scrub scope, straight off the request path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhatToRemove {
    /// Delete the session document only.
    Spi,
    /// Overwrite the payload bytes, keep the document (marked scrubbed).
    Pcap,
    /// Both.
    All,
}

impl FromStr for WhatToRemove {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spi" => Ok(WhatToRemove::Spi),
            "pcap" => Ok(WhatToRemove::Pcap),
            "all" => Ok(WhatToRemove::All),
            other => Err(ApiError::Validation(format!(
                "Bad removal scope '{other}', expected spi, pcap, or all"
            ))),
        }
    }
}

/// Decodes every packet of a locally owned session, wire order.
pub async fn session_packets(
    state: &AppState,
    session: &Session,
) -> Result<Vec<DecodedPacket>, ApiError> {
    let mut packets = Vec::new();
    for (file_num, offset) in session.packet_locations() {
        let handle = open_file(state, &session.node, file_num, OpenMode::Read).await?;
        let mut file = handle.lock().map_err(|_| poisoned())?;
        let (_, frame) = file
            .read_packet(offset)
            .map_err(|e| ApiError::Backend(e.to_string()))?;
        if let Some(packet) = DecodedPacket::from_ethernet(&frame) {
            packets.push(packet);
        }
    }
    Ok(packets)
}

/// The session's bytes as a standalone PCAP: the owning file's global
/// header followed by each raw record. Offsets of each record in the new
/// file come back alongside, for packetPos rewriting on a forward.
pub async fn session_pcap_bytes(
    state: &AppState,
    session: &Session,
) -> Result<(Vec<u8>, Vec<i64>), ApiError> {
    let locations = session.packet_locations();
    if locations.is_empty() {
        return Err(ApiError::NotFound(format!(
            "Session {} has no packets on disk",
            session.id
        )));
    }
    let mut out = Vec::new();
    let mut new_positions = Vec::new();
    for (i, (file_num, offset)) in locations.iter().enumerate() {
        let handle = open_file(state, &session.node, *file_num, OpenMode::Read).await?;
        let mut file = handle.lock().map_err(|_| poisoned())?;
        if i == 0 {
            out.extend_from_slice(&file.global_header_bytes());
        }
        new_positions.push(out.len() as i64);
        let record = file
            .read_raw_record(*offset)
            .map_err(|e| ApiError::Backend(e.to_string()))?;
        out.extend_from_slice(&record);
    }
    Ok((out, new_positions))
}

/// Applies the scrub policy to a locally owned session.
pub async fn scrub_session(
    state: &AppState,
    session_id: &str,
    what: WhatToRemove,
    user_id: &str,
) -> Result<(), ApiError> {
    let session = state.stores.db.get_session(session_id).await?;

    if matches!(what, WhatToRemove::Pcap | WhatToRemove::All) {
        for (file_num, offset) in session.packet_locations() {
            let handle = open_file(state, &session.node, file_num, OpenMode::Write).await?;
            let mut file = handle.lock().map_err(|_| poisoned())?;
            scrub_packet(&mut file, offset, false)
                .map_err(|e| ApiError::Backend(e.to_string()))?;
        }
        if what == WhatToRemove::Pcap {
            let now = unix_now_ms().map_err(|e| ApiError::Backend(e.to_string()))?;
            state
                .stores
                .db
                .update_session(session_id, &json!({ "scrubby": user_id, "scrubat": now }))
                .await?;
        }
    }

    if matches!(what, WhatToRemove::Spi | WhatToRemove::All) {
        state.stores.db.delete_session(session_id).await?;
    }

    info!("Scrubbed session {session_id} ({what:?}) for {user_id}");
    Ok(())
}

/// Writes a received pcap blob into the local spool and registers it,
/// returning `(file_num, packet offsets)` for the new session document.
pub async fn store_received_pcap(
    state: &AppState,
    save_id: &str,
    pcap_bytes: &[u8],
) -> Result<(i64, Vec<i64>), ApiError> {
    let dirs = state.config.pcap_dir_list();
    let dir = dirs
        .first()
        .ok_or_else(|| ApiError::Backend("No pcap directory configured".to_string()))?;
    let file_num = unix_now_ms().map_err(|e| ApiError::Backend(e.to_string()))? as i64;
    let safe_save_id: String = save_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    let path = format!("{dir}/{}-{file_num}.pcap", safe_save_id);
    std::fs::write(&path, pcap_bytes)
        .map_err(|e| ApiError::Backend(format!("Unable to spool {path}: {e}")))?;

    state
        .stores
        .db
        .create_file(&owlcap_store::PcapFileDoc {
            node: state.cluster.node_name.clone(),
            num: file_num,
            name: path.clone(),
            first: file_num as u64 / 1000,
            filesize: pcap_bytes.len() as u64,
            ..Default::default()
        })
        .await?;

    // Walk the blob to learn each record's offset in the new file.
    let handle = open_file(state, &state.cluster.node_name, file_num, OpenMode::Read).await?;
    let mut file = handle.lock().map_err(|_| poisoned())?;
    let mut offsets = Vec::new();
    let mut pos = GLOBAL_HEADER_LEN as u64;
    while (pos as usize) < pcap_bytes.len() {
        let header = file
            .read_record_header(pos)
            .map_err(|e| ApiError::Validation(format!("Bad pcap frame in payload: {e}")))?;
        offsets.push(pos as i64);
        pos += (owlcap_pcap::RECORD_HEADER_LEN as u64) + header.inc_len as u64;
    }
    Ok((file_num, offsets))
}

async fn open_file(
    state: &AppState,
    node: &str,
    file_num: i64,
    mode: OpenMode,
) -> Result<std::sync::Arc<std::sync::Mutex<owlcap_pcap::PcapFile>>, ApiError> {
    let doc = state.stores.db.get_file(node, file_num).await?;
    state
        .stores
        .handles
        .open(mode, node, file_num, Path::new(&doc.name))
        .map_err(|e| ApiError::Backend(e.to_string()))
}

fn poisoned() -> ApiError {
    ApiError::Backend("PCAP handle poisoned".to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::{fixture, tcp_frame};
    use owlcap_pcap::SCRUB_TEXT_FILL;

    fn seed_one_session(fx: &crate::testutil::Fixture) -> Vec<i64> {
        let frames = vec![
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 100], 80, 1, b"GET /secret HTTP/1.1\r\n"),
            tcp_frame([10, 0, 0, 100], 80, [10, 0, 0, 1], 49152, 1, b"HTTP/1.1 200 OK\r\n"),
        ];
        let offsets = fx.add_pcap_file(1, &frames);
        fx.add_session("s1", 1_500_000, [10, 0, 0, 1], 1, &offsets);
        offsets
    }

    #[tokio::test]
    async fn scrub_all_destroys_payload_and_document() {
        let fx = fixture();
        let offsets = seed_one_session(&fx);
        let file_path = fx.db.get_file("capture01", 1).await.unwrap().name;

        scrub_session(&fx.state, "s1", WhatToRemove::All, "admin")
            .await
            .unwrap();

        // (c) the document is gone.
        assert!(fx.state.stores.db.get_session("s1").await.is_err());

        // (b) the bytes at each offset are the final fill pattern.
        let bytes = std::fs::read(&file_path).unwrap();
        for offset in offsets {
            let payload_start = offset as usize + owlcap_pcap::RECORD_HEADER_LEN;
            assert_eq!(&bytes[payload_start..payload_start + 16], SCRUB_TEXT_FILL);
        }
    }

    #[tokio::test]
    async fn scrub_pcap_keeps_a_marked_document() {
        let fx = fixture();
        seed_one_session(&fx);

        scrub_session(&fx.state, "s1", WhatToRemove::Pcap, "admin")
            .await
            .unwrap();

        let session = fx.state.stores.db.get_session("s1").await.unwrap();
        assert_eq!(session.scrubby.as_deref(), Some("admin"));
        assert!(session.scrubat.is_some());
    }

    #[tokio::test]
    async fn scrub_pcap_twice_is_byte_identical() {
        let fx = fixture();
        seed_one_session(&fx);
        let file_path = fx.db.get_file("capture01", 1).await.unwrap().name;

        scrub_session(&fx.state, "s1", WhatToRemove::Pcap, "admin")
            .await
            .unwrap();
        let first = std::fs::read(&file_path).unwrap();
        scrub_session(&fx.state, "s1", WhatToRemove::Pcap, "admin")
            .await
            .unwrap();
        let second = std::fs::read(&file_path).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn scrub_spi_leaves_the_file_alone() {
        let fx = fixture();
        seed_one_session(&fx);
        let file_path = fx.db.get_file("capture01", 1).await.unwrap().name;
        let before = std::fs::read(&file_path).unwrap();

        scrub_session(&fx.state, "s1", WhatToRemove::Spi, "admin")
            .await
            .unwrap();

        assert!(fx.state.stores.db.get_session("s1").await.is_err());
        assert_eq!(std::fs::read(&file_path).unwrap(), before);
    }

    #[tokio::test]
    async fn session_pcap_bytes_is_a_standalone_capture() {
        let fx = fixture();
        seed_one_session(&fx);
        let session = fx.state.stores.db.get_session("s1").await.unwrap();

        let (bytes, positions) = session_pcap_bytes(&fx.state, &session).await.unwrap();
        assert_eq!(positions[0], GLOBAL_HEADER_LEN as i64);
        // Parses as a pcap and yields both records.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pcap");
        std::fs::write(&path, &bytes).unwrap();
        let mut file = owlcap_pcap::PcapFile::open_read(&path).unwrap();
        for pos in positions {
            let (_, payload) = file.read_packet(pos as u64).unwrap();
            assert!(!payload.is_empty());
        }
    }

    #[tokio::test]
    async fn received_pcap_spools_and_walks_offsets() {
        let fx = fixture();
        let (bytes, offsets) = crate::testutil::build_pcap(&[
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 100], 80, 1, b"hello"),
            tcp_frame([10, 0, 0, 100], 80, [10, 0, 0, 1], 49152, 1, b"world"),
        ]);

        let (file_num, walked) = store_received_pcap(&fx.state, "capture09-abc", &bytes)
            .await
            .unwrap();
        assert_eq!(walked, offsets);
        let doc = fx.db.get_file("capture01", file_num).await.unwrap();
        assert!(std::path::Path::new(&doc.name).exists());
        assert_eq!(doc.filesize, bytes.len() as u64);
    }

    #[test]
    fn removal_scope_parses() {
        assert_eq!("spi".parse::<WhatToRemove>().unwrap(), WhatToRemove::Spi);
        assert_eq!("pcap".parse::<WhatToRemove>().unwrap(), WhatToRemove::Pcap);
        assert_eq!("all".parse::<WhatToRemove>().unwrap(), WhatToRemove::All);
        assert!("everything".parse::<WhatToRemove>().is_err());
    }
}
