//! Shared fixtures for the engine tests: tiny PCAP files on a tempdir
//! and the documents that point at them.

use crate::app::AppState;
use owlcap_config::Config;
use owlcap_store::{MemoryDatastore, PcapFileDoc, Session, User};
use std::sync::Arc;

/// Minimal Ethernet/IPv4/TCP frame with the given payload.
pub fn tcp_frame(
    src: [u8; 4],
    sport: u16,
    dst: [u8; 4],
    dport: u16,
    seq: u32,
    payload: &[u8],
) -> Vec<u8> {
    let builder = etherparse::PacketBuilder::ethernet2([1; 6], [2; 6])
        .ipv4(src, dst, 64)
        .tcp(sport, dport, seq, 4096);
    let mut out = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut out, payload).unwrap();
    out
}

/// A little-endian microsecond PCAP file holding `frames`. Returns the
/// file bytes and each record's absolute offset.
pub fn build_pcap(frames: &[Vec<u8>]) -> (Vec<u8>, Vec<i64>) {
    let mut out = Vec::new();
    // magic, version 2.4, thiszone, sigfigs, snaplen, linktype ethernet
    out.extend_from_slice(&0xa1b2c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65536u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());

    let mut offsets = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        offsets.push(out.len() as i64);
        out.extend_from_slice(&(1000 + i as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
    (out, offsets)
}

pub fn test_config(pcap_dir: &str) -> Config {
    Config {
        node_name: "capture01".to_string(),
        password_secret: "fleet-secret".to_string(),
        pcap_dirs: pcap_dir.to_string(),
        cron_queries: true,
        ..Default::default()
    }
}

pub struct Fixture {
    pub state: Arc<AppState>,
    pub db: Arc<MemoryDatastore>,
    pub dir: tempfile::TempDir,
}

/// State + store + an empty spool directory.
pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let (state, db) = AppState::for_tests(test_config(&dir.path().display().to_string()));
    Fixture { state, db, dir }
}

impl Fixture {
    /// Registers a user; admins get every gate.
    pub fn add_user(&self, user_id: &str, admin: bool) {
        self.db.put_user(User {
            user_id: user_id.to_string(),
            user_name: user_id.to_string(),
            enabled: true,
            create_enabled: admin,
            remove_enabled: true,
            packet_search: true,
            web_enabled: true,
            ..Default::default()
        });
    }

    /// Writes a PCAP file of `frames` into the spool and registers it as
    /// file `num` for this node. Returns the record offsets.
    pub fn add_pcap_file(&self, num: i64, frames: &[Vec<u8>]) -> Vec<i64> {
        let (bytes, offsets) = build_pcap(frames);
        let path = self.dir.path().join(format!("cap-{num}.pcap"));
        std::fs::write(&path, &bytes).unwrap();
        self.db.put_file(PcapFileDoc {
            node: "capture01".to_string(),
            num,
            name: path.display().to_string(),
            first: 1000,
            filesize: bytes.len() as u64,
            ..Default::default()
        });
        offsets
    }

    /// A session on this node pointing at records of file `num`.
    pub fn add_session(
        &self,
        id: &str,
        last_packet_ms: u64,
        client_ip: [u8; 4],
        file_num: i64,
        offsets: &[i64],
    ) {
        let mut packet_pos = vec![-file_num];
        packet_pos.extend_from_slice(offsets);
        self.db.put_session(Session {
            id: id.to_string(),
            node: "capture01".to_string(),
            first_packet: last_packet_ms.saturating_sub(1000),
            last_packet: last_packet_ms,
            file_id: vec![file_num],
            packet_pos,
            src_ip: format!(
                "{}.{}.{}.{}",
                client_ip[0], client_ip[1], client_ip[2], client_ip[3]
            ),
            src_port: 49152,
            dst_ip: "10.0.0.100".to_string(),
            dst_port: 80,
            ..Default::default()
        });
    }
}
