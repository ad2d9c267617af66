use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A session (SPI) document. Created by the capture process; this system
/// reads it and mutates tags and hunt markers only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Session {
    /// Document id. Not part of the stored body.
    #[serde(skip)]
    pub id: String,

    /// The capture node whose local disk holds this session's packets.
    #[serde(default)]
    pub node: String,

    #[serde(rename = "firstPacket", default)]
    pub first_packet: u64,

    /// Milliseconds. Hunt and cron windows slice on this field.
    #[serde(rename = "lastPacket", default)]
    pub last_packet: u64,

    /// File numbers this session's packets live in.
    #[serde(rename = "fileId", default)]
    pub file_id: Vec<i64>,

    /// Absolute byte offsets. A negative entry selects the file number for
    /// the positive offsets that follow it.
    #[serde(rename = "packetPos", default)]
    pub packet_pos: Vec<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(rename = "huntId", default, skip_serializing_if = "Vec::is_empty")]
    pub hunt_id: Vec<String>,

    #[serde(rename = "huntName", default, skip_serializing_if = "Vec::is_empty")]
    pub hunt_name: Vec<String>,

    #[serde(rename = "srcIp", default)]
    pub src_ip: String,

    #[serde(rename = "srcPort", default)]
    pub src_port: u16,

    #[serde(rename = "dstIp", default)]
    pub dst_ip: String,

    #[serde(rename = "dstPort", default)]
    pub dst_port: u16,

    /// Who scrubbed this session's payload, if anyone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrubby: Option<String>,

    /// When it was scrubbed (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrubat: Option<u64>,

    /// Protocol fields and anything else the capture process indexed.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Walks `packet_pos`, resolving the file-number switch entries into
    /// `(file_num, offset)` pairs.
    pub fn packet_locations(&self) -> Vec<(i64, u64)> {
        let mut out = Vec::with_capacity(self.packet_pos.len());
        let mut current_file = self.file_id.first().copied().unwrap_or(0);
        for &pos in &self.packet_pos {
            if pos < 0 {
                current_file = -pos;
            } else {
                out.push((current_file, pos as u64));
            }
        }
        out
    }

    /// The `(srcIp, srcPort, dstIp, dstPort)` tuple used to classify packet
    /// direction during packet search.
    pub fn fingerprint(&self) -> (String, u16, String, u16) {
        (
            self.src_ip.clone(),
            self.src_port,
            self.dst_ip.clone(),
            self.dst_port,
        )
    }
}
