//! Local PCAP file access: offset reads, destructive scrubbing, packet
//! decoding, and the per-`(mode, node, file)` handle cache.

mod file;
mod handle_cache;
mod packet;
mod reassembly;
mod scrub;

pub use file::{PcapFile, PcapFileHeader, PcapRecordHeader, GLOBAL_HEADER_LEN, RECORD_HEADER_LEN};
pub use handle_cache::{HandleCache, OpenMode};
pub use packet::{DecodedPacket, Direction, SessionFingerprint};
pub use reassembly::reassemble;
pub use scrub::{scrub_packet, SCRUB_TEXT_FILL};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PcapError {
    #[error("I/O error on {0}: {1}")]
    Io(String, std::io::Error),
    #[error("Not a PCAP file: bad magic {0:#x}")]
    BadMagic(u32),
    #[error("Record at offset {0} is corrupt: {1}")]
    BadRecord(u64, String),
    #[error("File {0} is not open for writing")]
    ReadOnly(String),
}
