//! Per-session packet matching. Compiled once per hunt; the matcher is
//! shared across the bounded fan-out.

use owlcap_pcap::{reassemble, DecodedPacket, Direction, SessionFingerprint};
use owlcap_store::{Hunt, HuntType, SearchType};

enum Matcher {
    /// Case-insensitive substring over decoded text.
    AsciiInsensitive(String),
    /// Case-sensitive substring over raw bytes.
    AsciiExact(Vec<u8>),
    /// Substring over the lowercase hex rendering.
    HexSubstring(String),
    /// Non-backtracking regex over decoded text.
    Regex(regex::Regex),
    /// Non-backtracking regex over the hex rendering.
    HexRegex(regex::Regex),
    /// Glob over decoded text.
    Wildcard(regex::Regex),
}

pub struct PacketSearch {
    matcher: Matcher,
    hunt_type: HuntType,
    src: bool,
    dst: bool,
    size: usize,
}

impl PacketSearch {
    /// Compiles the hunt's pattern. A pattern that will never compile is
    /// the hunt's unrunnable terminal state.
    pub fn compile(hunt: &Hunt) -> Result<Self, String> {
        if hunt.search.is_empty() {
            return Err("Hunt has an empty search string".to_string());
        }
        if !hunt.src && !hunt.dst {
            return Err("Hunt must search src bytes, dst bytes, or both".to_string());
        }
        let matcher = match hunt.search_type {
            SearchType::Ascii => Matcher::AsciiInsensitive(hunt.search.to_lowercase()),
            SearchType::AsciiCase => Matcher::AsciiExact(hunt.search.clone().into_bytes()),
            SearchType::Hex => {
                let needle: String = hunt
                    .search
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_lowercase();
                if needle.chars().any(|c| !c.is_ascii_hexdigit()) {
                    return Err(format!("'{}' is not a hex string", hunt.search));
                }
                Matcher::HexSubstring(needle)
            }
            SearchType::Regex => Matcher::Regex(
                regex::Regex::new(&hunt.search).map_err(|e| format!("Bad regex: {e}"))?,
            ),
            SearchType::HexRegex => Matcher::HexRegex(
                regex::Regex::new(&hunt.search.to_lowercase())
                    .map_err(|e| format!("Bad hex regex: {e}"))?,
            ),
            SearchType::Wildcard => {
                let pattern = regex::escape(&hunt.search)
                    .replace("\\*", ".*")
                    .replace("\\?", ".");
                Matcher::Wildcard(
                    regex::Regex::new(&pattern).map_err(|e| format!("Bad wildcard: {e}"))?,
                )
            }
        };
        Ok(Self {
            matcher,
            hunt_type: hunt.hunt_type,
            src: hunt.src,
            dst: hunt.dst,
            size: hunt.size as usize,
        })
    }

    fn matches_bytes(&self, data: &[u8]) -> bool {
        match &self.matcher {
            Matcher::AsciiInsensitive(needle) => String::from_utf8_lossy(data)
                .to_lowercase()
                .contains(needle.as_str()),
            Matcher::AsciiExact(needle) => {
                !needle.is_empty() && data.windows(needle.len()).any(|w| w == &needle[..])
            }
            Matcher::HexSubstring(needle) => hex::encode(data).contains(needle.as_str()),
            Matcher::Regex(re) | Matcher::Wildcard(re) => {
                re.is_match(&String::from_utf8_lossy(data))
            }
            Matcher::HexRegex(re) => re.is_match(&hex::encode(data)),
        }
    }

    /// True on the first matching packet or stream chunk.
    pub fn search(&self, packets: &[DecodedPacket], fp: &SessionFingerprint) -> bool {
        match self.hunt_type {
            HuntType::Reassembled => {
                let chunks = reassemble(packets, fp, self.size);
                // Even chunks are client bytes, odd are server bytes; a
                // one-sided hunt steps by two.
                let start = if self.src { 0 } else { 1 };
                let step = if self.src && self.dst { 1 } else { 2 };
                chunks
                    .iter()
                    .skip(start)
                    .step_by(step)
                    .any(|(_, data)| self.matches_bytes(data))
            }
            HuntType::Raw => packets.iter().any(|packet| {
                if self.src && self.dst {
                    // Both directions wanted: match anywhere in the frame.
                    self.matches_bytes(&packet.frame)
                } else {
                    let wanted = if self.src {
                        Direction::SrcToDst
                    } else {
                        Direction::DstToSrc
                    };
                    packet.direction(fp) == Some(wanted) && self.matches_bytes(&packet.payload)
                }
            }),
        }
    }
}
