use etherparse::{InternetSlice, SlicedPacket, TransportSlice};
use std::net::IpAddr;

/// Which way a packet flows relative to the session's fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Client to server: matches `(srcIp, srcPort, dstIp, dstPort)`.
    SrcToDst,
    /// Server to client: the reversed tuple.
    DstToSrc,
}

/// The session's `(srcIp, srcPort, dstIp, dstPort)` tuple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionFingerprint {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

impl SessionFingerprint {
    /// Parses the string form carried by session documents. `None` when
    /// the document's addresses don't parse.
    pub fn from_strings(src_ip: &str, src_port: u16, dst_ip: &str, dst_port: u16) -> Option<Self> {
        Some(Self {
            src_ip: src_ip.parse().ok()?,
            src_port,
            dst_ip: dst_ip.parse().ok()?,
            dst_port,
        })
    }
}

/// A decoded link-layer frame: addressing plus the transport payload.
#[derive(Clone, Debug)]
pub struct DecodedPacket {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    /// TCP sequence number when the transport is TCP.
    pub tcp_seq: Option<u32>,
    pub payload: Vec<u8>,
    /// The full frame as captured, for whole-buffer matching.
    pub frame: Vec<u8>,
}

impl DecodedPacket {
    /// Decodes an Ethernet frame. Malformed or non-IP packets are `None`;
    /// packet search treats those as unmatchable.
    pub fn from_ethernet(data: &[u8]) -> Option<Self> {
        let sliced = SlicedPacket::from_ethernet(data).ok()?;
        let (src_ip, dst_ip): (IpAddr, IpAddr) = match &sliced.ip {
            Some(InternetSlice::Ipv4(h, _)) => {
                (h.source_addr().into(), h.destination_addr().into())
            }
            Some(InternetSlice::Ipv6(h, _)) => {
                (h.source_addr().into(), h.destination_addr().into())
            }
            None => return None,
        };
        let (src_port, dst_port, tcp_seq) = match &sliced.transport {
            Some(TransportSlice::Tcp(tcp)) => (
                tcp.source_port(),
                tcp.destination_port(),
                Some(tcp.sequence_number()),
            ),
            Some(TransportSlice::Udp(udp)) => {
                (udp.source_port(), udp.destination_port(), None)
            }
            _ => (0, 0, None),
        };
        Some(Self {
            src_ip,
            src_port,
            dst_ip,
            dst_port,
            tcp_seq,
            payload: sliced.payload.to_vec(),
            frame: data.to_vec(),
        })
    }

    /// Classifies this packet against the session fingerprint. `None` when
    /// it belongs to neither direction (stray capture bytes).
    pub fn direction(&self, fp: &SessionFingerprint) -> Option<Direction> {
        if self.src_ip == fp.src_ip
            && self.src_port == fp.src_port
            && self.dst_ip == fp.dst_ip
            && self.dst_port == fp.dst_port
        {
            Some(Direction::SrcToDst)
        } else if self.src_ip == fp.dst_ip
            && self.src_port == fp.dst_port
            && self.dst_ip == fp.src_ip
            && self.dst_port == fp.src_port
        {
            Some(Direction::DstToSrc)
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Builds a minimal Ethernet/IPv4/TCP frame carrying `payload`.
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
}
