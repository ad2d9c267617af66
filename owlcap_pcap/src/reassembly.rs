use crate::packet::{DecodedPacket, Direction, SessionFingerprint};

/// Rebuilds the application-order byte stream of a session as alternating
/// direction chunks: even indices are client-to-server, odd are server-to-
/// client. Consecutive same-direction packets merge into one chunk;
/// TCP retransmissions are dropped by sequence number. Collection stops
/// once `size_limit` payload bytes have been gathered.
pub fn reassemble(
    packets: &[DecodedPacket],
    fp: &SessionFingerprint,
    size_limit: usize,
) -> Vec<(Direction, Vec<u8>)> {
    let mut chunks: Vec<(Direction, Vec<u8>)> = Vec::new();
    let mut total = 0usize;
    // Next expected TCP sequence per direction, for retransmission drops.
    let mut next_seq: [Option<u32>; 2] = [None, None];

    for packet in packets {
        if total >= size_limit {
            break;
        }
        let Some(direction) = packet.direction(fp) else {
            continue;
        };
        if packet.payload.is_empty() {
            continue;
        }

        let mut payload: &[u8] = &packet.payload;
        if let Some(seq) = packet.tcp_seq {
            let slot = match direction {
                Direction::SrcToDst => 0,
                Direction::DstToSrc => 1,
            };
            if let Some(expected) = next_seq[slot] {
                let behind = expected.wrapping_sub(seq);
                // Wholly before the cursor: a pure retransmission.
                if behind != 0 && behind as usize >= payload.len() && behind < u32::MAX / 2 {
                    continue;
                }
                // Partial overlap: keep only the new tail.
                if behind != 0 && (behind as usize) < payload.len() && behind < u32::MAX / 2 {
                    payload = &payload[behind as usize..];
                }
            }
            next_seq[slot] = Some(seq.wrapping_add(packet.payload.len() as u32));
        }

        let room = size_limit - total;
        let take = payload.len().min(room);
        let bytes = &payload[..take];
        total += take;

        // First chunk is client-to-server by convention; pad with an empty
        // chunk when the capture opens with a server packet.
        if chunks.is_empty() && direction == Direction::DstToSrc {
            chunks.push((Direction::SrcToDst, Vec::new()));
        }
        match chunks.last_mut() {
            Some((last_dir, data)) if *last_dir == direction => {
                data.extend_from_slice(bytes);
            }
            _ => chunks.push((direction, bytes.to_vec())),
        }
    }
    chunks
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::packet::test_support::tcp_frame;

    fn fp() -> SessionFingerprint {
        SessionFingerprint::from_strings("10.0.0.1", 49152, "10.0.0.2", 80).unwrap()
    }

    fn decode(frames: Vec<Vec<u8>>) -> Vec<DecodedPacket> {
        frames
            .iter()
            .filter_map(|f| DecodedPacket::from_ethernet(f))
            .collect()
    }

    #[test]
    fn alternating_chunks_with_merge() {
        let packets = decode(vec![
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 2], 80, 1, b"GET / HT"),
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 2], 80, 9, b"TP/1.1\r\n"),
            tcp_frame([10, 0, 0, 2], 80, [10, 0, 0, 1], 49152, 1, b"200 OK"),
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 2], 80, 17, b"Host: x\r\n"),
        ]);
        let chunks = reassemble(&packets, &fp(), 10_000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].0, Direction::SrcToDst);
        assert_eq!(chunks[0].1, b"GET / HTTP/1.1\r\n");
        assert_eq!(chunks[1].0, Direction::DstToSrc);
        assert_eq!(chunks[2].0, Direction::SrcToDst);
    }

    #[test]
    fn retransmissions_are_dropped() {
        let packets = decode(vec![
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 2], 80, 1, b"abcd"),
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 2], 80, 1, b"abcd"),
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 2], 80, 5, b"efgh"),
        ]);
        let chunks = reassemble(&packets, &fp(), 10_000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].1, b"abcdefgh");
    }

    #[test]
    fn server_first_capture_gets_an_empty_lead_chunk() {
        let packets = decode(vec![tcp_frame(
            [10, 0, 0, 2],
            80,
            [10, 0, 0, 1],
            49152,
            1,
            b"220 ready",
        )]);
        let chunks = reassemble(&packets, &fp(), 10_000);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].1.is_empty());
        assert_eq!(chunks[1].0, Direction::DstToSrc);
    }

    #[test]
    fn size_limit_caps_collection() {
        let packets = decode(vec![
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 2], 80, 1, b"0123456789"),
            tcp_frame([10, 0, 0, 1], 49152, [10, 0, 0, 2], 80, 11, b"abcdefghij"),
        ]);
        let chunks = reassemble(&packets, &fp(), 12);
        let total: usize = chunks.iter().map(|(_, d)| d.len()).sum();
        assert_eq!(total, 12);
    }
}
