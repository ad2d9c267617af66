use crate::file::{PcapFile, RECORD_HEADER_LEN};
use crate::PcapError;

/// Third-pass fill text. The first two passes are 0x00 and 0x01.
pub const SCRUB_TEXT_FILL: &[u8] = b"Scrubbed! Hoot! ";

/// Destroys the packet record at `offset` with three in-place overwrite
/// passes: all-zeros, all-ones-bit, then the text fill repeated. When
/// `also_header` is set the 16-byte record header is overwritten too.
/// There is no sync-after-write guarantee.
pub fn scrub_packet(
    file: &mut PcapFile,
    offset: u64,
    also_header: bool,
) -> Result<(), PcapError> {
    let header = file.read_record_header(offset)?;
    let (start, len) = if also_header {
        (offset, RECORD_HEADER_LEN + header.inc_len as usize)
    } else {
        (offset + RECORD_HEADER_LEN as u64, header.inc_len as usize)
    };

    let mut fill = vec![0u8; len];
    file.write_at(start, &fill)?;

    fill.iter_mut().for_each(|b| *b = 0x01);
    file.write_at(start, &fill)?;

    for (i, b) in fill.iter_mut().enumerate() {
        *b = SCRUB_TEXT_FILL[i % SCRUB_TEXT_FILL.len()];
    }
    file.write_at(start, &fill)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::file::test_support::build_pcap;
    use crate::file::PcapFile;
    use std::io::Write as _;

    fn fixture(frames: &[Vec<u8>]) -> (tempfile::TempDir, std::path::PathBuf, Vec<u64>) {
        let (bytes, offsets) = build_pcap(frames);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cap-1.pcap");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();
        (dir, path, offsets)
    }

    #[test]
    fn payload_becomes_the_text_fill() {
        let (_dir, path, offsets) = fixture(&[vec![0xAA; 40], vec![0xBB; 32]]);
        {
            let mut file = PcapFile::open_write(&path).unwrap();
            scrub_packet(&mut file, offsets[0], false).unwrap();
        }
        let mut file = PcapFile::open_read(&path).unwrap();
        let (header, payload) = file.read_packet(offsets[0]).unwrap();
        assert_eq!(header.inc_len, 40);
        assert_eq!(&payload[..16], SCRUB_TEXT_FILL);
        assert_eq!(payload[16], b'S');

        // Second record untouched
        let (_, other) = file.read_packet(offsets[1]).unwrap();
        assert!(other.iter().all(|&b| b == 0xBB));
    }

    #[test]
    fn scrubbing_twice_is_idempotent() {
        let (_dir, path, offsets) = fixture(&[vec![0xAA; 40]]);
        {
            let mut file = PcapFile::open_write(&path).unwrap();
            scrub_packet(&mut file, offsets[0], false).unwrap();
        }
        let first = std::fs::read(&path).unwrap();
        {
            let mut file = PcapFile::open_write(&path).unwrap();
            scrub_packet(&mut file, offsets[0], false).unwrap();
        }
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn header_scrub_destroys_the_record_header() {
        let (_dir, path, offsets) = fixture(&[vec![0xAA; 24]]);
        {
            let mut file = PcapFile::open_write(&path).unwrap();
            scrub_packet(&mut file, offsets[0], true).unwrap();
        }
        // The record header is now fill text, so re-reading it must fail
        // or report a nonsense caplen.
        let mut file = PcapFile::open_read(&path).unwrap();
        assert!(file.read_packet(offsets[0]).is_err());
    }

    #[test]
    fn read_only_handles_refuse() {
        let (_dir, path, offsets) = fixture(&[vec![0xAA; 16]]);
        let mut file = PcapFile::open_read(&path).unwrap();
        assert!(matches!(
            scrub_packet(&mut file, offsets[0], false),
            Err(PcapError::ReadOnly(_))
        ));
    }
}
