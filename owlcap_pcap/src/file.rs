use crate::PcapError;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const GLOBAL_HEADER_LEN: usize = 24;
pub const RECORD_HEADER_LEN: usize = 16;

/// Sanity cap on a single record's captured length.
const MAX_CAPLEN: u32 = 0x40_0000;

const MAGIC_MICROS: u32 = 0xa1b2_c3d4;
const MAGIC_MICROS_SWAPPED: u32 = 0xd4c3_b2a1;
const MAGIC_NANOS: u32 = 0xa1b2_3c4d;
const MAGIC_NANOS_SWAPPED: u32 = 0x4d3c_b2a1;

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Clone, Copy)]
#[repr(C)]
pub struct PcapFileHeader {
    pub magic: u32,
    pub version_major: u16,
    pub version_minor: u16,
    pub thiszone: i32,
    pub sigfigs: u32,
    pub snaplen: u32,
    pub link_type: u32,
}

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Clone, Copy, Debug)]
#[repr(C)]
pub struct PcapRecordHeader {
    pub ts_sec: u32,
    pub ts_usec: u32,
    /// Octets included in the file.
    pub inc_len: u32,
    /// Length the packet was on the wire.
    pub orig_len: u32,
}

/// An open PCAP file. Reads are by absolute byte offset; the session
/// document's `packetPos` entries index directly into the file.
pub struct PcapFile {
    path: String,
    file: File,
    writable: bool,
    swapped: bool,
    header: PcapFileHeader,
    len: u64,
}

impl PcapFile {
    pub fn open_read(path: &Path) -> Result<Self, PcapError> {
        let file = File::open(path)
            .map_err(|e| PcapError::Io(path.display().to_string(), e))?;
        Self::from_file(path, file, false)
    }

    /// Read-write open, used only by the scrubber.
    pub fn open_write(path: &Path) -> Result<Self, PcapError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| PcapError::Io(path.display().to_string(), e))?;
        Self::from_file(path, file, true)
    }

    fn from_file(path: &Path, mut file: File, writable: bool) -> Result<Self, PcapError> {
        let len = file
            .metadata()
            .map_err(|e| PcapError::Io(path.display().to_string(), e))?
            .len();
        let mut buf = [0u8; GLOBAL_HEADER_LEN];
        file.read_exact(&mut buf)
            .map_err(|e| PcapError::Io(path.display().to_string(), e))?;
        let header = PcapFileHeader::read_from_bytes(&buf)
            .map_err(|_| PcapError::BadMagic(0))?;
        let swapped = match header.magic {
            MAGIC_MICROS | MAGIC_NANOS => false,
            MAGIC_MICROS_SWAPPED | MAGIC_NANOS_SWAPPED => true,
            other => return Err(PcapError::BadMagic(other)),
        };
        Ok(Self {
            path: path.display().to_string(),
            file,
            writable,
            swapped,
            header,
            len,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// The raw 24-byte global header, for re-framing packets on a forward.
    pub fn global_header_bytes(&self) -> [u8; GLOBAL_HEADER_LEN] {
        let mut out = [0u8; GLOBAL_HEADER_LEN];
        out.copy_from_slice(self.header.as_bytes());
        out
    }

    /// Reads the record header at an absolute offset, byte-swapping when
    /// the file was written on the other endianness.
    pub fn read_record_header(&mut self, offset: u64) -> Result<PcapRecordHeader, PcapError> {
        if offset + RECORD_HEADER_LEN as u64 > self.len {
            return Err(PcapError::BadRecord(
                offset,
                "record header past end of file".to_string(),
            ));
        }
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| PcapError::Io(self.path.clone(), e))?;
        let mut buf = [0u8; RECORD_HEADER_LEN];
        self.file
            .read_exact(&mut buf)
            .map_err(|e| PcapError::Io(self.path.clone(), e))?;
        let mut header = PcapRecordHeader::read_from_bytes(&buf)
            .map_err(|_| PcapError::BadRecord(offset, "short header".to_string()))?;
        if self.swapped {
            header.ts_sec = header.ts_sec.swap_bytes();
            header.ts_usec = header.ts_usec.swap_bytes();
            header.inc_len = header.inc_len.swap_bytes();
            header.orig_len = header.orig_len.swap_bytes();
        }
        if header.inc_len > MAX_CAPLEN {
            return Err(PcapError::BadRecord(
                offset,
                format!("caplen {} is absurd", header.inc_len),
            ));
        }
        Ok(header)
    }

    /// Reads the whole record (header + payload) at an absolute offset.
    pub fn read_packet(&mut self, offset: u64) -> Result<(PcapRecordHeader, Vec<u8>), PcapError> {
        let header = self.read_record_header(offset)?;
        let data_start = offset + RECORD_HEADER_LEN as u64;
        if data_start + header.inc_len as u64 > self.len {
            return Err(PcapError::BadRecord(
                offset,
                "record payload past end of file".to_string(),
            ));
        }
        let mut payload = vec![0u8; header.inc_len as usize];
        self.file
            .read_exact(&mut payload)
            .map_err(|e| PcapError::Io(self.path.clone(), e))?;
        Ok((header, payload))
    }

    /// Raw record bytes (header included), for re-framing on a forward.
    pub fn read_raw_record(&mut self, offset: u64) -> Result<Vec<u8>, PcapError> {
        let header = self.read_record_header(offset)?;
        let total = RECORD_HEADER_LEN + header.inc_len as usize;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| PcapError::Io(self.path.clone(), e))?;
        let mut buf = vec![0u8; total];
        self.file
            .read_exact(&mut buf)
            .map_err(|e| PcapError::Io(self.path.clone(), e))?;
        Ok(buf)
    }

    /// Overwrites bytes in place. The scrubber's only write path.
    pub(crate) fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), PcapError> {
        if !self.writable {
            return Err(PcapError::ReadOnly(self.path.clone()));
        }
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| PcapError::Io(self.path.clone(), e))?;
        self.file
            .write_all(data)
            .map_err(|e| PcapError::Io(self.path.clone(), e))?;
        Ok(())
    }
}


#[cfg(test)]
mod test {
    use super::test_support::build_pcap;
    use super::*;
    use std::io::Write as _;

    #[test]
    fn reads_records_at_offsets() {
        let (bytes, offsets) = build_pcap(&[vec![0xAA; 40], vec![0xBB; 60]]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cap-1.pcap");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();

        let mut pcap = PcapFile::open_read(&path).unwrap();
        let (header, payload) = pcap.read_packet(offsets[1]).unwrap();
        assert_eq!(header.inc_len, 60);
        assert!(payload.iter().all(|&b| b == 0xBB));
    }

    #[test]
    fn rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a.pcap");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[0u8; 64])
            .unwrap();
        assert!(matches!(
            PcapFile::open_read(&path),
            Err(PcapError::BadMagic(_))
        ));
    }

    #[test]
    fn offset_past_eof_is_an_error() {
        let (bytes, _) = build_pcap(&[vec![0xAA; 10]]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cap-2.pcap");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();
        let mut pcap = PcapFile::open_read(&path).unwrap();
        assert!(pcap.read_packet(100_000).is_err());
    }
}
