use crate::file::PcapFile;
use crate::PcapError;
use dashmap::DashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Read handles are shared freely; the scrubber's write handle gets its own
/// cache entry so it never aliases a reader.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

#[derive(Clone, Hash, PartialEq, Eq)]
struct HandleKey {
    mode: OpenMode,
    node: String,
    file_num: i64,
}

/// Cache of open PCAP handles keyed by `(mode, node, fileNum)`.
#[derive(Default)]
pub struct HandleCache {
    handles: DashMap<HandleKey, Arc<Mutex<PcapFile>>>,
}

impl HandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle, opening the file on first use.
    pub fn open(
        &self,
        mode: OpenMode,
        node: &str,
        file_num: i64,
        path: &Path,
    ) -> Result<Arc<Mutex<PcapFile>>, PcapError> {
        let key = HandleKey {
            mode,
            node: node.to_string(),
            file_num,
        };
        if let Some(handle) = self.handles.get(&key) {
            return Ok(handle.clone());
        }
        let file = match mode {
            OpenMode::Read => PcapFile::open_read(path)?,
            OpenMode::Write => PcapFile::open_write(path)?,
        };
        let handle = Arc::new(Mutex::new(file));
        self.handles.insert(key, handle.clone());
        Ok(handle)
    }

    /// Drops every handle for a file, both modes. Called when the expiry
    /// engine deletes the file.
    pub fn evict(&self, node: &str, file_num: i64) {
        for mode in [OpenMode::Read, OpenMode::Write] {
            self.handles.remove(&HandleKey {
                mode,
                node: node.to_string(),
                file_num,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::file::test_support::build_pcap;
    use std::io::Write as _;

    #[test]
    fn read_and_write_keys_are_distinct() {
        let (bytes, _) = build_pcap(&[vec![0xAA; 10]]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cap-9.pcap");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();

        let cache = HandleCache::new();
        let read = cache.open(OpenMode::Read, "n1", 9, &path).unwrap();
        let read_again = cache.open(OpenMode::Read, "n1", 9, &path).unwrap();
        let write = cache.open(OpenMode::Write, "n1", 9, &path).unwrap();

        assert!(Arc::ptr_eq(&read, &read_again));
        assert!(!Arc::ptr_eq(&read, &write));
        assert!(write.lock().unwrap().is_writable());
        assert!(!read.lock().unwrap().is_writable());
    }
}
