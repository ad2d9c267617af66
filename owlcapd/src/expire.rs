//! Free-space-driven PCAP deletion. Runs every sixty seconds on nodes
//! that write captures to local disk; deletes oldest-first per device
//! until the configured free-space target holds, never touching locked
//! files and never dropping a node below ten files.

use crate::app::AppState;
use nix::sys::statvfs::statvfs;
use owlcap_store::Datastore;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const EXPIRE_TICK: Duration = Duration::from_secs(60);
/// No device's file count drops below this, however full the disk is.
const MIN_FILES_PER_NODE: u64 = 10;
/// How many deletion candidates one pass looks at.
const CANDIDATE_BATCH: usize = 200;

pub async fn start(state: Arc<AppState>) {
    if !state.config.writes_pcap_locally() {
        info!("PCAP writes are not local disk; expiry engine idle");
        return;
    }
    info!("Expiry engine starting on {}", state.cluster.node_name);
    loop {
        tokio::time::sleep(EXPIRE_TICK).await;
        if let Err(e) = check_devices(&state).await {
            error!("Expiry pass failed: {e}");
        }
    }
}

/// One pass: group the capture directories by underlying device, probe
/// free space, and expire where a device is below target.
pub async fn check_devices(state: &AppState) -> Result<(), String> {
    let target = state
        .config
        .free_space_target()
        .map_err(|e| e.to_string())?;

    for (_dev, dirs) in group_dirs_by_device(&state.config.pcap_dir_list()) {
        let probe = Path::new(&dirs[0]);
        let stat = match statvfs(probe) {
            Ok(stat) => stat,
            Err(e) => {
                warn!("statvfs({}) failed: {e}", dirs[0]);
                continue;
            }
        };
        let frag = stat.fragment_size() as u64;
        let total_bytes = stat.blocks() as u64 * frag;
        let free_bytes = stat.blocks_available() as u64 * frag;
        let target_bytes = target.target_bytes(total_bytes);
        if free_bytes >= target_bytes {
            continue;
        }
        let needed = target_bytes - free_bytes;
        info!(
            "Device holding {:?} is {needed} bytes under its free-space target",
            dirs
        );
        expire_for_dirs(state, &dirs, needed).await;
    }
    Ok(())
}

fn group_dirs_by_device(dirs: &[String]) -> HashMap<u64, Vec<String>> {
    use std::os::unix::fs::MetadataExt;
    let mut groups: HashMap<u64, Vec<String>> = HashMap::new();
    for dir in dirs {
        match std::fs::metadata(dir) {
            Ok(meta) => groups.entry(meta.dev()).or_default().push(dir.clone()),
            Err(e) => warn!("Unable to stat pcap dir {dir}: {e}"),
        }
    }
    groups
}

/// Deletes oldest-first from the given directories until `bytes_needed`
/// is covered or the per-node floor is reached. Returns bytes freed on
/// disk; index rows for missing files are removed without counting.
pub async fn expire_for_dirs(state: &AppState, dirs: &[String], bytes_needed: u64) -> u64 {
    let node = &state.cluster.node_name;
    let wildcards: Vec<String> = dirs.iter().map(|d| format!("{d}/*")).collect();
    let candidates = match state
        .stores
        .db
        .oldest_unlocked_files(node, &wildcards, CANDIDATE_BATCH)
        .await
    {
        Ok(files) => files,
        Err(e) => {
            error!("Unable to list expiry candidates: {e}");
            return 0;
        }
    };
    let mut remaining = match state.stores.db.file_count(node).await {
        Ok(count) => count,
        Err(e) => {
            error!("Unable to count files for {node}: {e}");
            return 0;
        }
    };

    let mut freed = 0u64;
    for file in candidates {
        if freed >= bytes_needed || remaining <= MIN_FILES_PER_NODE {
            break;
        }
        let on_disk = Path::new(&file.name).exists();
        if on_disk {
            if let Err(e) = std::fs::remove_file(&file.name) {
                warn!("Unable to delete {}: {e}", file.name);
                continue;
            }
            freed += file.filesize;
            state.stores.handles.evict(node, file.num);
            info!("Expired {} ({} bytes)", file.name, file.filesize);
        } else {
            // Already gone from disk; drop the stale row regardless.
            warn!("File {} missing on disk, removing index row", file.name);
        }
        if let Err(e) = state.stores.db.delete_file(node, file.num).await {
            warn!("Unable to delete file row {}-{}: {e}", node, file.num);
            continue;
        }
        remaining -= 1;
    }
    freed
}
