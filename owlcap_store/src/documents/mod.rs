//! Typed document schemas for the indices the viewer consumes.
//!
//! Wire names stay camelCase to match what the capture process writes.
//! Every document carries a flattened `extra` map so unknown keys survive
//! read-modify-write cycles.

mod cron;
mod file;
mod history;
mod hunt;
mod lookup;
mod node;
mod session;
mod user;

pub use cron::{CronAction, CronQuery};
pub use file::PcapFileDoc;
pub use history::{scrub_passwords, HistoryEntry};
pub use hunt::{Hunt, HuntError, HuntQuery, HuntStatus, HuntType, SearchType};
pub use lookup::Lookup;
pub use node::NodeInfo;
pub use session::Session;
pub use user::User;
