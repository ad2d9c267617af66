//! Typed facade over the session index and its sibling indices.
//!
//! The daemon talks to a [`Datastore`] trait object; the production
//! implementation speaks the Elasticsearch REST API and the in-memory
//! implementation backs the engine and handler tests.

mod caches;
mod datastore;
mod documents;
mod error;
mod es;
mod filter;
mod memory;

pub use caches::{LookupCache, UserCache};
pub use datastore::{Datastore, ScrollId, SearchPage, SessionHit, SessionQuery};
pub use documents::{
    scrub_passwords, CronAction, CronQuery, HistoryEntry, Hunt, HuntError, HuntQuery, HuntStatus,
    HuntType, Lookup, NodeInfo, PcapFileDoc, SearchType, Session, User,
};
pub use error::StoreError;
pub use es::EsDatastore;
pub use filter::Filter;
pub use memory::MemoryDatastore;
