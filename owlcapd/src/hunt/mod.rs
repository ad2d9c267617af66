//! The packet-hunt subsystem: a singleton, resumable background job
//! engine that scans millions of sessions and searches their actual
//! packet bytes.

pub mod engine;
pub mod packet_search;
