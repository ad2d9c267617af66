//! Node-to-node plumbing: short-lived sealed tokens and the proxy that
//! hops session-scoped requests to their owning node.

pub mod auth;
pub mod proxy;
pub mod resolver;
