//! HTTP middleware stack: CORS, per-request trace ids, vendor and caller
//! guards for the relay routes.

pub mod auth;
pub mod cors;
pub mod trace;
pub mod vendor;
