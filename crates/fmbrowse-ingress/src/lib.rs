//! fmbrowse Ingress
//!
//! Development proxy that lets a browser-side client reach the Data API
//! through the local server, with authentication injected on its behalf.

pub mod proxy;

pub use proxy::{PROXY_PREFIX, ProxyError, ProxyState, router};
