// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![deny(warnings, missing_docs, clippy::all)]

//! Route outgoing HTTP(S) requests between direct and proxied transports.
//!
//! A [`ProxyRouter`] resolves proxy configuration exactly once, when it is constructed:
//! explicit options win over the `$HTTP_PROXY`/`$HTTPS_PROXY`/`$NO_PROXY` environment variable
//! pairs, proxy URLs are parsed into endpoints, and up to four transport handles are
//! pre-built — direct http, direct https, and one proxied handle per configured proxy.  Every
//! outgoing request is then routed to exactly one of these handles by a synchronous lookup
//! over immutable state.
//!
//! The routing decision honors a bypass list of wildcard patterns, and the fallback order is
//! deliberately asymmetric: a plain-http request without a dedicated http proxy may still ride
//! the https proxy, while an https request never falls back to the http proxy.
//!
//! ```
//! use proxy_router::{EnvSnapshot, ProxyRouter, RequestParts, RouterOptions, TransportKind};
//!
//! let router = ProxyRouter::with_env(
//!     RouterOptions {
//!         https_proxy: Some("http://proxy.example.com:3128".to_string()),
//!         no_proxy: Some("*.internal.example".into()),
//!         ..RouterOptions::default()
//!     },
//!     EnvSnapshot::unset(),
//! )?;
//!
//! let request = RequestParts {
//!     protocol: Some("https:".to_string()),
//!     host: Some("github.com".to_string()),
//!     ..RequestParts::default()
//! };
//! assert_eq!(router.route(&request).kind(), TransportKind::HttpsProxy);
//!
//! let internal = RequestParts {
//!     protocol: Some("https:".to_string()),
//!     host: Some("ci.internal.example".to_string()),
//!     ..RequestParts::default()
//! };
//! assert_eq!(router.route(&internal).kind(), TransportKind::DirectHttps);
//! # Ok::<(), proxy_router::InvalidProxyUrl>(())
//! ```
//!
//! This crate decides *which* transport carries a request; it does not open sockets, speak
//! the proxy protocol, or terminate TLS.  The selected [`TransportHandle`] bundles everything
//! an HTTP, HTTPS, or proxy-tunnel implementation needs to do that, including the
//! secured-tunnel TLS passthrough (see [`TransportHandle::tunnel_options`]).

pub mod bypass;
pub mod endpoint;
pub mod router;
pub mod transport;

pub use crate::bypass::{BypassList, BypassSpec};
pub use crate::endpoint::{InvalidProxyUrl, ProxyAuth, ProxyEndpoint, ProxyKind};
pub use crate::router::{EnvSnapshot, OutgoingRequest, ProxyRouter, RequestParts, RouterOptions};
pub use crate::transport::{
    ConnectOptions, TlsOptions, TransportHandle, TransportKind, Transports,
};
