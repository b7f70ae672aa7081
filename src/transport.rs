// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pre-built transport handles for outgoing connections.
//!
//! A router instance owns exactly four handle slots: direct http, direct https, and one
//! proxied slot per configured proxy.  All of them are built once, at construction time;
//! routing hands out references into this set and never builds handles on the fly.
//!
//! A handle does not open sockets itself.  It bundles what the underlying HTTP, HTTPS, or
//! proxy-tunnel implementation needs to do so: the general connection options, the proxy
//! endpoint when there is one, and a tunnel-establishment strategy which prepares the
//! per-request connection options.  The strategy is a plain function injected into the handle,
//! so the secured-proxy behavior is a matter of composition, not of subclassing some base
//! handle type.

use std::fmt;
use std::time::Duration;

use crate::endpoint::ProxyEndpoint;

/// TLS material forwarded to secured connections and secured proxy tunnels.
///
/// All fields are optional; an empty value forwards nothing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// CA bundle in PEM form.
    pub ca: Option<String>,
    /// Client certificate in PEM form.
    pub cert: Option<String>,
    /// Client private key in PEM form.
    pub key: Option<String>,
    /// Combined certificate and key as a PKCS#12 bundle.
    pub pkcs12: Option<Vec<u8>>,
    /// Passphrase for the private key or the PKCS#12 bundle.
    pub passphrase: Option<String>,
}

static_assertions::assert_impl_all!(TlsOptions: Send, Sync);

impl TlsOptions {
    /// Whether no material is set at all.
    pub fn is_empty(&self) -> bool {
        self.ca.is_none()
            && self.cert.is_none()
            && self.key.is_none()
            && self.pkcs12.is_none()
            && self.passphrase.is_none()
    }

    /// Fill fields not set on `self` from `fallback`.
    ///
    /// Fields already set on `self` win; `fallback` never overrides.
    fn or(&self, fallback: &TlsOptions) -> TlsOptions {
        TlsOptions {
            ca: self.ca.clone().or_else(|| fallback.ca.clone()),
            cert: self.cert.clone().or_else(|| fallback.cert.clone()),
            key: self.key.clone().or_else(|| fallback.key.clone()),
            pkcs12: self.pkcs12.clone().or_else(|| fallback.pkcs12.clone()),
            passphrase: self.passphrase.clone().or_else(|| fallback.passphrase.clone()),
        }
    }
}

impl fmt::Debug for TlsOptions {
    // Key material must not leak into logs; only presence is printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsOptions")
            .field("ca", &self.ca.is_some())
            .field("cert", &self.cert.is_some())
            .field("key", &self.key.is_some())
            .field("pkcs12", &self.pkcs12.is_some())
            .field("passphrase", &self.passphrase.is_some())
            .finish()
    }
}

/// General connection options, passed through to every transport handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Keep idle connections around for reuse.
    pub keep_alive: Option<bool>,
    /// Timeout for establishing a connection.
    pub timeout: Option<Duration>,
    /// TLS material for secured connections and secured proxy tunnels.
    pub tls: TlsOptions,
}

static_assertions::assert_impl_all!(ConnectOptions: Send, Sync);

/// The four fixed transport roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Direct plain-http connections.
    DirectHttp,
    /// Direct https connections.
    DirectHttps,
    /// Connections relayed through the proxy configured for plain-http requests.
    HttpProxy,
    /// Connections tunneled through the proxy configured for https requests.
    HttpsProxy,
}

/// Prepares the per-request connection options before the underlying transport establishes
/// the connection or tunnel for a handle.
type TunnelStrategy = fn(Option<&ProxyEndpoint>, ConnectOptions) -> ConnectOptions;

/// Direct connections and plain proxies use the per-request options unmodified.
fn plain_tunnel(_proxy: Option<&ProxyEndpoint>, options: ConnectOptions) -> ConnectOptions {
    options
}

/// The secured proxy merges the TLS material stored on its endpoint into the per-request
/// options, filling gaps without overriding caller-supplied fields.  Without an endpoint
/// there is nothing to merge and the options pass through untouched.
fn secured_tunnel(proxy: Option<&ProxyEndpoint>, options: ConnectOptions) -> ConnectOptions {
    match proxy {
        Some(endpoint) => ConnectOptions {
            tls: options.tls.or(&endpoint.tls),
            ..options
        },
        None => options,
    }
}

/// One pre-built transport configuration.
#[derive(Clone)]
pub struct TransportHandle {
    kind: TransportKind,
    connect: ConnectOptions,
    proxy: Option<ProxyEndpoint>,
    tunnel: TunnelStrategy,
}

static_assertions::assert_impl_all!(TransportHandle: Send, Sync);

impl TransportHandle {
    /// The handle for direct plain-http connections.
    pub fn direct_http(connect: ConnectOptions) -> Self {
        Self {
            kind: TransportKind::DirectHttp,
            connect,
            proxy: None,
            tunnel: plain_tunnel,
        }
    }

    /// The handle for direct https connections.
    pub fn direct_https(connect: ConnectOptions) -> Self {
        Self {
            kind: TransportKind::DirectHttps,
            connect,
            proxy: None,
            tunnel: plain_tunnel,
        }
    }

    /// The handle relaying plain-http requests through `proxy`.
    pub fn http_proxy(proxy: ProxyEndpoint, connect: ConnectOptions) -> Self {
        Self {
            kind: TransportKind::HttpProxy,
            connect,
            proxy: Some(proxy),
            tunnel: plain_tunnel,
        }
    }

    /// The handle tunneling https requests through `proxy`.
    ///
    /// Establishing the tunnel to this proxy forwards the TLS material stored on the
    /// endpoint; see [`tunnel_options`](Self::tunnel_options).
    pub fn https_proxy(proxy: ProxyEndpoint, connect: ConnectOptions) -> Self {
        Self {
            kind: TransportKind::HttpsProxy,
            connect,
            proxy: Some(proxy),
            tunnel: secured_tunnel,
        }
    }

    /// The role of this handle.
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// The general connection options this handle was built with.
    pub fn connect_options(&self) -> &ConnectOptions {
        &self.connect
    }

    /// The proxy endpoint behind this handle, or `None` for a direct handle.
    pub fn proxy(&self) -> Option<&ProxyEndpoint> {
        self.proxy.as_ref()
    }

    /// Whether this handle connects without an intermediary.
    pub fn is_direct(&self) -> bool {
        self.proxy.is_none()
    }

    /// Prepare per-request connection options for establishing this handle's connection.
    ///
    /// For the secured proxy handle this merges the endpoint's TLS material into `options`
    /// without overriding fields the caller supplied; every other handle, and a secured
    /// handle whose endpoint reference went missing, returns `options` unchanged.  This never
    /// fails.
    pub fn tunnel_options(&self, options: ConnectOptions) -> ConnectOptions {
        (self.tunnel)(self.proxy.as_ref(), options)
    }
}

impl fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportHandle")
            .field("kind", &self.kind)
            .field("connect", &self.connect)
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// The four-slot handle set owned by a router instance.
///
/// The direct slots always exist.  A proxy slot exists iff the corresponding proxy
/// configuration entry resolved to an endpoint.
#[derive(Debug, Clone)]
pub struct Transports {
    /// Direct plain-http connections.
    pub http: TransportHandle,
    /// Direct https connections.
    pub https: TransportHandle,
    /// The proxy for plain-http requests, if one was configured.
    pub http_proxy: Option<TransportHandle>,
    /// The proxy for https requests, if one was configured.
    pub https_proxy: Option<TransportHandle>,
}

static_assertions::assert_impl_all!(Transports: Send, Sync);

impl Transports {
    /// Build the handle set from the general connection options and the resolved endpoints.
    ///
    /// The direct handles are always built, whatever the endpoints; each proxy handle is
    /// built iff its endpoint is present.
    pub fn new(
        connect: &ConnectOptions,
        http_proxy: Option<ProxyEndpoint>,
        https_proxy: Option<ProxyEndpoint>,
    ) -> Self {
        Self {
            http: TransportHandle::direct_http(connect.clone()),
            https: TransportHandle::direct_https(connect.clone()),
            http_proxy: http_proxy
                .map(|endpoint| TransportHandle::http_proxy(endpoint, connect.clone())),
            https_proxy: https_proxy
                .map(|endpoint| TransportHandle::https_proxy(endpoint, connect.clone())),
        }
    }
}
