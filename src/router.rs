// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolve proxy configuration and route outgoing requests.
//!
//! A [`ProxyRouter`] does its configuration work exactly once, when it is constructed:
//! explicit [`RouterOptions`] win over the environment, the environment is read into a
//! one-time [`EnvSnapshot`], proxy URLs are parsed into endpoints, and the four transport
//! handles are pre-built.  After that, [`ProxyRouter::route`] is a pure, synchronous lookup
//! over immutable state; it is safe to share a router across threads and call it once per
//! outgoing request.
//!
//! For each proxy variable pair the upper-case form (`$HTTP_PROXY`) wins over the lower-case
//! form (`$http_proxy`) when both are set.  Note that some tools, curl among them, resolve
//! these variables the other way around.
//!
//! Routing decisions are traced on the `proxy_router` log target; enable it in the host
//! application's logger configuration to see which handle each request was given.

use std::ops::Not;

use log::{debug, error, warn};
use url::Url;

use crate::bypass::{BypassList, BypassSpec};
use crate::endpoint::{InvalidProxyUrl, ProxyEndpoint, ProxyKind};
use crate::transport::{ConnectOptions, TlsOptions, TransportHandle, Transports};

/// Log target for configuration and routing diagnostics.
const LOG_TARGET: &str = "proxy_router";

fn lookup(var: &str) -> Option<String> {
    std::env::var_os(var).and_then(|v| {
        v.to_str().map(ToOwned::to_owned).or_else(|| {
            warn!("Variable ${} does not contain valid unicode, skipping", var);
            None
        })
    })
}

/// Proxy configuration captured from the environment.
///
/// The environment is read exactly once, when the snapshot is taken; routing never consults
/// it again.  Hand a snapshot to [`ProxyRouter::with_env`] to construct a router independent
/// of the process environment, e.g. in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    /// Value of `$HTTP_PROXY`, or of `$http_proxy` if the upper-case form is unset.
    pub http_proxy: Option<String>,
    /// Value of `$HTTPS_PROXY`, or of `$https_proxy` if the upper-case form is unset.
    pub https_proxy: Option<String>,
    /// Value of `$NO_PROXY`, or of `$no_proxy` if the upper-case form is unset.
    pub no_proxy: Option<String>,
}

static_assertions::assert_impl_all!(EnvSnapshot: Send, Sync);

impl EnvSnapshot {
    /// Capture the proxy variables from the process environment.
    ///
    /// For each pair the upper-case variable wins when both are set.  Values which are not
    /// valid unicode are skipped with a warning.
    pub fn capture() -> Self {
        Self {
            http_proxy: lookup("HTTP_PROXY").or_else(|| lookup("http_proxy")),
            https_proxy: lookup("HTTPS_PROXY").or_else(|| lookup("https_proxy")),
            no_proxy: lookup("NO_PROXY").or_else(|| lookup("no_proxy")),
        }
    }

    /// A snapshot with no variables set.
    pub fn unset() -> Self {
        Self::default()
    }
}

/// Options for constructing a [`ProxyRouter`].
///
/// Every field is optional.  Explicit proxy values take precedence over the environment; an
/// explicit value which does not parse is a construction error, unlike its environment
/// counterpart.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// URL of the proxy carrying plain-http requests.
    pub http_proxy: Option<String>,
    /// URL of the proxy carrying https requests.
    pub https_proxy: Option<String>,
    /// Destinations to connect to directly, skipping any configured proxy.
    pub no_proxy: Option<BypassSpec>,
    /// General connection options, passed through to every transport handle.
    pub connect: ConnectOptions,
}

static_assertions::assert_impl_all!(RouterOptions: Send, Sync);

/// An outgoing request about to establish a connection.
///
/// Host runtimes have exposed different request shapes over time, so every accessor is
/// optional and defaults to absent; implement only what the shape at hand provides.  The
/// router tries the accessors in a fixed order per field and falls back to defaults, never
/// failing on a sparse shape.
pub trait OutgoingRequest {
    /// The request scheme, with the trailing colon, e.g. `"https:"`.
    fn protocol(&self) -> Option<&str> {
        None
    }

    /// The destination host, with the port appended when there is one.
    fn host(&self) -> Option<&str> {
        None
    }

    /// The request path, with the query when there is one.
    fn path(&self) -> Option<&str> {
        None
    }

    /// The value of the request header `name`.
    fn header(&self, name: &str) -> Option<&str> {
        let _ = name;
        None
    }

    /// The protocol of the nested transport agent, as exposed by older request shapes which
    /// carry no protocol of their own.
    fn agent_protocol(&self) -> Option<&str> {
        None
    }
}

/// A plain-struct request descriptor.
///
/// The straightforward [`OutgoingRequest`] implementation for callers which assemble request
/// data themselves.  Unset fields are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    /// Request scheme, with the trailing colon.
    pub protocol: Option<String>,
    /// Destination host.
    pub host: Option<String>,
    /// Request path.
    pub path: Option<String>,
    /// Request headers as name/value pairs; names match case-insensitively.
    pub headers: Vec<(String, String)>,
    /// Protocol of the nested transport agent.
    pub agent_protocol: Option<String>,
}

static_assertions::assert_impl_all!(RequestParts: Send, Sync);

impl OutgoingRequest for RequestParts {
    fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn agent_protocol(&self) -> Option<&str> {
        self.agent_protocol.as_deref()
    }
}

/// Routes outgoing requests to one of four pre-built transport handles.
///
/// Construction resolves the proxy configuration (see [`RouterOptions`] and
/// [`EnvSnapshot`]); [`route`](Self::route) then picks, per request, among direct http,
/// direct https, and the configured proxy handles, honoring the bypass list.
#[derive(Debug, Clone)]
pub struct ProxyRouter {
    bypass: BypassList,
    transports: Transports,
}

static_assertions::assert_impl_all!(ProxyRouter: Send, Sync);

impl ProxyRouter {
    /// Construct a router from `options`, with the process environment as fallback.
    ///
    /// Reads the `$HTTP_PROXY`, `$HTTPS_PROXY` and `$NO_PROXY` variable pairs once; see
    /// [`EnvSnapshot::capture`].  Return the router, or an error if an explicitly supplied
    /// proxy URL does not parse.
    pub fn new(options: RouterOptions) -> Result<Self, InvalidProxyUrl> {
        Self::with_env(options, EnvSnapshot::capture())
    }

    /// Construct a router from `options` and a pre-captured environment snapshot.
    ///
    /// Explicit option values win over snapshot values.  A proxy URL which does not parse is
    /// a fatal error when it came from an option, and is skipped with a warning when it came
    /// from the snapshot; in the latter case the corresponding proxy handle is simply never
    /// built and requests fall through to the remaining handles.
    pub fn with_env(options: RouterOptions, env: EnvSnapshot) -> Result<Self, InvalidProxyUrl> {
        let RouterOptions {
            http_proxy,
            https_proxy,
            no_proxy,
            connect,
        } = options;
        let EnvSnapshot {
            http_proxy: env_http_proxy,
            https_proxy: env_https_proxy,
            no_proxy: env_no_proxy,
        } = env;

        let http_endpoint =
            resolve_proxy(ProxyKind::Http, http_proxy, env_http_proxy, &connect.tls)?;
        let https_endpoint =
            resolve_proxy(ProxyKind::Https, https_proxy, env_https_proxy, &connect.tls)?;
        let bypass = match no_proxy.or_else(|| env_no_proxy.map(BypassSpec::Raw)) {
            Some(spec) => BypassList::parse(spec),
            None => BypassList::none(),
        };

        debug!(target: LOG_TARGET, "http proxy: {:?}", http_endpoint);
        debug!(target: LOG_TARGET, "https proxy: {:?}", https_endpoint);
        debug!(target: LOG_TARGET, "bypass: {:?}", bypass.patterns());

        Ok(Self {
            bypass,
            transports: Transports::new(&connect, http_endpoint, https_endpoint),
        })
    }

    /// The four-slot transport handle set of this router.
    pub fn transports(&self) -> &Transports {
        &self.transports
    }

    /// The bypass list of this router.
    pub fn bypass(&self) -> &BypassList {
        &self.bypass
    }

    /// Pick the transport handle to carry `request`.
    ///
    /// Synchronous and read-only: the decision consults only the state resolved at
    /// construction time and returns a reference into the stored handle set.  Missing or
    /// malformed request data falls back to defaults (`https:`, `localhost`, the empty
    /// path) rather than failing.
    ///
    /// A bypass match routes directly, by protocol.  Otherwise https requests use the https
    /// proxy when there is one and go direct when not; plain-http requests use the http
    /// proxy, then the https proxy, then the direct handle.
    pub fn route(&self, request: &dyn OutgoingRequest) -> &TransportHandle {
        let protocol = request
            .protocol()
            .or_else(|| request.agent_protocol())
            .unwrap_or("https:");
        let is_https = protocol == "https:";

        let host = request
            .host()
            .or_else(|| request.header("host"))
            .unwrap_or("localhost");
        let path = request.path().unwrap_or("");
        let url = absolute_url(protocol, host, path);

        let bypassed = self.bypass.matches(&url);
        debug!(
            target: LOG_TARGET,
            "{} - https: {}, proxy: {}",
            url,
            is_https,
            bypassed.not()
        );

        if bypassed {
            return if is_https {
                &self.transports.https
            } else {
                &self.transports.http
            };
        }

        if is_https {
            self.transports
                .https_proxy
                .as_ref()
                .unwrap_or(&self.transports.https)
        } else {
            // A secured proxy entry point can still relay plain-http traffic; a dedicated
            // plain-http proxy is not assumed to work the other way around.
            self.transports
                .http_proxy
                .as_ref()
                .or_else(|| self.transports.https_proxy.as_ref())
                .unwrap_or(&self.transports.http)
        }
    }

    /// Look up the proxy URL which would carry a request for `url`.
    ///
    /// Runs the same decision as [`route`](Self::route) and returns the selected proxy
    /// endpoint's URL, or `None` when the request would use a direct connection.  Suited for
    /// HTTP client builders which take a per-URL proxy callback.
    pub fn proxy_for_url(&self, url: &Url) -> Option<Url> {
        let host = url.host_str().map(|host| match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        });
        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        let request = RequestParts {
            protocol: Some(format!("{}:", url.scheme())),
            host,
            path: Some(path),
            ..RequestParts::default()
        };

        let endpoint = self.route(&request).proxy()?;
        match endpoint.url() {
            Ok(proxy) => Some(proxy),
            Err(parse_error) => {
                error!("Failed to reassemble proxy URL for {}: {}", url, parse_error);
                None
            }
        }
    }
}

/// Resolve one proxy entry from an explicit option value and its environment fallback.
///
/// The explicit value wins when both are present; empty values count as absent.  An invalid
/// explicit value is fatal, an invalid environment value is skipped with a warning and the
/// entry resolves to no endpoint.
fn resolve_proxy(
    kind: ProxyKind,
    explicit: Option<String>,
    env: Option<String>,
    tls: &TlsOptions,
) -> Result<Option<ProxyEndpoint>, InvalidProxyUrl> {
    let from_option = explicit.is_some();
    let raw = match explicit.or(env) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };
    match ProxyEndpoint::parse(&raw, kind, tls) {
        Ok(endpoint) => Ok(Some(endpoint)),
        Err(parse_error) if from_option => Err(parse_error),
        Err(parse_error) => {
            warn!("{}, skipping", parse_error);
            Ok(None)
        }
    }
}

/// Build the absolute URL string used for bypass matching.
///
/// The URL is normalized through a parse when it parses; otherwise the raw concatenation is
/// kept, so malformed request data still gets a best-effort bypass check instead of failing
/// the routing decision.
fn absolute_url(protocol: &str, host: &str, path: &str) -> String {
    let raw = format!("{}//{}{}", protocol, host, path);
    match Url::parse(&raw) {
        Ok(url) => url.to_string(),
        Err(_) => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportKind;
    use pretty_assertions::assert_eq;

    fn proxied_options() -> RouterOptions {
        RouterOptions {
            http_proxy: Some("http://localhost:1234".to_string()),
            https_proxy: Some("http://localhost:5678".to_string()),
            no_proxy: Some(BypassSpec::Patterns(vec!["google.com".to_string()])),
            ..RouterOptions::default()
        }
    }

    fn request(protocol: &str, host: &str) -> RequestParts {
        RequestParts {
            protocol: Some(protocol.to_string()),
            host: Some(host.to_string()),
            ..RequestParts::default()
        }
    }

    #[test]
    fn capture_prefers_uppercase() {
        temp_env::with_vars(
            vec![
                ("HTTP_PROXY", Some("http://up.thehttpproxy:1234")),
                ("http_proxy", Some("http://low.thehttpproxy:1234")),
                ("HTTPS_PROXY", Some("http://up.thehttpsproxy:1234")),
                ("https_proxy", Some("http://low.thehttpsproxy:1234")),
                ("NO_PROXY", Some("up.example.com")),
                ("no_proxy", Some("low.example.com")),
            ],
            || {
                assert_eq!(
                    EnvSnapshot::capture(),
                    EnvSnapshot {
                        http_proxy: Some("http://up.thehttpproxy:1234".to_string()),
                        https_proxy: Some("http://up.thehttpsproxy:1234".to_string()),
                        no_proxy: Some("up.example.com".to_string()),
                    }
                )
            },
        )
    }

    #[test]
    fn capture_falls_back_to_lowercase() {
        temp_env::with_vars(
            vec![
                ("HTTP_PROXY", None),
                ("http_proxy", Some("http://thehttpproxy:1234")),
                ("HTTPS_PROXY", None),
                ("https_proxy", Some("http://thehttpsproxy:1234")),
                ("NO_PROXY", None),
                ("no_proxy", Some("example.com")),
            ],
            || {
                assert_eq!(
                    EnvSnapshot::capture(),
                    EnvSnapshot {
                        http_proxy: Some("http://thehttpproxy:1234".to_string()),
                        https_proxy: Some("http://thehttpsproxy:1234".to_string()),
                        no_proxy: Some("example.com".to_string()),
                    }
                )
            },
        )
    }

    #[test]
    fn capture_unset_environment() {
        temp_env::with_vars_unset(
            vec![
                "HTTP_PROXY",
                "http_proxy",
                "HTTPS_PROXY",
                "https_proxy",
                "NO_PROXY",
                "no_proxy",
            ],
            || assert_eq!(EnvSnapshot::capture(), EnvSnapshot::unset()),
        )
    }

    #[test]
    fn options_win_over_environment() {
        let router = ProxyRouter::with_env(
            RouterOptions {
                http_proxy: Some("http://optionproxy:1111".to_string()),
                no_proxy: Some("option.example".into()),
                ..RouterOptions::default()
            },
            EnvSnapshot {
                http_proxy: Some("http://envproxy:2222".to_string()),
                https_proxy: None,
                no_proxy: Some("env.example".to_string()),
            },
        )
        .unwrap();

        let endpoint = router.transports().http_proxy.as_ref().unwrap().proxy().unwrap();
        assert_eq!(endpoint.host, "optionproxy:1111");
        assert_eq!(router.bypass().patterns(), &["option.example".to_string()]);
    }

    #[test]
    fn environment_fills_in_missing_options() {
        let router = ProxyRouter::with_env(
            RouterOptions::default(),
            EnvSnapshot {
                http_proxy: None,
                https_proxy: Some("http://envproxy:2222".to_string()),
                no_proxy: Some("a.example, b.example".to_string()),
            },
        )
        .unwrap();

        assert!(router.transports().http_proxy.is_none());
        let endpoint = router.transports().https_proxy.as_ref().unwrap().proxy().unwrap();
        assert_eq!(endpoint.host, "envproxy:2222");
        assert_eq!(
            router.bypass().patterns(),
            &["a.example".to_string(), "b.example".to_string()]
        );
    }

    #[test]
    fn no_configuration_builds_direct_handles_only() {
        let router = ProxyRouter::with_env(RouterOptions::default(), EnvSnapshot::unset()).unwrap();
        assert!(router.transports().http_proxy.is_none());
        assert!(router.transports().https_proxy.is_none());
        assert!(router.bypass().is_empty());
        assert_eq!(router.transports().http.kind(), TransportKind::DirectHttp);
        assert_eq!(router.transports().https.kind(), TransportKind::DirectHttps);
    }

    #[test]
    fn invalid_explicit_proxy_is_fatal() {
        let error = ProxyRouter::with_env(
            RouterOptions {
                http_proxy: Some("invalid".to_string()),
                ..RouterOptions::default()
            },
            EnvSnapshot::unset(),
        )
        .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("\"invalid\""), "message: {}", message);
        assert!(message.contains("http_proxy"), "message: {}", message);

        let error = ProxyRouter::with_env(
            RouterOptions {
                https_proxy: Some("also invalid".to_string()),
                ..RouterOptions::default()
            },
            EnvSnapshot::unset(),
        )
        .unwrap_err();
        assert!(error.to_string().contains("https_proxy"));
    }

    #[test]
    fn invalid_environment_proxy_is_skipped() {
        let router = ProxyRouter::with_env(
            RouterOptions::default(),
            EnvSnapshot {
                http_proxy: Some("invalid".to_string()),
                https_proxy: Some("http://envproxy:2222".to_string()),
                no_proxy: None,
            },
        )
        .unwrap();
        assert!(router.transports().http_proxy.is_none());
        assert!(router.transports().https_proxy.is_some());
    }

    #[test]
    fn explicit_option_fatal_even_with_valid_environment() {
        let result = ProxyRouter::with_env(
            RouterOptions {
                http_proxy: Some("invalid".to_string()),
                ..RouterOptions::default()
            },
            EnvSnapshot {
                http_proxy: Some("http://envproxy:2222".to_string()),
                https_proxy: None,
                no_proxy: None,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_proxy_values_count_as_absent() {
        let router = ProxyRouter::with_env(
            RouterOptions {
                http_proxy: Some(String::new()),
                ..RouterOptions::default()
            },
            EnvSnapshot {
                http_proxy: Some(String::new()),
                https_proxy: None,
                no_proxy: None,
            },
        )
        .unwrap();
        assert!(router.transports().http_proxy.is_none());
    }

    #[test]
    fn tls_material_reaches_https_proxy_endpoint_only() {
        let router = ProxyRouter::with_env(
            RouterOptions {
                http_proxy: Some("http://localhost:1234".to_string()),
                https_proxy: Some("http://localhost:5678".to_string()),
                connect: ConnectOptions {
                    tls: TlsOptions {
                        ca: Some("cacert.pem".to_string()),
                        ..TlsOptions::default()
                    },
                    ..ConnectOptions::default()
                },
                ..RouterOptions::default()
            },
            EnvSnapshot::unset(),
        )
        .unwrap();

        let https_endpoint = router.transports().https_proxy.as_ref().unwrap().proxy().unwrap();
        let http_endpoint = router.transports().http_proxy.as_ref().unwrap().proxy().unwrap();
        assert_eq!(https_endpoint.tls.ca.as_deref(), Some("cacert.pem"));
        assert!(http_endpoint.tls.is_empty());
    }

    #[test]
    fn routes_https_through_https_proxy() {
        let router = ProxyRouter::with_env(proxied_options(), EnvSnapshot::unset()).unwrap();
        let mut descriptor = request("https:", "github.com");
        descriptor.path = Some("/x".to_string());
        let handle = router.route(&descriptor);
        assert_eq!(handle.kind(), TransportKind::HttpsProxy);
        assert!(std::ptr::eq(
            handle,
            router.transports().https_proxy.as_ref().unwrap()
        ));
    }

    #[test]
    fn routes_bypassed_https_directly() {
        let router = ProxyRouter::with_env(proxied_options(), EnvSnapshot::unset()).unwrap();
        let handle = router.route(&request("https:", "google.com"));
        assert_eq!(handle.kind(), TransportKind::DirectHttps);
        assert!(std::ptr::eq(handle, &router.transports().https));
    }

    #[test]
    fn routes_bypassed_http_directly() {
        let router = ProxyRouter::with_env(proxied_options(), EnvSnapshot::unset()).unwrap();
        let handle = router.route(&request("http:", "google.com"));
        assert_eq!(handle.kind(), TransportKind::DirectHttp);
    }

    #[test]
    fn routes_http_through_http_proxy() {
        let router = ProxyRouter::with_env(proxied_options(), EnvSnapshot::unset()).unwrap();
        let handle = router.route(&request("http:", "github.com"));
        assert_eq!(handle.kind(), TransportKind::HttpProxy);
    }

    #[test]
    fn https_without_https_proxy_goes_direct() {
        // Never through the http proxy, even though one is configured.
        let router = ProxyRouter::with_env(
            RouterOptions {
                http_proxy: Some("http://localhost:1234".to_string()),
                ..RouterOptions::default()
            },
            EnvSnapshot::unset(),
        )
        .unwrap();
        let handle = router.route(&request("https:", "github.com"));
        assert_eq!(handle.kind(), TransportKind::DirectHttps);
    }

    #[test]
    fn http_falls_back_to_https_proxy() {
        let router = ProxyRouter::with_env(
            RouterOptions {
                https_proxy: Some("http://localhost:5678".to_string()),
                ..RouterOptions::default()
            },
            EnvSnapshot::unset(),
        )
        .unwrap();
        let handle = router.route(&request("http:", "github.com"));
        assert_eq!(handle.kind(), TransportKind::HttpsProxy);
    }

    #[test]
    fn http_without_any_proxy_goes_direct() {
        let router = ProxyRouter::with_env(RouterOptions::default(), EnvSnapshot::unset()).unwrap();
        let handle = router.route(&request("http:", "github.com"));
        assert_eq!(handle.kind(), TransportKind::DirectHttp);
    }

    #[test]
    fn default_request_is_https_to_localhost() {
        let router = ProxyRouter::with_env(
            RouterOptions {
                https_proxy: Some("http://localhost:5678".to_string()),
                no_proxy: Some("localhost".into()),
                ..RouterOptions::default()
            },
            EnvSnapshot::unset(),
        )
        .unwrap();
        // Protocol defaults to https, host to localhost, which the bypass list then matches.
        let handle = router.route(&RequestParts::default());
        assert_eq!(handle.kind(), TransportKind::DirectHttps);
    }

    #[test]
    fn agent_protocol_used_when_protocol_missing() {
        let router = ProxyRouter::with_env(proxied_options(), EnvSnapshot::unset()).unwrap();
        let descriptor = RequestParts {
            host: Some("github.com".to_string()),
            agent_protocol: Some("http:".to_string()),
            ..RequestParts::default()
        };
        assert_eq!(router.route(&descriptor).kind(), TransportKind::HttpProxy);
    }

    #[test]
    fn host_header_used_when_host_missing() {
        let router = ProxyRouter::with_env(proxied_options(), EnvSnapshot::unset()).unwrap();
        let descriptor = RequestParts {
            protocol: Some("https:".to_string()),
            headers: vec![("Host".to_string(), "google.com".to_string())],
            ..RequestParts::default()
        };
        assert_eq!(router.route(&descriptor).kind(), TransportKind::DirectHttps);
    }

    #[test]
    fn malformed_request_data_still_routes() {
        let router = ProxyRouter::with_env(proxied_options(), EnvSnapshot::unset()).unwrap();
        let descriptor = RequestParts {
            protocol: Some("not a protocol".to_string()),
            host: Some("[::broken".to_string()),
            path: Some("::::".to_string()),
            ..RequestParts::default()
        };
        // Anything not literally "https:" counts as plain http; the garbage URL matches no
        // bypass pattern, so the request takes the http proxy chain.
        assert_eq!(router.route(&descriptor).kind(), TransportKind::HttpProxy);
    }

    #[test]
    fn wildcard_bypass_patterns_route_directly() {
        let router = ProxyRouter::with_env(
            RouterOptions {
                https_proxy: Some("http://localhost:5678".to_string()),
                no_proxy: Some("*.internal.example".into()),
                ..RouterOptions::default()
            },
            EnvSnapshot::unset(),
        )
        .unwrap();
        let direct = router.route(&request("https:", "svc.internal.example"));
        assert_eq!(direct.kind(), TransportKind::DirectHttps);
        let proxied = router.route(&request("https:", "external.example"));
        assert_eq!(proxied.kind(), TransportKind::HttpsProxy);
    }

    #[test]
    fn proxy_for_url_returns_proxy_or_none() {
        let router = ProxyRouter::with_env(proxied_options(), EnvSnapshot::unset()).unwrap();
        assert_eq!(
            router.proxy_for_url(&Url::parse("https://github.com/x").unwrap()),
            Some(Url::parse("http://localhost:5678/").unwrap())
        );
        assert_eq!(
            router.proxy_for_url(&Url::parse("http://github.com").unwrap()),
            Some(Url::parse("http://localhost:1234/").unwrap())
        );
        assert_eq!(
            router.proxy_for_url(&Url::parse("https://google.com").unwrap()),
            None
        );
    }

    #[test]
    fn construction_from_process_environment() {
        temp_env::with_vars(
            vec![
                ("HTTP_PROXY", Some("http://thehttpproxy:1234")),
                ("http_proxy", None),
                ("HTTPS_PROXY", None),
                ("https_proxy", None),
                ("NO_PROXY", Some("example.com")),
                ("no_proxy", None),
            ],
            || {
                let router = ProxyRouter::new(RouterOptions::default()).unwrap();
                let endpoint = router.transports().http_proxy.as_ref().unwrap().proxy().unwrap();
                assert_eq!(endpoint.host, "thehttpproxy:1234");
                assert!(router.transports().https_proxy.is_none());
                assert_eq!(router.bypass().patterns(), &["example.com".to_string()]);
            },
        )
    }
}
