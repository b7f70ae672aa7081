// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bypass rules for sending selected requests directly, proxy configuration notwithstanding.
//!
//! The bypass list is the `$NO_PROXY` side of proxy configuration: a list of patterns naming
//! destinations which must never go through a proxy.  Patterns support `*` as a wildcard for
//! any run of characters and are matched anchored, against the whole candidate string.
//!
//! A pattern may spell out as much of the request URL as it cares about: the full URL
//! (`https://ci.example.com/builds`), the URL without its scheme (`ci.example.com/builds`), or
//! just the host (`ci.example.com`, `*.example.com`, `localhost:8080`).  Matching tries each of
//! these forms of the request URL in turn, so the common bare-hostname entries behave the way
//! `$NO_PROXY` users expect.

use url::Url;

/// Raw bypass configuration, before parsing.
///
/// Callers either hand over a comma-delimited string, as found in the `$NO_PROXY` environment
/// variable, or a list of patterns they already split themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassSpec {
    /// A comma-delimited pattern string; segments are trimmed while parsing.
    Raw(String),
    /// Patterns which are already split; used verbatim, without trimming.
    Patterns(Vec<String>),
}

static_assertions::assert_impl_all!(BypassSpec: Send, Sync);

impl From<&str> for BypassSpec {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for BypassSpec {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<Vec<String>> for BypassSpec {
    fn from(patterns: Vec<String>) -> Self {
        Self::Patterns(patterns)
    }
}

/// Destinations to connect to directly, skipping any configured proxy.
///
/// An empty list bypasses nothing.  Matching short-circuits on the first matching pattern, so
/// the order of patterns never affects the outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BypassList {
    patterns: Vec<String>,
}

static_assertions::assert_impl_all!(BypassList: Send, Sync);

impl BypassList {
    /// Create a bypass list from the given patterns.
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// The empty bypass list, i.e. always use the configured proxy.
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse a bypass list from `spec`.
    ///
    /// A [`BypassSpec::Raw`] string is split on commas with every segment trimmed; an empty or
    /// all-whitespace string parses to the empty list, never to a list holding one empty
    /// pattern.  [`BypassSpec::Patterns`] are taken over as-is.
    pub fn parse(spec: BypassSpec) -> Self {
        match spec {
            BypassSpec::Raw(raw) => {
                if raw.trim().is_empty() {
                    Self::none()
                } else {
                    Self::new(
                        raw.split(',')
                            .map(|pattern| pattern.trim().to_string())
                            .collect(),
                    )
                }
            }
            BypassSpec::Patterns(patterns) => Self::new(patterns),
        }
    }

    /// The patterns in this list.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether this list bypasses nothing.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a request for `url` must skip the proxy.
    ///
    /// `url` is the absolute URL of the request.  Return `true` if any pattern matches any
    /// candidate form of the URL, or `false` otherwise.
    pub fn matches(&self, url: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let forms = candidate_forms(url);
        self.patterns
            .iter()
            .any(|pattern| forms.iter().any(|form| wildcard_match(form, pattern)))
    }
}

impl From<Vec<String>> for BypassList {
    fn from(patterns: Vec<String>) -> Self {
        Self::new(patterns)
    }
}

/// The forms of `url` that patterns are matched against.
///
/// When `url` parses, the forms are the normalized URL, the URL without its scheme, and the
/// bare host[:port].  When it does not parse the raw string is matched as-is, so malformed
/// request data degrades to a near-certain non-match instead of a failure.
fn candidate_forms(url: &str) -> Vec<String> {
    let mut forms = vec![url.to_string()];
    if let Ok(parsed) = Url::parse(url) {
        forms.push(parsed.to_string());
        if let Some(host) = parsed.host_str() {
            let host = match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            let mut without_scheme = host.clone();
            if parsed.path() != "/" {
                without_scheme.push_str(parsed.path());
            }
            if let Some(query) = parsed.query() {
                without_scheme.push('?');
                without_scheme.push_str(query);
            }
            forms.push(without_scheme);
            forms.push(host);
        }
    }
    forms
}

/// Match `text` against `pattern`, where `*` stands for any run of characters.
///
/// The match is anchored: the pattern must cover the whole of `text`, not a substring of it.
fn wildcard_match(text: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return text == pattern;
    }
    let segments: Vec<&str> = pattern.split('*').collect();
    let mut rest = match text.strip_prefix(segments[0]) {
        Some(rest) => rest,
        None => return false,
    };
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(index) => rest = &rest[index + segment.len()..],
            None => return false,
        }
    }
    rest.ends_with(segments[segments.len() - 1])
}
