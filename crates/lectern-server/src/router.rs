//! Path matching for the server's fixed set of endpoints.
//!
//! Route templates use `{name}` placeholders. A placeholder may share its
//! segment with literal text, so `/docs/{apiVersion}.json` matches
//! `/docs/v1.json` with `apiVersion = "v1"`.
//!
//! ```rust
//! use lectern_server::{RouteResolution, RouteTarget, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/swagger/docs/{apiVersion}", RouteTarget::Docs).unwrap();
//!
//! match router.resolve(&Method::GET, "/swagger/docs/v1") {
//!     RouteResolution::Matched(m) => assert_eq!(m.param("apiVersion"), Some("v1")),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use std::collections::HashMap;

use http::Method;

use crate::error::{ServerError, ServerResult};

/// What a route serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteTarget {
    /// The descriptor document endpoint.
    Docs,
    /// Liveness probe.
    Health,
    /// Readiness probe.
    Ready,
    /// Prometheus exposition.
    Metrics,
}

impl RouteTarget {
    /// Label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Docs => "docs",
            Self::Health => "health",
            Self::Ready => "ready",
            Self::Metrics => "metrics",
        }
    }
}

/// A matched route with its extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    target: RouteTarget,
    params: HashMap<String, String>,
}

impl RouteMatch {
    /// The matched endpoint.
    #[must_use]
    pub fn target(&self) -> RouteTarget {
        self.target
    }

    /// A path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Outcome of resolving a request against the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResolution {
    /// Path and method matched.
    Matched(RouteMatch),
    /// The path exists but not for this method.
    MethodNotAllowed {
        /// Methods the path does accept.
        allowed: Vec<Method>,
    },
    /// Nothing matched the path.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param {
        prefix: String,
        name: String,
        suffix: String,
    },
}

impl Segment {
    fn parse(raw: &str) -> Result<Self, String> {
        let Some(open) = raw.find('{') else {
            if raw.contains('}') {
                return Err(format!("unbalanced '}}' in segment '{raw}'"));
            }
            return Ok(Self::Literal(raw.to_string()));
        };
        let close = raw[open..]
            .find('}')
            .map(|offset| open + offset)
            .ok_or_else(|| format!("unclosed '{{' in segment '{raw}'"))?;

        let name = &raw[open + 1..close];
        let suffix = &raw[close + 1..];
        if name.is_empty() {
            return Err(format!("empty placeholder in segment '{raw}'"));
        }
        if suffix.contains('{') || suffix.contains('}') {
            return Err(format!("more than one placeholder in segment '{raw}'"));
        }

        Ok(Self::Param {
            prefix: raw[..open].to_string(),
            name: name.to_string(),
            suffix: suffix.to_string(),
        })
    }

    fn capture<'a>(&self, actual: &'a str) -> Option<Option<(&str, &'a str)>> {
        match self {
            Self::Literal(expected) => (expected == actual).then_some(None),
            Self::Param {
                prefix,
                name,
                suffix,
            } => {
                let value = actual.strip_prefix(prefix.as_str())?;
                let value = value.strip_suffix(suffix.as_str())?;
                (!value.is_empty()).then_some(Some((name.as_str(), value)))
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    segments: Vec<Segment>,
    target: RouteTarget,
}

impl Route {
    fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if actual.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, value) in self.segments.iter().zip(actual) {
            if let Some((name, captured)) = segment.capture(value)? {
                params.insert(name.to_string(), captured.to_string());
            }
        }
        Some(params)
    }
}

/// Maps method and path to a [`RouteTarget`]. First registered match wins.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidRoute` for templates that do not start
    /// with `/` or contain malformed placeholders.
    pub fn add_route(
        &mut self,
        method: Method,
        template: &str,
        target: RouteTarget,
    ) -> ServerResult<()> {
        if !template.starts_with('/') {
            return Err(ServerError::invalid_route(template, "must start with '/'"));
        }

        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| ServerError::invalid_route(template, reason))?;

        self.routes.push(Route {
            method,
            segments,
            target,
        });
        Ok(())
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Resolves a request.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> RouteResolution {
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(params) = route.match_path(path) else {
                continue;
            };
            if route.method == *method {
                return RouteResolution::Matched(RouteMatch {
                    target: route.target,
                    params,
                });
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            RouteResolution::NotFound
        } else {
            RouteResolution::MethodNotAllowed { allowed }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        let mut router = Router::new();
        router
            .add_route(Method::GET, "/swagger/docs/{apiVersion}", RouteTarget::Docs)
            .unwrap();
        router
            .add_route(Method::GET, "/health", RouteTarget::Health)
            .unwrap();
        router
    }

    fn matched(resolution: RouteResolution) -> RouteMatch {
        match resolution {
            RouteResolution::Matched(m) => m,
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_docs_route_extracts_version() {
        let m = matched(router().resolve(&Method::GET, "/swagger/docs/v1"));
        assert_eq!(m.target(), RouteTarget::Docs);
        assert_eq!(m.param("apiVersion"), Some("v1"));
    }

    #[test]
    fn test_trailing_slash_matches() {
        let m = matched(router().resolve(&Method::GET, "/swagger/docs/V2/"));
        assert_eq!(m.param("apiVersion"), Some("V2"));
    }

    #[test]
    fn test_literal_route() {
        let m = matched(router().resolve(&Method::GET, "/health"));
        assert_eq!(m.target(), RouteTarget::Health);
        assert_eq!(m.param("apiVersion"), None);
    }

    #[test]
    fn test_unknown_path() {
        assert_eq!(
            router().resolve(&Method::GET, "/swagger/ui"),
            RouteResolution::NotFound
        );
        assert_eq!(
            router().resolve(&Method::GET, "/swagger/docs/v1/extra"),
            RouteResolution::NotFound
        );
    }

    #[test]
    fn test_wrong_method() {
        assert_eq!(
            router().resolve(&Method::POST, "/swagger/docs/v1"),
            RouteResolution::MethodNotAllowed {
                allowed: vec![Method::GET]
            }
        );
    }

    #[test]
    fn test_placeholder_with_literal_text() {
        let mut router = Router::new();
        router
            .add_route(Method::GET, "/docs/{apiVersion}.json", RouteTarget::Docs)
            .unwrap();

        let m = matched(router.resolve(&Method::GET, "/docs/v3.json"));
        assert_eq!(m.param("apiVersion"), Some("v3"));
        assert_eq!(
            router.resolve(&Method::GET, "/docs/.json"),
            RouteResolution::NotFound
        );
        assert_eq!(
            router.resolve(&Method::GET, "/docs/v3.xml"),
            RouteResolution::NotFound
        );
    }

    #[test]
    fn test_invalid_templates() {
        let mut router = Router::new();
        assert!(router
            .add_route(Method::GET, "docs/{apiVersion}", RouteTarget::Docs)
            .is_err());
        assert!(router
            .add_route(Method::GET, "/docs/{apiVersion", RouteTarget::Docs)
            .is_err());
        assert!(router
            .add_route(Method::GET, "/docs/{}", RouteTarget::Docs)
            .is_err());
        assert!(router
            .add_route(Method::GET, "/docs/{a}{b}", RouteTarget::Docs)
            .is_err());
        assert_eq!(router.route_count(), 0);
    }
}
