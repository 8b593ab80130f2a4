//! Route policy: which paths need a signed-in user.

use serde::Deserialize;
use thiserror::Error;

/// Route policy configuration.
///
/// Patterns use `{param}` segments (`/edit-course/{id}`) and `{*rest}`
/// catch-alls.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutePolicyConfig {
    /// Where denied navigations are redirected. Always accessible.
    pub login_path: String,

    /// Paths that require a signed-in user.
    pub protected: Vec<String>,

    /// Paths that never require a signed-in user.
    pub public: Vec<String>,

    /// Whether paths matching neither list require a signed-in user.
    pub require_auth_by_default: bool,
}

impl Default for RoutePolicyConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_owned(),
            protected: [
                "/add-course",
                "/manage-courses",
                "/manageCourses",
                "/edit-course/{id}",
                "/my-enrollments",
                "/dashboard",
                "/dashboard/{*rest}",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            public: [
                "/",
                "/courses",
                "/courses/{id}",
                "/register",
                "/terms",
                "/terms-conditions",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            require_auth_by_default: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum RoutePolicyError {
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("login path must be absolute: '{0}'")]
    InvalidLoginPath(String),
}

#[derive(Default)]
struct PatternSet {
    router: matchit::Router<()>,
}

impl PatternSet {
    fn build(patterns: &[String]) -> Result<Self, RoutePolicyError> {
        let mut set = Self::default();
        for pattern in patterns {
            set.router
                .insert(pattern.as_str(), ())
                .map_err(|source| RoutePolicyError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }
        Ok(set)
    }

    fn matches(&self, path: &str) -> bool {
        self.router.at(path).is_ok()
    }
}

/// Compiled route policy.
///
/// Public patterns and the login path win over protected patterns.
pub struct RoutePolicy {
    login_path: String,
    protected: PatternSet,
    public: PatternSet,
    require_auth_by_default: bool,
}

impl RoutePolicy {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` for a malformed or conflicting pattern,
    /// `InvalidLoginPath` if the login path is not absolute.
    pub fn from_config(cfg: &RoutePolicyConfig) -> Result<Self, RoutePolicyError> {
        if !cfg.login_path.starts_with('/') {
            return Err(RoutePolicyError::InvalidLoginPath(cfg.login_path.clone()));
        }

        Ok(Self {
            login_path: cfg.login_path.clone(),
            protected: PatternSet::build(&cfg.protected)?,
            public: PatternSet::build(&cfg.public)?,
            require_auth_by_default: cfg.require_auth_by_default,
        })
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Whether navigating to `path` needs a signed-in user. Query strings,
    /// fragments and one trailing `/` are ignored.
    #[must_use]
    pub fn requires_auth(&self, path: &str) -> bool {
        let path = route_of(path);
        if path == self.login_path || self.public.matches(path) {
            return false;
        }
        self.protected.matches(path) || self.require_auth_by_default
    }
}

fn route_of(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let route = &path[..end];
    match route {
        "" => "/",
        "/" => route,
        _ => route.strip_suffix('/').unwrap_or(route),
    }
}
