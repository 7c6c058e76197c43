//! Client-side router: ordered route table, resolution, and guarded
//! navigation.

pub mod guard;
pub mod matcher;
pub mod routes;

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use url::form_urlencoded;

use crate::status::lock;

pub use guard::{NavigationDecision, REDIRECT_QUERY, SessionView, decide};
pub use matcher::PathPattern;
pub use routes::{RouteMeta, RouteRecord, default_routes};

/// Redirect hops followed by a single `push` before giving up.
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route named '{0}'")]
    UnknownRoute(String),

    #[error("no route matches '{0}'")]
    NoMatch(String),

    #[error("route '{route}' requires param '{param}'")]
    MissingParam { route: String, param: String },

    #[error("duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("too many redirects while navigating to '{0}'")]
    RedirectLoop(String),
}

/// Where to navigate: a literal path (may include `?query`) or a named route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Path(String),
    Named {
        name: String,
        params: BTreeMap<String, String>,
        query: BTreeMap<String, String>,
    },
}

impl RouteTarget {
    pub fn path(path: impl Into<String>) -> Self {
        RouteTarget::Path(path.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        RouteTarget::Named {
            name: name.into(),
            params: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }

    /// Add a path param (ignored for `Path` targets).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let RouteTarget::Named { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// Add a query pair (ignored for `Path` targets).
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let RouteTarget::Named { query, .. } = &mut self {
            query.insert(key.into(), value.into());
        }
        self
    }
}

impl core::fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RouteTarget::Path(p) => f.write_str(p),
            RouteTarget::Named { name, .. } => write!(f, "<{name}>"),
        }
    }
}

/// A target resolved against the route table, with merged metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: String,
    pub path: String,
    /// `path` plus the encoded query string, if any.
    pub full_path: String,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub meta: RouteMeta,
}

impl ResolvedRoute {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Imperative navigation, as used by the stores.
pub trait Navigator: Send + Sync {
    fn push(&self, target: RouteTarget) -> Result<ResolvedRoute, RouteError>;
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    name: String,
    pattern: PathPattern,
    /// Metadata of every record from the root down to this one.
    chain: Vec<RouteMeta>,
}

impl CompiledRoute {
    /// `requires_auth` if any record in the chain requires it; `roles` from
    /// the innermost record declaring them.
    fn merged_meta(&self) -> RouteMeta {
        RouteMeta {
            requires_auth: self.chain.iter().any(|m| m.requires_auth),
            roles: self.chain.iter().rev().find_map(|m| m.roles.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct RouterState {
    current: Option<ResolvedRoute>,
    history: Vec<String>,
}

pub struct Router {
    routes: Vec<CompiledRoute>,
    session: Arc<dyn SessionView>,
    state: Mutex<RouterState>,
}

impl Router {
    pub fn new(records: Vec<RouteRecord>, session: Arc<dyn SessionView>) -> Result<Self, RouteError> {
        let mut routes = Vec::new();
        flatten(&records, "", &[], &mut routes);

        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert(route.name.as_str()) {
                return Err(RouteError::DuplicateName(route.name.clone()));
            }
        }

        Ok(Self {
            routes,
            session,
            state: Mutex::new(RouterState::default()),
        })
    }

    pub fn resolve(&self, target: &RouteTarget) -> Result<ResolvedRoute, RouteError> {
        match target {
            RouteTarget::Path(raw) => {
                let (path, query) = split_query(raw);
                let path = matcher::normalize(path);

                // Most specific pattern wins; ties go to declaration order.
                let mut best: Option<(&CompiledRoute, BTreeMap<String, String>)> = None;
                for route in &self.routes {
                    if let Some(params) = route.pattern.matches(&path) {
                        let better = match &best {
                            None => true,
                            Some((current, _)) => route.pattern.specificity_cmp(&current.pattern).is_gt(),
                        };
                        if better {
                            best = Some((route, params));
                        }
                    }
                }

                let (route, params) = best.ok_or_else(|| RouteError::NoMatch(path.clone()))?;
                Ok(build_resolved(route, path, params, parse_query(query)))
            }
            RouteTarget::Named {
                name,
                params,
                query,
            } => {
                let route = self
                    .routes
                    .iter()
                    .find(|r| &r.name == name)
                    .ok_or_else(|| RouteError::UnknownRoute(name.clone()))?;
                let path = route
                    .pattern
                    .build(params)
                    .map_err(|param| RouteError::MissingParam {
                        route: name.clone(),
                        param,
                    })?;
                let params = route.pattern.matches(&path).unwrap_or_else(|| params.clone());
                Ok(build_resolved(route, path, params, query.clone()))
            }
        }
    }

    /// The committed location, if any navigation has happened yet.
    pub fn current(&self) -> Option<ResolvedRoute> {
        lock(&self.state).current.clone()
    }

    /// Full paths of all committed navigations, oldest first.
    pub fn history(&self) -> Vec<String> {
        lock(&self.state).history.clone()
    }

    fn navigate(&self, target: RouteTarget) -> Result<ResolvedRoute, RouteError> {
        let requested = target.to_string();
        let mut next = target;

        for _ in 0..=MAX_REDIRECTS {
            let to = self.resolve(&next)?;
            match decide(&to, self.session.as_ref()) {
                NavigationDecision::Allow => {
                    let mut state = lock(&self.state);
                    let from = state.current.as_ref().map(|r| r.full_path.clone());
                    tracing::info!(from = from.as_deref().unwrap_or("-"), to = %to.full_path, "navigation committed");
                    state.history.push(to.full_path.clone());
                    state.current = Some(to.clone());
                    return Ok(to);
                }
                NavigationDecision::Redirect(redirect) => {
                    tracing::debug!(from = %to.full_path, to = %redirect, "navigation redirected by guard");
                    next = redirect;
                }
            }
        }

        Err(RouteError::RedirectLoop(requested))
    }
}

impl Navigator for Router {
    fn push(&self, target: RouteTarget) -> Result<ResolvedRoute, RouteError> {
        self.navigate(target)
    }
}

impl core::fmt::Debug for Router {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.iter().map(|r| r.name.as_str()).collect::<Vec<_>>())
            .field("current", &self.current().map(|r| r.full_path))
            .finish()
    }
}

fn flatten(records: &[RouteRecord], base: &str, chain: &[RouteMeta], out: &mut Vec<CompiledRoute>) {
    for record in records {
        let path = if record.path.starts_with('/') {
            record.path.clone()
        } else {
            format!("{}/{}", base.trim_end_matches('/'), record.path)
        };
        let mut chain = chain.to_vec();
        chain.push(record.meta.clone());

        out.push(CompiledRoute {
            name: record.name.clone(),
            pattern: PathPattern::parse(&path),
            chain: chain.clone(),
        });
        flatten(&record.children, &path, &chain, out);
    }
}

fn build_resolved(
    route: &CompiledRoute,
    path: String,
    params: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
) -> ResolvedRoute {
    let full_path = if query.is_empty() {
        path.clone()
    } else {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter())
            .finish();
        format!("{path}?{encoded}")
    };

    ResolvedRoute {
        name: route.name.clone(),
        path,
        full_path,
        params,
        query,
        meta: route.merged_meta(),
    }
}

fn split_query(raw: &str) -> (&str, &str) {
    match raw.split_once('?') {
        Some((path, query)) => (path, query),
        None => (raw, ""),
    }
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
