//! Path patterns: static segments, `:param` segments and a trailing
//! catch-all (`:name(.*)*`).

use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

impl Segment {
    fn weight(&self) -> u8 {
        match self {
            Segment::Static(_) => 3,
            Segment::Param(_) => 2,
            Segment::CatchAll(_) => 1,
        }
    }
}

/// A compiled route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(source: &str) -> Self {
        let segments = split_path(source)
            .map(|raw| match raw.strip_prefix(':') {
                Some(param) => match param.find('(') {
                    Some(idx) if param[idx..].starts_with("(.*)") => {
                        Segment::CatchAll(param[..idx].to_string())
                    }
                    _ => Segment::Param(param.to_string()),
                },
                None => Segment::Static(raw.to_string()),
            })
            .collect();

        Self {
            source: normalize(source),
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match a normalized path (no query), returning the captured params.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = split_path(path).collect();
        let mut params = BTreeMap::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(s) => {
                    if parts.get(i) != Some(&s.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), (*value).to_string());
                }
                Segment::CatchAll(name) => {
                    let rest = parts.get(i..).unwrap_or_default().join("/");
                    params.insert(name.clone(), rest);
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Build a concrete path from params.
    pub fn build(&self, params: &BTreeMap<String, String>) -> Result<String, String> {
        let mut out = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => out.push(s.clone()),
                Segment::Param(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty()).ok_or_else(|| name.clone())?;
                    out.push(value.clone());
                }
                Segment::CatchAll(name) => {
                    if let Some(value) = params.get(name).filter(|v| !v.is_empty()) {
                        out.push(value.trim_matches('/').to_string());
                    }
                }
            }
        }
        Ok(format!("/{}", out.join("/")))
    }

    /// Specificity ordering: a pattern without a catch-all beats one with
    /// it; then per segment, static beats param beats catch-all; with an
    /// equal prefix the longer pattern wins.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        match other.has_catch_all().cmp(&self.has_catch_all()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        for (a, b) in self.segments.iter().zip(&other.segments) {
            match a.weight().cmp(&b.weight()) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.segments.len().cmp(&other.segments.len())
    }

    fn has_catch_all(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::CatchAll(_)))
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Collapse duplicate and trailing slashes: `//a/b/` → `/a/b`.
pub fn normalize(path: &str) -> String {
    let joined: Vec<&str> = split_path(path).collect();
    format!("/{}", joined.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_captured() {
        let p = PathPattern::parse("/employees/:id/edit");
        let params = p.matches("/employees/e9/edit").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("e9"));
        assert!(p.matches("/employees/e9").is_none());
        assert!(p.matches("/employees//edit").is_none());
    }

    #[test]
    fn catch_all_takes_the_rest() {
        let p = PathPattern::parse("/:pathMatch(.*)*");
        let params = p.matches("/no/such/page").unwrap();
        assert_eq!(params["pathMatch"], "no/such/page");
        assert!(p.matches("/").is_some());
    }

    #[test]
    fn static_beats_param_beats_catch_all() {
        let new = PathPattern::parse("/employees/new");
        let detail = PathPattern::parse("/employees/:id");
        let any = PathPattern::parse("/:pathMatch(.*)*");
        assert_eq!(new.specificity_cmp(&detail), Ordering::Greater);
        assert_eq!(detail.specificity_cmp(&any), Ordering::Greater);
    }

    #[test]
    fn root_beats_catch_all() {
        let root = PathPattern::parse("/");
        let any = PathPattern::parse("/:pathMatch(.*)*");
        assert!(root.matches("/").is_some());
        assert_eq!(root.specificity_cmp(&any), Ordering::Greater);
        assert_eq!(any.specificity_cmp(&root), Ordering::Less);
    }

    #[test]
    fn build_requires_params() {
        let p = PathPattern::parse("/employees/:id");
        let mut params = BTreeMap::new();
        assert_eq!(p.build(&params), Err("id".to_string()));
        params.insert("id".into(), "e9".into());
        assert_eq!(p.build(&params).unwrap(), "/employees/e9");
    }

    #[test]
    fn normalize_collapses_slashes() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("//employees/"), "/employees");
    }
}
