//! The routing tree: a segment trie mapping (method, path template) pairs to
//! handlers.
//!
//! Template grammar: segments are separated by `/`; a segment `:name`
//! captures one path segment, a segment `*name` (final position only)
//! captures the remaining path including slashes, anything else matches
//! literally. Matching is case-sensitive and does not collapse repeated or
//! trailing slashes.
//!
//! Resolution walks the trie depth-first with backtracking. At each level
//! the precedence is literal > capture > wildcard; when a literal branch
//! dead-ends deeper in the trie, the walk backs up and retries the capture
//! and wildcard branches. The tree is built once at startup and is read-only
//! while serving, so concurrent lookups need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use crate::error::SetupError;
use crate::handler::Handler;
use crate::params::Params;

/// A handler installed under a (method, template) pair.
pub(crate) struct RouteTarget {
    pub(crate) name: Arc<str>,
    pub(crate) handler: Arc<dyn Handler>,
}

/// Outcome of resolving a (method, path) pair.
///
/// `MethodNotAllowed` and `NotFound` are ordinary results, not errors: the
/// dispatcher decides the resulting status. `allow` lists the methods
/// registered for the path, for the 405 `Allow` header.
pub(crate) enum Resolution<'tree> {
    Found { target: &'tree RouteTarget, params: Params },
    MethodNotAllowed { allow: Vec<Method> },
    NotFound,
}

enum Segment<'tmpl> {
    Literal(&'tmpl str),
    Capture(&'tmpl str),
    Wildcard(&'tmpl str),
}

fn parse_template(template: &str) -> Result<Vec<Segment<'_>>, SetupError> {
    let Some(rest) = template.strip_prefix('/') else {
        return Err(SetupError::missing_leading_slash(template));
    };
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<&str> = rest.split('/').collect();
    let last = raw.len() - 1;
    let mut segments = Vec::with_capacity(raw.len());

    for (index, segment) in raw.iter().enumerate() {
        let parsed = if let Some(name) = segment.strip_prefix(':') {
            check_capture_name(name, template)?;
            Segment::Capture(name)
        } else if let Some(name) = segment.strip_prefix('*') {
            check_capture_name(name, template)?;
            if index != last {
                return Err(SetupError::wildcard_not_trailing(template));
            }
            Segment::Wildcard(name)
        } else {
            if let Some(marker) = segment.chars().find(|c| matches!(c, ':' | '*')) {
                return Err(SetupError::marker_inside_segment(marker, template));
            }
            Segment::Literal(segment)
        };
        segments.push(parsed);
    }

    Ok(segments)
}

fn check_capture_name(name: &str, template: &str) -> Result<(), SetupError> {
    if name.is_empty() {
        return Err(SetupError::empty_capture_name(template));
    }
    if let Some(marker) = name.chars().find(|c| matches!(c, ':' | '*')) {
        return Err(SetupError::marker_inside_segment(marker, template));
    }
    Ok(())
}

/// A trie node holds at most one literal-child map, one capture child and one
/// wildcard child. The capture/wildcard names are fixed per position;
/// registering a different name at the same position is a setup error rather
/// than a silent merge.
#[derive(Default)]
struct Node {
    literals: HashMap<String, Node>,
    capture: Option<Box<CaptureNode>>,
    wildcard: Option<WildcardNode>,
    routes: HashMap<Method, RouteTarget>,
}

struct CaptureNode {
    name: String,
    node: Node,
}

struct WildcardNode {
    name: String,
    routes: HashMap<Method, RouteTarget>,
}

#[derive(Default)]
pub(crate) struct Tree {
    root: Node,
}

impl Tree {
    pub(crate) fn insert(
        &mut self,
        method: Method,
        template: &str,
        target: RouteTarget,
    ) -> Result<(), SetupError> {
        let segments = parse_template(template)?;

        let mut node = &mut self.root;
        for segment in &segments {
            match segment {
                Segment::Literal(text) => {
                    node = node.literals.entry((*text).to_owned()).or_default();
                }
                Segment::Capture(name) => {
                    let capture = node.capture.get_or_insert_with(|| {
                        Box::new(CaptureNode { name: (*name).to_owned(), node: Node::default() })
                    });
                    if capture.name != *name {
                        return Err(SetupError::capture_name_conflict(&capture.name, *name, template));
                    }
                    node = &mut capture.node;
                }
                Segment::Wildcard(name) => {
                    let wildcard = node
                        .wildcard
                        .get_or_insert_with(|| WildcardNode { name: (*name).to_owned(), routes: HashMap::new() });
                    if wildcard.name != *name {
                        return Err(SetupError::capture_name_conflict(&wildcard.name, *name, template));
                    }
                    if wildcard.routes.contains_key(&method) {
                        return Err(SetupError::duplicate_route(method, template));
                    }
                    wildcard.routes.insert(method, target);
                    return Ok(());
                }
            }
        }

        if node.routes.contains_key(&method) {
            return Err(SetupError::duplicate_route(method, template));
        }
        node.routes.insert(method, target);
        Ok(())
    }

    pub(crate) fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let segments: Vec<&str> = match path.strip_prefix('/') {
            Some("") => Vec::new(),
            Some(rest) => rest.split('/').collect(),
            None => return Resolution::NotFound,
        };

        let mut params = Params::new();
        let mut allow = Vec::new();
        match walk(&self.root, &segments, method, &mut params, &mut allow) {
            Some(target) => Resolution::Found { target, params },
            None if !allow.is_empty() => {
                allow.sort_unstable_by(|a: &Method, b: &Method| a.as_str().cmp(b.as_str()));
                allow.dedup();
                Resolution::MethodNotAllowed { allow }
            }
            None => Resolution::NotFound,
        }
    }
}

fn walk<'tree>(
    node: &'tree Node,
    segments: &[&str],
    method: &Method,
    params: &mut Params,
    allow: &mut Vec<Method>,
) -> Option<&'tree RouteTarget> {
    let Some((&head, rest)) = segments.split_first() else {
        if let Some(target) = node.routes.get(method) {
            return Some(target);
        }
        allow.extend(node.routes.keys().cloned());
        return None;
    };

    if let Some(child) = node.literals.get(head) {
        if let Some(target) = walk(child, rest, method, params, allow) {
            return Some(target);
        }
    }

    if let Some(capture) = &node.capture {
        params.push(capture.name.as_str(), head);
        if let Some(target) = walk(&capture.node, rest, method, params, allow) {
            return Some(target);
        }
        params.pop();
    }

    if let Some(wildcard) = &node.wildcard {
        // The wildcard consumes everything that is left, slashes included.
        if let Some(target) = wildcard.routes.get(method) {
            params.push(wildcard.name.as_str(), segments.join("/"));
            return Some(target);
        }
        allow.extend(wildcard.routes.keys().cloned());
    }

    None
}
