use http::Method;
use thiserror::Error;

/// Registration-time failures.
///
/// These surface from [`RouterBuilder::build`](crate::RouterBuilder::build)
/// and are fatal at startup; a built router never produces them while
/// serving. Unmatched paths and method mismatches are not errors, see
/// [`Router::dispatch`](crate::Router::dispatch).
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("path template must start with '/': {template:?}")]
    MissingLeadingSlash { template: String },

    #[error("empty capture name in path template {template:?}")]
    EmptyCaptureName { template: String },

    #[error("'{marker}' may only start a segment, found inside one in {template:?}")]
    MarkerInsideSegment { marker: char, template: String },

    #[error("wildcard segment must be the final segment in {template:?}")]
    WildcardNotTrailing { template: String },

    #[error("capture name {found:?} conflicts with {existing:?} registered at the same position in {template:?}")]
    CaptureNameConflict { existing: String, found: String, template: String },

    #[error("duplicate route registration for {method} {template:?}")]
    DuplicateRoute { method: Method, template: String },
}

impl SetupError {
    pub(crate) fn missing_leading_slash(template: impl Into<String>) -> Self {
        Self::MissingLeadingSlash { template: template.into() }
    }

    pub(crate) fn empty_capture_name(template: impl Into<String>) -> Self {
        Self::EmptyCaptureName { template: template.into() }
    }

    pub(crate) fn marker_inside_segment(marker: char, template: impl Into<String>) -> Self {
        Self::MarkerInsideSegment { marker, template: template.into() }
    }

    pub(crate) fn wildcard_not_trailing(template: impl Into<String>) -> Self {
        Self::WildcardNotTrailing { template: template.into() }
    }

    pub(crate) fn capture_name_conflict(
        existing: impl Into<String>,
        found: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self::CaptureNameConflict { existing: existing.into(), found: found.into(), template: template.into() }
    }

    pub(crate) fn duplicate_route(method: Method, template: impl Into<String>) -> Self {
        Self::DuplicateRoute { method, template: template.into() }
    }
}
