//! URL segmentation and validation.
//!
//! A URL is `host.labels/path/parts`. Everything before the first `/` is the
//! host, split on `.`; everything after it is the path, split on `/`.

use super::UrlTreeError;

/// Segment that matches any remaining suffix.
pub const WILDCARD: &str = "*";

/// One host label or path part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub value: &'a str,
    pub is_part_of_host: bool,
}

impl<'a> Segment<'a> {
    pub fn host(value: &'a str) -> Self {
        Self {
            value,
            is_part_of_host: true,
        }
    }

    pub fn path(value: &'a str) -> Self {
        Self {
            value,
            is_part_of_host: false,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }

    /// Name of a `{name}` segment.
    pub fn path_parameter(&self) -> Option<&'a str> {
        try_extract_path_parameter(self.value)
    }
}

/// Split a URL into host segments followed by path segments.
///
/// Never fails; empty parts are kept so that [`validate_url`] can reject them.
/// An empty path and a single trailing `/` produce no extra segment.
pub fn split_url(url: &str) -> Vec<Segment<'_>> {
    let (host, path) = url.split_once('/').unwrap_or((url, ""));
    let path = path.strip_suffix('/').unwrap_or(path);

    let mut segments: Vec<Segment<'_>> = host.split('.').map(Segment::host).collect();
    if !path.is_empty() {
        segments.extend(path.split('/').map(Segment::path));
    }
    segments
}

/// Returns the parameter name if `segment` is written as `{name}`.
pub fn try_extract_path_parameter(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// Reject URLs that cannot be declared in the tree.
pub fn validate_url(url: &str) -> Result<(), UrlTreeError> {
    let segments = split_url(url);
    let last = segments.len().saturating_sub(1);

    for (index, segment) in segments.iter().enumerate() {
        if segment.value.is_empty() {
            return Err(UrlTreeError::EmptySegment {
                url: url.to_string(),
            });
        }
        if segment.is_wildcard() && index != last {
            return Err(UrlTreeError::MisplacedWildcard {
                url: url.to_string(),
            });
        }
        if segment.path_parameter() == Some("") {
            return Err(UrlTreeError::EmptyParameterName {
                url: url.to_string(),
            });
        }
    }
    Ok(())
}
