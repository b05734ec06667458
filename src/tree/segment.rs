//! Segment classification and path splitting.
//!
//! `{name}` is a parameter, `*name` is a wildcard, anything else is static
//! text. A plain character check, no pattern engine.

use crate::error::RouteError;

/// One classified path segment, borrowed from the registered path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Static(&'a str),
    Param(&'a str),
    Wildcard(&'a str),
}

const SIGILS: [char; 3] = ['{', '}', '*'];

/// Classifies a single segment.
///
/// Only a leading sigil makes a segment dynamic, so `a{b}` is static text.
/// The error is a short reason, wrapped by the caller with the full path.
pub(crate) fn classify(segment: &str) -> Result<Segment<'_>, &'static str> {
    if let Some(inner) = segment.strip_prefix('{') {
        let name = inner.strip_suffix('}').ok_or("unterminated parameter")?;
        if name.is_empty() {
            return Err("empty parameter name");
        }
        if name.contains(SIGILS) {
            return Err("more than one sigil in a segment");
        }
        return Ok(Segment::Param(name));
    }

    if let Some(name) = segment.strip_prefix('*') {
        if name.is_empty() {
            return Err("empty wildcard name");
        }
        if name.contains(SIGILS) {
            return Err("more than one sigil in a segment");
        }
        return Ok(Segment::Wildcard(name));
    }

    Ok(Segment::Static(segment))
}

/// Splits `path` (leading slash already stripped) into its first segment and
/// the remainder. The remainder keeps its leading slash, except that a bare
/// `"/"` collapses to `""`: both mean the path is consumed.
pub(crate) fn split_segment(path: &str) -> (&str, &str) {
    match path.find('/') {
        Some(i) => {
            let rest = &path[i..];
            (&path[..i], if rest == "/" { "" } else { rest })
        }
        None => (path, ""),
    }
}

/// `true` once nothing but an optional trailing slash is left.
pub(crate) fn is_consumed(path: &str) -> bool {
    path.is_empty() || path == "/"
}

/// Classifies every segment of a registration path up front.
///
/// Nothing is inserted until the whole path is known to be well formed.
pub(crate) fn parse(path: &str) -> Result<Vec<Segment<'_>>, RouteError> {
    let malformed = |reason: &str| RouteError::MalformedPath {
        path: path.to_owned(),
        reason: reason.to_owned(),
    };

    let mut segments = Vec::new();
    let mut rest = path;

    while !is_consumed(rest) {
        if matches!(segments.last(), Some(Segment::Wildcard(_))) {
            return Err(malformed("wildcard must be the final segment"));
        }
        let trimmed = rest.strip_prefix('/').unwrap_or(rest);
        let (segment, remainder) = split_segment(trimmed);
        segments.push(classify(segment).map_err(malformed)?);
        rest = remainder;
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_kinds() {
        assert_eq!(classify("users"), Ok(Segment::Static("users")));
        assert_eq!(classify("{id}"), Ok(Segment::Param("id")));
        assert_eq!(classify("*rest"), Ok(Segment::Wildcard("rest")));
        assert_eq!(classify("a{b}"), Ok(Segment::Static("a{b}")));
        assert_eq!(classify(""), Ok(Segment::Static("")));
    }

    #[test]
    fn test_classify_conventions_never_overlap() {
        assert!(!matches!(classify("{id}"), Ok(Segment::Wildcard(_))));
        assert!(!matches!(classify("*id"), Ok(Segment::Param(_))));
    }

    #[test]
    fn test_classify_rejects_bad_sigils() {
        assert!(classify("{}").is_err());
        assert!(classify("*").is_err());
        assert!(classify("{id").is_err());
        assert!(classify("{*rest}").is_err());
        assert!(classify("*{x}").is_err());
        assert!(classify("{a{b}").is_err());
    }

    #[test]
    fn test_split_segment() {
        assert_eq!(split_segment("users"), ("users", ""));
        assert_eq!(split_segment("users/"), ("users", ""));
        assert_eq!(split_segment("users/42"), ("users", "/42"));
        assert_eq!(split_segment("a/b/c"), ("a", "/b/c"));
        assert_eq!(split_segment(""), ("", ""));
    }

    #[test]
    fn test_parse_with_and_without_leading_slash() {
        let expected = vec![Segment::Static("users"), Segment::Param("id")];
        assert_eq!(parse("/users/{id}").unwrap(), expected);
        assert_eq!(parse("users/{id}").unwrap(), expected);
        assert!(parse("/").unwrap().is_empty());
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_segments_after_wildcard() {
        let err = parse("/files/*path/meta").unwrap_err();
        assert!(matches!(err, RouteError::MalformedPath { .. }));
        assert!(parse("/files/*path/").is_ok());
    }
}
