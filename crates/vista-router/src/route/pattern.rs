/// Typed route pattern segments
///
/// Parsing is pure: the same pattern string always yields the same segments.
use std::fmt;

use crate::error::LinkError;
use crate::path::clean;

/// Kind of a single route pattern segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal path component, emitted verbatim
    Static,
    /// `:name`, consumes exactly one argument
    Placeholder,
    /// `*name`, consumes every remaining argument
    Wildcard,
}

/// One component of a route pattern, with its sigil stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub kind: SegmentKind,
}

/// Classifies a raw pattern component by its leading sigil
///
/// # Examples
///
/// ```
/// use vista_router::{classify_segment, SegmentKind};
///
/// assert_eq!(classify_segment("about").kind, SegmentKind::Static);
/// assert_eq!(classify_segment(":id").name, "id");
/// assert_eq!(classify_segment("*path").kind, SegmentKind::Wildcard);
/// ```
pub fn classify_segment(segment: &str) -> Segment {
    let (kind, name) = match segment.chars().next() {
        Some(':') => (SegmentKind::Placeholder, &segment[1..]),
        Some('*') => (SegmentKind::Wildcard, &segment[1..]),
        _ => (SegmentKind::Static, segment),
    };

    Segment {
        name: name.to_string(),
        kind,
    }
}

/// A parsed route pattern such as `/event/:id` or `/files/*path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Splits on `/`, drops empty components and classifies the rest
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(classify_segment)
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// The pattern exactly as it was registered
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of `:name` segments reachable before any wildcard
    pub fn placeholders(&self) -> usize {
        self.segments
            .iter()
            .take_while(|s| s.kind != SegmentKind::Wildcard)
            .filter(|s| s.kind == SegmentKind::Placeholder)
            .count()
    }

    /// Rejects patterns with segments after a wildcard
    ///
    /// [`build`](Self::build) stops at the wildcard, so anything after it can
    /// never be emitted.
    pub fn validate(&self) -> Result<(), LinkError> {
        let wildcard = self
            .segments
            .iter()
            .position(|s| s.kind == SegmentKind::Wildcard);

        match wildcard {
            Some(pos) if pos + 1 < self.segments.len() => Err(LinkError::UnreachableSegments {
                pattern: self.raw.clone(),
                wildcard: self.segments[pos].name.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Builds a concrete absolute path by substituting arguments in order
    ///
    /// Arguments are percent-encoded. A wildcard takes every remaining
    /// argument and ends the walk; unused arguments are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use vista_router::PathPattern;
    ///
    /// let pattern = PathPattern::parse("/files/*path");
    /// assert_eq!(pattern.build(&["docs", "read me.txt"]).unwrap(), "/files/docs/read%20me.txt");
    ///
    /// let pattern = PathPattern::parse("/event/:id/edit");
    /// assert!(pattern.build::<&str>(&[]).is_err());
    /// ```
    pub fn build<S: AsRef<str>>(&self, args: &[S]) -> Result<String, LinkError> {
        let mut remaining = args.iter();
        let mut parts: Vec<String> = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment.kind {
                SegmentKind::Static => parts.push(segment.name.clone()),
                SegmentKind::Placeholder => {
                    let arg = remaining
                        .next()
                        .ok_or_else(|| LinkError::InsufficientArguments {
                            pattern: self.raw.clone(),
                            given: args.len(),
                        })?;
                    parts.push(urlencoding::encode(arg.as_ref()).into_owned());
                }
                SegmentKind::Wildcard => {
                    parts.extend(remaining.by_ref().map(|arg| urlencoding::encode(arg.as_ref()).into_owned()));
                    break;
                }
            }
        }

        Ok(clean(&format!("/{}", parts.join("/"))))
    }

    /// Recovers the arguments that [`build`](Self::build) substituted into `path`
    ///
    /// Returns `None` when the path does not match the pattern.
    ///
    /// ```
    /// use vista_router::PathPattern;
    ///
    /// let pattern = PathPattern::parse("/event/:id");
    /// assert_eq!(pattern.extract("/event/1234"), Some(vec!["1234".to_string()]));
    /// assert_eq!(pattern.extract("/events/1234"), None);
    /// ```
    pub fn extract(&self, path: &str) -> Option<Vec<String>> {
        let mut path_segments = path.split('/').filter(|s| !s.is_empty());
        let mut args = Vec::new();

        for segment in &self.segments {
            match segment.kind {
                SegmentKind::Static => {
                    if path_segments.next()? != segment.name {
                        return None;
                    }
                }
                SegmentKind::Placeholder => args.push(decode(path_segments.next()?)?),
                SegmentKind::Wildcard => {
                    for rest in path_segments.by_ref() {
                        args.push(decode(rest)?);
                    }
                    break;
                }
            }
        }

        match path_segments.next() {
            Some(_) => None,
            None => Some(args),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}
