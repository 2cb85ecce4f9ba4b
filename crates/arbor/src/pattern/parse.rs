//! Tokenizer for path patterns.
//!
//! A pattern is a `/`-separated list of segments. Each segment is `...`, `*`,
//! a bare name, or `name[indexexpr]` where `indexexpr` holds one term per
//! array dimension:
//!
//! ```text
//! run[0]/sweep[:]/channel[1:]/trace[[0,2,5]]
//! .../channel[0:4:2]/...
//! ```

use std::fmt;

use crate::error::{PatternError, PatternResult};

/// A half-open `start:stop:step` slice over non-negative indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceSpec {
    /// First index (none means 0).
    pub start: Option<u64>,
    /// Exclusive upper bound (none means unbounded).
    pub stop: Option<u64>,
    /// Stride, always positive.
    pub step: u64,
}

impl SliceSpec {
    /// The full slice `:`.
    pub const FULL: SliceSpec = SliceSpec {
        start: None,
        stop: None,
        step: 1,
    };

    /// The effective start index.
    pub fn first(&self) -> u64 {
        self.start.unwrap_or(0)
    }

    /// `true` if every index is in the slice.
    pub fn is_full(&self) -> bool {
        self.first() == 0 && self.stop.is_none() && self.step == 1
    }

    /// `true` if `index` is selected by this slice.
    pub fn contains(&self, index: u64) -> bool {
        let start = self.first();
        if index < start {
            return false;
        }
        if let Some(stop) = self.stop
            && index >= stop
        {
            return false;
        }
        (index - start) % self.step == 0
    }
}

impl fmt::Display for SliceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str(":")?;
        if let Some(stop) = self.stop {
            write!(f, "{stop}")?;
        }
        if self.step != 1 {
            write!(f, ":{}", self.step)?;
        }
        Ok(())
    }
}

/// One dimension of an index expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexTerm {
    /// A single index: `3`.
    Exact(u64),
    /// An explicit list: `[0,2,5]`.
    List(Vec<u64>),
    /// A slice: `1:`, `:10:2`, `:`.
    Slice(SliceSpec),
}

impl fmt::Display for IndexTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexTerm::Exact(n) => write!(f, "{n}"),
            IndexTerm::List(items) => {
                f.write_str("[")?;
                for (i, n) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{n}")?;
                }
                f.write_str("]")
            }
            IndexTerm::Slice(slice) => slice.fmt(f),
        }
    }
}

/// What a segment matches, ignoring indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// A literal component name.
    Literal(String),
    /// `*`: exactly one component.
    Wildcard,
    /// `...`: one or more components.
    Ellipsis,
}

/// A parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// The segment kind.
    pub kind: SegmentKind,
    /// Per-dimension index terms; always empty for wildcards.
    pub indices: Vec<IndexTerm>,
}

impl PathSegment {
    /// A bare literal segment.
    pub fn literal(name: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Literal(name.into()),
            indices: Vec::new(),
        }
    }

    /// An indexed literal segment.
    pub fn indexed(name: impl Into<String>, indices: Vec<IndexTerm>) -> Self {
        Self {
            kind: SegmentKind::Literal(name.into()),
            indices,
        }
    }

    /// The `*` segment.
    pub fn wildcard() -> Self {
        Self {
            kind: SegmentKind::Wildcard,
            indices: Vec::new(),
        }
    }

    /// The `...` segment.
    pub fn ellipsis() -> Self {
        Self {
            kind: SegmentKind::Ellipsis,
            indices: Vec::new(),
        }
    }

    /// `true` for the `...` segment.
    pub fn is_ellipsis(&self) -> bool {
        self.kind == SegmentKind::Ellipsis
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SegmentKind::Wildcard => f.write_str("*"),
            SegmentKind::Ellipsis => f.write_str("..."),
            SegmentKind::Literal(name) => {
                f.write_str(name)?;
                if !self.indices.is_empty() {
                    f.write_str("[")?;
                    for (i, term) in self.indices.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        term.fmt(f)?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
        }
    }
}

/// Parse a path pattern into its segments.
///
/// Leading and trailing `/` are ignored and every segment is trimmed.
///
/// # Errors
///
/// Returns a [`PatternError`] for empty patterns or segments, unbalanced
/// brackets, non-integer or negative indices, malformed slices and indexed
/// wildcards.
pub fn parse_path(pattern: &str) -> PatternResult<Vec<PathSegment>> {
    let trimmed = pattern.trim().trim_matches('/');
    if trimmed.trim().is_empty() {
        return Err(PatternError::EmptyPattern);
    }

    trimmed
        .split('/')
        .map(|raw| {
            let segment = raw.trim();
            if segment.is_empty() {
                return Err(PatternError::EmptySegment {
                    pattern: pattern.to_string(),
                });
            }
            parse_segment(segment)
        })
        .collect()
}

fn parse_segment(segment: &str) -> PatternResult<PathSegment> {
    match segment {
        "..." => return Ok(PathSegment::ellipsis()),
        "*" => return Ok(PathSegment::wildcard()),
        _ => {}
    }

    let Some(open) = segment.find('[') else {
        if segment.contains(']') {
            return Err(PatternError::unbalanced(segment));
        }
        return Ok(PathSegment::literal(segment));
    };

    let name = segment[..open].trim();
    if name.is_empty() {
        return Err(PatternError::MissingName {
            segment: segment.to_string(),
        });
    }
    if name == "*" || name == "..." {
        return Err(PatternError::IndexedWildcard {
            segment: segment.to_string(),
        });
    }
    if name.contains(']') || !segment.ends_with(']') {
        return Err(PatternError::unbalanced(segment));
    }

    let inner = &segment[open + 1..segment.len() - 1];
    let indices = split_terms(inner)
        .ok_or_else(|| PatternError::unbalanced(segment))?
        .into_iter()
        .map(|term| parse_term(segment, term))
        .collect::<PatternResult<Vec<_>>>()?;

    Ok(PathSegment::indexed(name, indices))
}

/// Split on commas that are not nested inside `[...]`.
///
/// Returns `None` when brackets do not balance.
fn split_terms(expr: &str) -> Option<Vec<&str>> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                terms.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    terms.push(&expr[start..]);
    Some(terms)
}

fn parse_term(segment: &str, raw: &str) -> PatternResult<IndexTerm> {
    let term = raw.trim();
    if term.is_empty() {
        return Err(PatternError::EmptyTerm {
            segment: segment.to_string(),
        });
    }

    if let Some(rest) = term.strip_prefix('[') {
        let Some(body) = rest.strip_suffix(']') else {
            return Err(PatternError::unbalanced(segment));
        };
        if body.trim().is_empty() {
            return Err(PatternError::EmptyTerm {
                segment: segment.to_string(),
            });
        }
        let items = body
            .split(',')
            .map(|item| parse_index(term, item.trim()))
            .collect::<PatternResult<Vec<_>>>()?;
        return Ok(IndexTerm::List(items));
    }

    if term.contains(':') {
        let parts: Vec<&str> = term.split(':').map(str::trim).collect();
        if parts.len() > 3 {
            return Err(PatternError::TooManySliceParts {
                term: term.to_string(),
            });
        }
        let optional = |part: Option<&&str>| -> PatternResult<Option<u64>> {
            match part {
                Some(text) if !text.is_empty() => parse_index(term, text).map(Some),
                _ => Ok(None),
            }
        };
        let start = optional(parts.first())?;
        let stop = optional(parts.get(1))?;
        let step = optional(parts.get(2))?.unwrap_or(1);
        if step == 0 {
            return Err(PatternError::InvalidStep {
                term: term.to_string(),
            });
        }
        return Ok(IndexTerm::Slice(SliceSpec { start, stop, step }));
    }

    parse_index(term, term).map(IndexTerm::Exact)
}

fn parse_index(term: &str, text: &str) -> PatternResult<u64> {
    if let Some(magnitude) = text.strip_prefix('-')
        && !magnitude.is_empty()
        && magnitude.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(PatternError::NegativeIndex {
            term: term.to_string(),
            text: text.to_string(),
        });
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PatternError::invalid_integer(term, text));
    }
    text.parse()
        .map_err(|_| PatternError::invalid_integer(term, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_segments() {
        let segments = parse_path("/run/.../*/").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::literal("run"),
                PathSegment::ellipsis(),
                PathSegment::wildcard(),
            ]
        );
    }

    #[test]
    fn test_parse_index_terms() {
        let segments = parse_path("run[0]/sweep[:]/channel[ 1: ]/trace[[0, 2,5]]").unwrap();
        assert_eq!(segments[0], PathSegment::indexed("run", vec![IndexTerm::Exact(0)]));
        assert_eq!(
            segments[1],
            PathSegment::indexed("sweep", vec![IndexTerm::Slice(SliceSpec::FULL)])
        );
        assert_eq!(
            segments[2],
            PathSegment::indexed(
                "channel",
                vec![IndexTerm::Slice(SliceSpec {
                    start: Some(1),
                    stop: None,
                    step: 1
                })]
            )
        );
        assert_eq!(
            segments[3],
            PathSegment::indexed("trace", vec![IndexTerm::List(vec![0, 2, 5])])
        );
    }

    #[test]
    fn test_parse_multi_dimensional() {
        let segments = parse_path("grid[[1,2],::2,7]").unwrap();
        assert_eq!(
            segments[0].indices,
            vec![
                IndexTerm::List(vec![1, 2]),
                IndexTerm::Slice(SliceSpec {
                    start: None,
                    stop: None,
                    step: 2
                }),
                IndexTerm::Exact(7),
            ]
        );
    }

    #[test]
    fn test_trims_whitespace() {
        let segments = parse_path("  run [ 0 ] / sweep ").unwrap();
        assert_eq!(segments[0], PathSegment::indexed("run", vec![IndexTerm::Exact(0)]));
        assert_eq!(segments[1], PathSegment::literal("sweep"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_path(""), Err(PatternError::EmptyPattern));
        assert_eq!(parse_path("///"), Err(PatternError::EmptyPattern));
        assert!(matches!(
            parse_path("run//sweep"),
            Err(PatternError::EmptySegment { .. })
        ));
        assert!(matches!(
            parse_path("run[0"),
            Err(PatternError::UnbalancedBracket { .. })
        ));
        assert!(matches!(
            parse_path("run[[0,1]"),
            Err(PatternError::UnbalancedBracket { .. })
        ));
        assert!(matches!(
            parse_path("run]"),
            Err(PatternError::UnbalancedBracket { .. })
        ));
        assert!(matches!(
            parse_path("[0]"),
            Err(PatternError::MissingName { .. })
        ));
        assert!(matches!(
            parse_path("*[0]"),
            Err(PatternError::IndexedWildcard { .. })
        ));
        assert!(matches!(
            parse_path("...[1:]"),
            Err(PatternError::IndexedWildcard { .. })
        ));
        assert!(matches!(
            parse_path("run[]"),
            Err(PatternError::EmptyTerm { .. })
        ));
        assert!(matches!(
            parse_path("run[0,]"),
            Err(PatternError::EmptyTerm { .. })
        ));
        assert!(matches!(
            parse_path("run[[]]"),
            Err(PatternError::EmptyTerm { .. })
        ));
        assert!(matches!(
            parse_path("run[a]"),
            Err(PatternError::InvalidInteger { .. })
        ));
        assert!(matches!(
            parse_path("run[[1,x]]"),
            Err(PatternError::InvalidInteger { .. })
        ));
        assert!(matches!(
            parse_path("run[1:b]"),
            Err(PatternError::InvalidInteger { .. })
        ));
        assert!(matches!(
            parse_path("run[-1]"),
            Err(PatternError::NegativeIndex { .. })
        ));
        assert!(matches!(
            parse_path("run[::-1]"),
            Err(PatternError::NegativeIndex { .. })
        ));
        assert!(matches!(
            parse_path("run[1:2:3:4]"),
            Err(PatternError::TooManySliceParts { .. })
        ));
        assert!(matches!(
            parse_path("run[::0]"),
            Err(PatternError::InvalidStep { .. })
        ));
    }

    #[test]
    fn test_segment_display() {
        let segments = parse_path("run[0]/sweep[:]/ch[1:10:2]/t[[1,2]]/.../*").unwrap();
        let rendered: Vec<String> = segments.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["run[0]", "sweep[:]", "ch[1:10:2]", "t[[1,2]]", "...", "*"]
        );
    }

    #[test]
    fn test_slice_contains() {
        let slice = SliceSpec {
            start: Some(2),
            stop: Some(9),
            step: 3,
        };
        let selected: Vec<u64> = (0..12).filter(|&i| slice.contains(i)).collect();
        assert_eq!(selected, vec![2, 5, 8]);
        assert!(SliceSpec::FULL.is_full());
        assert!(
            SliceSpec {
                start: Some(0),
                stop: None,
                step: 1
            }
            .is_full()
        );
    }
}
