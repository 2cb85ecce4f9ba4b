//! Compilation of parsed segments into a matchable pattern.

use std::fmt;
use std::str::FromStr;

use arbor_core::logging::targets;

use super::parse::{IndexTerm, PathSegment, SegmentKind, SliceSpec, parse_path};
use crate::error::{PatternError, PatternResult};

/// Constraint on one digit group of an indexed component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DimMatcher {
    /// Any digit string.
    Any,
    /// Canonical decimal text of one index.
    Exact(String),
    /// Canonical decimal text of any listed index.
    OneOf(Vec<String>),
    /// Canonical decimal text of an index within a bounded slice.
    Bounded(SliceSpec),
    /// Any digit string, captured into the given deferred slot.
    Deferred(usize),
}

impl DimMatcher {
    fn from_term(term: &IndexTerm, deferred: &mut Vec<SliceSpec>) -> Self {
        match term {
            IndexTerm::Exact(n) => DimMatcher::Exact(n.to_string()),
            IndexTerm::List(items) => {
                DimMatcher::OneOf(items.iter().map(ToString::to_string).collect())
            }
            IndexTerm::Slice(slice) if *slice == SliceSpec::FULL => DimMatcher::Any,
            IndexTerm::Slice(slice) if slice.stop.is_some() => DimMatcher::Bounded(*slice),
            IndexTerm::Slice(slice) => {
                deferred.push(*slice);
                DimMatcher::Deferred(deferred.len() - 1)
            }
        }
    }
}

/// Matcher for one path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ComponentMatcher {
    /// Exactly this name.
    Name(String),
    /// `name.i0.i1...` with one digit group per dimension.
    Indexed { name: String, dims: Vec<DimMatcher> },
    /// Exactly one arbitrary component.
    Wildcard,
    /// One or more arbitrary components.
    Ellipsis,
}

/// A path pattern ready to be matched against hierarchy paths.
///
/// Slices with no upper bound cannot be enumerated, so they are captured
/// during the structural match and checked afterwards. The
/// [`deferred_checks`](Self::deferred_checks) are in left-to-right order
/// and correspond one to one with those captures.
///
/// ```
/// use arbor::pattern::CompiledPattern;
///
/// let pattern: CompiledPattern = "run[0]/sweep[:]/channel[1:]".parse().unwrap();
/// assert!(pattern.is_match("run.0/sweep.3/channel.1"));
/// assert!(!pattern.is_match("run.0/sweep.3/channel.0"));
/// assert_eq!(pattern.deferred_checks().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    pub(crate) segments: Vec<PathSegment>,
    pub(crate) components: Vec<ComponentMatcher>,
    pub(crate) deferred: Vec<SliceSpec>,
}

impl CompiledPattern {
    /// Parse and compile a pattern string.
    pub fn compile(pattern: &str) -> PatternResult<Self> {
        let segments = parse_path(pattern)?;
        let compiled = Self::from_segments(segments);
        tracing::debug!(
            target: targets::PATTERN,
            pattern,
            components = compiled.components.len(),
            deferred = compiled.deferred.len(),
            "compiled path pattern"
        );
        Ok(compiled)
    }

    /// Compile already-parsed segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        let mut deferred = Vec::new();
        let components = segments
            .iter()
            .map(|segment| match &segment.kind {
                SegmentKind::Ellipsis => ComponentMatcher::Ellipsis,
                SegmentKind::Wildcard => ComponentMatcher::Wildcard,
                SegmentKind::Literal(name) if segment.indices.is_empty() => {
                    ComponentMatcher::Name(name.clone())
                }
                SegmentKind::Literal(name) => ComponentMatcher::Indexed {
                    name: name.clone(),
                    dims: segment
                        .indices
                        .iter()
                        .map(|term| DimMatcher::from_term(term, &mut deferred))
                        .collect(),
                },
            })
            .collect();

        Self {
            segments,
            components,
            deferred,
        }
    }

    /// The parsed segments this pattern was compiled from.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Slices verified after the structural match, one per capture.
    pub fn deferred_checks(&self) -> &[SliceSpec] {
        &self.deferred
    }

    /// `true` if the last segment is `...`.
    pub fn ends_with_ellipsis(&self) -> bool {
        self.segments.last().is_some_and(PathSegment::is_ellipsis)
    }

    /// Concatenate `other` after this pattern.
    ///
    /// Deferred checks keep their left-to-right order across both halves.
    pub fn then(&self, other: &CompiledPattern) -> CompiledPattern {
        let offset = self.deferred.len();
        let shifted = other.components.iter().map(|component| match component {
            ComponentMatcher::Indexed { name, dims } => ComponentMatcher::Indexed {
                name: name.clone(),
                dims: dims
                    .iter()
                    .map(|dim| match dim {
                        DimMatcher::Deferred(slot) => DimMatcher::Deferred(slot + offset),
                        other => other.clone(),
                    })
                    .collect(),
            },
            other => other.clone(),
        });

        CompiledPattern {
            segments: self.segments.iter().chain(&other.segments).cloned().collect(),
            components: self.components.iter().cloned().chain(shifted).collect(),
            deferred: self.deferred.iter().chain(&other.deferred).copied().collect(),
        }
    }
}

impl FromStr for CompiledPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            segment.fmt(f)?;
        }
        Ok(())
    }
}
