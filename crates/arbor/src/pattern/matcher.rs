//! Two-phase evaluation of a [`CompiledPattern`] against a concrete path.
//!
//! The structural phase walks components left to right, trying `...`
//! alternatives longest first, and collects the digit strings of deferred
//! dimensions. The verification phase converts each capture to an integer and
//! checks it against its slice. Only the first structural match is verified.

use super::compile::{CompiledPattern, ComponentMatcher, DimMatcher};
use super::parse::SliceSpec;

impl CompiledPattern {
    /// `true` if the whole of `path` matches this pattern.
    ///
    /// Leading and trailing `/` in `path` are ignored.
    pub fn is_match(&self, path: &str) -> bool {
        let components = split_path(path);
        self.matches_components(&components)
    }

    /// Match pre-split path components.
    pub fn matches_components<S: AsRef<str>>(&self, components: &[S]) -> bool {
        let components: Vec<&str> = components.iter().map(AsRef::as_ref).collect();
        match self.structural_captures(&components) {
            Some(captures) => self.verify(&captures),
            None => false,
        }
    }

    /// Run the structural phase only, returning the deferred captures of the
    /// first structural match.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let components = split_path(path);
        self.structural_captures(&components)
    }

    fn structural_captures<'p>(&self, components: &[&'p str]) -> Option<Vec<&'p str>> {
        let mut captures = vec![""; self.deferred.len()];
        if match_from(&self.components, components, &mut captures) {
            Some(captures)
        } else {
            None
        }
    }

    fn verify(&self, captures: &[&str]) -> bool {
        self.deferred
            .iter()
            .zip(captures)
            .all(|(slice, digits)| verify_deferred(slice, digits))
    }
}

fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

fn match_from<'p>(
    pattern: &[ComponentMatcher],
    components: &[&'p str],
    captures: &mut [&'p str],
) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return components.is_empty();
    };

    match head {
        ComponentMatcher::Ellipsis => {
            // Every later component needs at least one path component.
            let reserved = rest.len();
            if components.len() < reserved + 1 {
                return false;
            }
            let longest = components.len() - reserved;
            (1..=longest)
                .rev()
                .any(|take| match_from(rest, &components[take..], captures))
        }
        other => match components.split_first() {
            Some((component, tail)) => {
                match_component(other, *component, captures)
                    && match_from(rest, tail, captures)
            }
            None => false,
        },
    }
}

fn match_component<'p>(
    matcher: &ComponentMatcher,
    component: &'p str,
    captures: &mut [&'p str],
) -> bool {
    match matcher {
        ComponentMatcher::Name(name) => component == name,
        ComponentMatcher::Wildcard => !component.is_empty(),
        ComponentMatcher::Ellipsis => !component.is_empty(),
        ComponentMatcher::Indexed { name, dims } => {
            let Some(suffix) = component
                .strip_prefix(name.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
            else {
                return false;
            };
            let groups: Vec<&'p str> = suffix.split('.').collect();
            if groups.len() != dims.len() {
                return false;
            }
            groups
                .iter()
                .zip(dims)
                .all(|(digits, dim)| match_dim(dim, *digits, captures))
        }
    }
}

fn match_dim<'p>(dim: &DimMatcher, digits: &'p str, captures: &mut [&'p str]) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match dim {
        DimMatcher::Any => true,
        DimMatcher::Exact(text) => digits == text,
        DimMatcher::OneOf(texts) => texts.iter().any(|text| text == digits),
        DimMatcher::Bounded(slice) => {
            is_canonical(digits) && digits.parse().is_ok_and(|index| slice.contains(index))
        }
        DimMatcher::Deferred(slot) => match captures.get_mut(*slot) {
            Some(capture) => {
                *capture = digits;
                true
            }
            None => false,
        },
    }
}

fn is_canonical(digits: &str) -> bool {
    digits == "0" || !digits.starts_with('0')
}

fn verify_deferred(slice: &SliceSpec, digits: &str) -> bool {
    let Ok(index) = digits.parse::<u64>() else {
        return false;
    };
    let start = slice.first();
    index >= start && (index - start) % slice.step == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> CompiledPattern {
        CompiledPattern::compile(pattern).unwrap()
    }

    #[test]
    fn test_open_slice_is_verified_after_match() {
        let pattern = compile("run[0]/sweep[:]/channel[1:]/trace[:]");
        assert!(!pattern.is_match("run.0/sweep.1/channel.0/trace.2"));
        assert!(pattern.is_match("run.0/sweep.1/channel.1/trace.2"));
        assert!(pattern.is_match("/run.0/sweep.1/channel.7/trace.2/"));
    }

    #[test]
    fn test_ellipsis_around_slice() {
        let pattern = compile(".../channel[1:]/...");
        assert!(pattern.is_match("run.0/sweep.1/channel.1/trace.2/ydata"));
        assert!(!pattern.is_match("run.0/sweep.1/channel.0/trace.2/ydata"));
        // `...` needs at least one component on each side.
        assert!(!pattern.is_match("channel.1/trace.2"));
        assert!(!pattern.is_match("run.0/channel.1"));
    }

    #[test]
    fn test_first_structural_match_is_the_one_verified() {
        // Longest-first puts channel.0 under the slice even though channel.5
        // would satisfy it.
        let pattern = compile(".../channel[1:]/...");
        assert_eq!(
            pattern.captures("a/channel.5/x/channel.0/y"),
            Some(vec!["0"])
        );
        assert!(!pattern.is_match("a/channel.5/x/channel.0/y"));
    }

    #[test]
    fn test_full_match_only() {
        let pattern = compile("run[0]/sweep[1]");
        assert!(pattern.is_match("run.0/sweep.1"));
        assert!(!pattern.is_match("run.0"));
        assert!(!pattern.is_match("run.0/sweep.1/channel.0"));
        assert!(!pattern.is_match("x/run.0/sweep.1"));
    }

    #[test]
    fn test_canonical_text_comparison() {
        let exact = compile("channel[1]");
        assert!(exact.is_match("channel.1"));
        assert!(!exact.is_match("channel.01"));

        let bounded = compile("channel[0:3]");
        assert!(bounded.is_match("channel.2"));
        assert!(!bounded.is_match("channel.02"));
        assert!(!bounded.is_match("channel.3"));

        let any = compile("channel[:]");
        assert!(any.is_match("channel.01"));
        assert!(!any.is_match("channel."));
        assert!(!any.is_match("channel.x"));
        assert!(!any.is_match("channel"));

        let deferred = compile("channel[1:]");
        assert!(deferred.is_match("channel.01"));
    }

    #[test]
    fn test_bare_name_does_not_match_indexed_component() {
        let pattern = compile("channel");
        assert!(pattern.is_match("channel"));
        assert!(!pattern.is_match("channel.0"));
    }

    #[test]
    fn test_dimension_count_must_agree() {
        let pattern = compile("grid[:,1]");
        assert!(pattern.is_match("grid.4.1"));
        assert!(!pattern.is_match("grid.4"));
        assert!(!pattern.is_match("grid.4.1.0"));
        assert!(!pattern.is_match("grid.4.2"));
    }

    #[test]
    fn test_step_verification() {
        let pattern = compile("trace[2::3]");
        let accepted: Vec<u64> = (0..12)
            .filter(|i| pattern.is_match(&format!("trace.{i}")))
            .collect();
        assert_eq!(accepted, vec![2, 5, 8, 11]);
    }

    #[test]
    fn test_wildcard_and_list() {
        let pattern = compile("*/trace[[0,2]]");
        assert!(pattern.is_match("anything/trace.2"));
        assert!(!pattern.is_match("anything/trace.1"));
        assert!(!pattern.is_match("trace.0"));
    }

    #[test]
    fn test_matches_components() {
        let pattern = compile("run[:]/...");
        assert!(pattern.matches_components(&["run.3", "sweep.0"][..]));
        assert!(!pattern.matches_components(&["run.3"][..]));
    }
}
