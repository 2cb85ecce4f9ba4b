//! Sibling-unique key generation.

/// Returns `key` if no entry of `taken` equals it, otherwise the first free
/// name among `key_1`, `key_2`, ... A numeral already ending `key` is kept
/// and a new suffix appended.
///
/// ```
/// use arbor::model::unique_key;
///
/// assert_eq!(unique_key("a", &["b"]), "a");
/// assert_eq!(unique_key("a", &["a", "a_1", "a_3"]), "a_2");
/// ```
pub fn unique_key<S: AsRef<str>>(key: &str, taken: &[S]) -> String {
    let is_taken = |candidate: &str| taken.iter().any(|t| t.as_ref() == candidate);
    if !is_taken(key) {
        return key.to_string();
    }

    let mut suffix = 1usize;
    let mut candidate = format!("{key}_{suffix}");
    while is_taken(&candidate) {
        suffix += 1;
        candidate = format!("{key}_{suffix}");
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_key_is_kept() {
        assert_eq!(unique_key::<&str>("trace", &[]), "trace");
        assert_eq!(unique_key("trace", &["trace_1"]), "trace");
    }

    #[test]
    fn test_fills_first_gap() {
        assert_eq!(unique_key("a", &["a", "a_1", "a_3"]), "a_2");
        assert_eq!(unique_key("a", &["a", "a_1", "a_2"]), "a_3");
        assert_eq!(unique_key("a", &["a"]), "a_1");
    }

    #[test]
    fn test_key_with_underscore() {
        assert_eq!(unique_key("new_group", &["new_group"]), "new_group_1");
        assert_eq!(
            unique_key("new_group", &["new_group", "new_group_1"]),
            "new_group_2"
        );
        assert_eq!(unique_key("trace_7", &["trace_7", "trace_8"]), "trace_7_1");
    }
}
