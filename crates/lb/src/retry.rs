// Retry continuation: walk the endpoint list in order, starting after the last choice.

#[derive(Debug, Default, Clone, Copy)]
pub struct RetryCursor;

impl RetryCursor {
    pub fn new() -> Self {
        Self
    }

    /// Index following `previous` in `endpoints`, wrapping around.
    ///
    /// When `previous` is missing or not part of the list the cursor starts at
    /// the head of the sequence. With duplicated identifiers the last matching
    /// position wins.
    pub fn next<S: AsRef<str>>(&self, endpoints: &[S], previous: Option<&str>) -> Option<usize> {
        if endpoints.is_empty() {
            return None;
        }

        let position = previous.and_then(|previous| {
            endpoints
                .iter()
                .rposition(|endpoint| endpoint.as_ref() == previous)
        });

        match position {
            Some(position) => Some((position + 1) % endpoints.len()),
            None => Some(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_endpoints() {
        let cursor = RetryCursor::new();
        let endpoints = ["s0", "s1", "s2"];
        assert_eq!(cursor.next(&endpoints, Some("s0")), Some(1));
        assert_eq!(cursor.next(&endpoints, Some("s1")), Some(2));
        assert_eq!(cursor.next(&endpoints, Some("s2")), Some(0));
    }

    #[test]
    fn unknown_previous_starts_at_head() {
        let cursor = RetryCursor::new();
        let endpoints = ["s0", "s1", "s2"];
        assert_eq!(cursor.next(&endpoints, Some("nope")), Some(0));
        assert_eq!(cursor.next(&endpoints, None), Some(0));
    }

    #[test]
    fn duplicates_continue_after_last_match() {
        let cursor = RetryCursor::new();
        let endpoints = ["a", "b", "a", "c"];
        assert_eq!(cursor.next(&endpoints, Some("a")), Some(3));
    }

    #[test]
    fn empty_list_has_no_next() {
        let cursor = RetryCursor::new();
        let endpoints: [&str; 0] = [];
        assert_eq!(cursor.next(&endpoints, Some("a")), None);
    }
}
