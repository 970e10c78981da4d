//! Sequential, prefixed record identifiers (e.g. "P-01", "CH-12")
//!
//! Identifiers are allocated by looking at the ids currently present in a
//! collection: the next id is one past the highest numeric suffix carrying the
//! same prefix. Nothing is persisted besides the ids themselves, so the highest
//! id freed by a delete may be handed out again.

/// Minimum width of the numeric suffix; larger numbers simply grow past it
pub const ID_PAD_WIDTH: usize = 2;

/// Parses the numeric suffix of `id` if it carries `prefix`.
///
/// Returns `None` when the id belongs to another prefix. A suffix without
/// leading digits parses as 0, so "P-abc" still counts as a "P" id.
pub fn parse_suffix(prefix: &str, id: &str) -> Option<u64> {
    let rest = id.strip_prefix(prefix)?.strip_prefix('-')?;
    let digits: &str = match rest.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(digits.parse::<u64>().unwrap_or(0))
}

/// Returns the numeric part of any `<PREFIX>-<NN>` id, used for ordering
pub fn numeric_part(id: &str) -> u64 {
    id.split_once('-')
        .and_then(|(prefix, _)| parse_suffix(prefix, id))
        .unwrap_or(0)
}

/// Formats an identifier from a prefix and number
pub fn format_id(prefix: &str, number: u64) -> String {
    format!("{}-{:0width$}", prefix, number, width = ID_PAD_WIDTH)
}

/// Allocates the next identifier for `prefix` given the ids already in use.
///
/// Total over any input: ids of other prefixes are ignored and malformed
/// suffixes count as 0.
pub fn allocate<I, S>(prefix: &str, existing_ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max = existing_ids
        .into_iter()
        .filter_map(|id| parse_suffix(prefix, id.as_ref()))
        .max()
        .unwrap_or(0);

    format_id(prefix, max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_allocate_empty() {
        assert_eq!(allocate("P", Vec::<String>::new()), "P-01");
    }

    #[test]
    fn test_allocate_sequential() {
        assert_eq!(allocate("P", ids(&["P-01", "P-02"])), "P-03");
    }

    #[test]
    fn test_allocate_overflows_padding() {
        assert_eq!(allocate("P", ids(&["P-01", "P-99"])), "P-100");
        assert_eq!(allocate("LOG", ids(&["LOG-100", "LOG-07"])), "LOG-101");
    }

    #[test]
    fn test_allocate_ignores_other_prefixes() {
        assert_eq!(allocate("P", ids(&["P-01", "X-05"])), "P-02");
    }

    #[test]
    fn test_allocate_malformed_suffix_counts_as_zero() {
        assert_eq!(allocate("P", ids(&["P-abc"])), "P-01");
        assert_eq!(allocate("P", ids(&["P-abc", "P-04"])), "P-05");
    }

    #[test]
    fn test_allocate_prefix_must_be_followed_by_dash() {
        // "CH-07" is a charge id, not a case id
        assert_eq!(allocate("C", ids(&["CH-07", "C-02"])), "C-03");
        assert_eq!(allocate("CH", ids(&["C-09"])), "CH-01");
    }

    #[test]
    fn test_allocate_tolerates_gaps_and_duplicates() {
        assert_eq!(allocate("G", ids(&["G-03", "G-03", "G-10", "G-01"])), "G-11");
    }

    #[test]
    fn test_allocate_reuses_freed_highest_id() {
        let mut existing = ids(&["V-01", "V-02", "V-03"]);
        existing.retain(|id| id != "V-03");
        assert_eq!(allocate("V", existing), "V-03");
    }

    #[test]
    fn test_allocated_id_is_fresh() {
        let existing = ids(&["M-01", "M-05", "M-abc", "D-07"]);
        let next = allocate("M", existing.iter());
        assert!(!existing.contains(&next));
        assert_eq!(next, "M-06");
    }

    #[test]
    fn test_parse_suffix_leading_digits() {
        assert_eq!(parse_suffix("P", "P-12x"), Some(12));
        assert_eq!(parse_suffix("P", "P-"), Some(0));
        assert_eq!(parse_suffix("P", "PX-1"), None);
        assert_eq!(parse_suffix("P", "Q-1"), None);
    }

    #[test]
    fn test_numeric_part() {
        assert_eq!(numeric_part("LOG-42"), 42);
        assert_eq!(numeric_part("nodash"), 0);
    }
}
