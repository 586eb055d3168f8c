//! Making candidate filenames unique across a whole export.
//!
//! Names that occur once are kept as they are. Names shared by several notes
//! get the note's creation time appended, and notes that still collide after
//! that get a sequence number. Every issued name is checked against every
//! name issued or reserved before it, so the result never contains
//! duplicates, whatever the input looks like.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset};

/// Timestamp suffix format; colons are not allowed in filenames.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/// Occurrence counts of every name across a batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<String, usize>,
}

impl Tally {
    pub fn of<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for name in names {
            *counts.entry(name.to_string()).or_default() += 1;
        }
        Self { counts }
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn is_unique(&self, name: &str) -> bool {
        self.count(name) == 1
    }
}

/// Final, pairwise-unique filenames for `(candidate, created)` pairs, in
/// input order.
pub fn deduplicate(entries: &[(String, DateTime<FixedOffset>)]) -> Vec<String> {
    let tally = Tally::of(entries.iter().map(|(candidate, _)| candidate.as_str()));
    deduplicate_with(entries, &tally)
}

/// Same as [`deduplicate`] with a precomputed candidate [`Tally`].
pub fn deduplicate_with(
    entries: &[(String, DateTime<FixedOffset>)],
    tally: &Tally,
) -> Vec<String> {
    // Unique candidates are never renamed, so they are claimed up front.
    let mut issued: HashSet<String> = entries
        .iter()
        .filter(|(candidate, _)| tally.is_unique(candidate))
        .map(|(candidate, _)| candidate.clone())
        .collect();

    let stamped: Vec<Option<String>> = entries
        .iter()
        .map(|(candidate, created)| {
            (!tally.is_unique(candidate)).then(|| stamp(candidate, created))
        })
        .collect();
    let stamp_tally = Tally::of(stamped.iter().flatten().map(String::as_str));
    let mut ranks: HashMap<&str, usize> = HashMap::new();

    entries
        .iter()
        .zip(&stamped)
        .map(|((candidate, _), stamped)| {
            let Some(stamped) = stamped else {
                return candidate.clone();
            };
            let rank = ranks.entry(stamped.as_str()).or_default();
            *rank += 1;
            let width = digit_count(stamp_tally.count(stamped));
            claim(&mut issued, stamped, *rank, width)
        })
        .collect()
}

fn stamp(candidate: &str, created: &DateTime<FixedOffset>) -> String {
    format!("{} {}", candidate, created.format(TIMESTAMP_FORMAT))
}

/// Issue `base` (rank 1) or `base <rank>`, moving to the next free sequence
/// number when the name is already taken.
fn claim(issued: &mut HashSet<String>, base: &str, rank: usize, width: usize) -> String {
    let mut seq = rank;
    loop {
        let name = if seq == 1 {
            base.to_string()
        } else {
            format!("{} {:0width$}", base, seq, width = width)
        };
        if issued.insert(name.clone()) {
            return name;
        }
        seq += 1;
    }
}

fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn entries(pairs: &[(&str, &str)]) -> Vec<(String, DateTime<FixedOffset>)> {
        pairs
            .iter()
            .map(|(name, time)| (name.to_string(), ts(time)))
            .collect()
    }

    fn assert_unique(names: &[String]) {
        let set: HashSet<&String> = names.iter().collect();
        assert_eq!(set.len(), names.len(), "duplicates in {names:?}");
    }

    #[test]
    fn test_tally_counts() {
        let tally = Tally::of(["a", "b", "a"]);
        assert_eq!(tally.count("a"), 2);
        assert!(tally.is_unique("b"));
        assert_eq!(tally.count("missing"), 0);
    }

    #[test]
    fn test_unique_names_pass_through() {
        let input = entries(&[
            ("Groceries", "2021-01-01T10:00:00Z"),
            ("Ideas", "2021-01-01T10:00:00Z"),
        ]);
        assert_eq!(deduplicate(&input), ["Groceries", "Ideas"]);
    }

    #[test]
    fn test_collision_gets_timestamp() {
        let input = entries(&[
            ("Meeting Notes", "2021-03-04T09:15:00Z"),
            ("Meeting Notes", "2021-03-05T14:30:07Z"),
            ("Groceries", "2021-03-06T08:00:00Z"),
        ]);
        assert_eq!(
            deduplicate(&input),
            [
                "Meeting Notes 2021-03-04 09-15-00",
                "Meeting Notes 2021-03-05 14-30-07",
                "Groceries",
            ]
        );
    }

    #[test]
    fn test_identical_timestamp_gets_sequence_number() {
        let input = entries(&[
            ("Same", "2021-03-04T09:15:00Z"),
            ("Same", "2021-03-04T09:15:00Z"),
        ]);
        assert_eq!(
            deduplicate(&input),
            ["Same 2021-03-04 09-15-00", "Same 2021-03-04 09-15-00 2"]
        );
    }

    #[test]
    fn test_sequence_only_within_same_timestamp() {
        let input = entries(&[
            ("Log", "2021-03-04T09:15:00Z"),
            ("Log", "2021-03-04T09:15:00Z"),
            ("Log", "2021-03-05T09:15:00Z"),
            ("Log", "2021-03-04T09:15:00Z"),
        ]);
        assert_eq!(
            deduplicate(&input),
            [
                "Log 2021-03-04 09-15-00",
                "Log 2021-03-04 09-15-00 2",
                "Log 2021-03-05 09-15-00",
                "Log 2021-03-04 09-15-00 3",
            ]
        );
    }

    #[test]
    fn test_sequence_is_zero_padded_to_group_size() {
        let input: Vec<_> = (0..12)
            .map(|_| ("Daily".to_string(), ts("2022-06-01T07:00:00Z")))
            .collect();
        let out = deduplicate(&input);
        assert_eq!(out[0], "Daily 2022-06-01 07-00-00");
        assert_eq!(out[1], "Daily 2022-06-01 07-00-00 02");
        assert_eq!(out[11], "Daily 2022-06-01 07-00-00 12");
    }

    #[test]
    fn test_stamped_name_colliding_with_literal_candidate() {
        let input = entries(&[
            ("Same", "2021-03-04T09:15:00Z"),
            ("Same", "2021-03-05T10:00:00Z"),
            ("Same 2021-03-04 09-15-00", "2021-01-01T00:00:00Z"),
            ("Same 2021-03-04 09-15-00 2", "2021-01-01T00:00:00Z"),
        ]);
        let out = deduplicate(&input);
        assert_eq!(out[2], "Same 2021-03-04 09-15-00");
        assert_eq!(out[3], "Same 2021-03-04 09-15-00 2");
        assert_eq!(out[0], "Same 2021-03-04 09-15-00 3");
        assert_eq!(out[1], "Same 2021-03-05 10-00-00");
        assert_unique(&out);
    }

    #[test]
    fn test_timestamp_keeps_source_offset() {
        let input = entries(&[
            ("Trip", "2021-03-04T09:15:00+09:00"),
            ("Trip", "2021-03-04T00:15:00Z"),
        ]);
        assert_eq!(
            deduplicate(&input),
            ["Trip 2021-03-04 09-15-00", "Trip 2021-03-04 00-15-00"]
        );
    }

    #[test]
    fn test_adversarial_input_stays_unique() {
        let mut input: Vec<_> = (0..2000)
            .map(|_| ("Untitled".to_string(), ts("2020-01-01T00:00:00Z")))
            .collect();
        input.push(("Untitled 2020-01-01 00-00-00 0002".into(), ts("2020-01-01T00:00:00Z")));
        let out = deduplicate(&input);
        assert_eq!(out.len(), input.len());
        assert_unique(&out);
        assert_eq!(out[2000], "Untitled 2020-01-01 00-00-00 0002");
    }

    #[test]
    fn test_deterministic() {
        let input = entries(&[
            ("b", "2021-01-01T00:00:00Z"),
            ("a", "2021-01-01T00:00:00Z"),
            ("b", "2021-01-01T00:00:00Z"),
            ("a", "2021-01-02T00:00:00Z"),
            ("c", "2021-01-01T00:00:00Z"),
        ]);
        assert_eq!(deduplicate(&input), deduplicate(&input));
    }

    #[test]
    fn test_empty_input() {
        assert!(deduplicate(&[]).is_empty());
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(2001), 4);
    }
}
