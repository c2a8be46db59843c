//! Case-insensitive substring filter over the note collection.
//!
//! # Invariants
//! - Output is a subsequence of the input in the same relative order.
//! - An empty query matches every note.
//! - Query text is used as typed; surrounding spaces are significant.

use crate::model::note::{Note, NoteId};

/// Pre-normalized search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    raw: String,
    needle: String,
}

impl NoteQuery {
    pub fn new(text: impl Into<String>) -> Self {
        let raw = text.into();
        let needle = raw.to_lowercase();
        Self { raw, needle }
    }

    /// Text as entered by the user.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns whether `note` title or description contains the query.
    pub fn matches(&self, note: &Note) -> bool {
        self.needle.is_empty()
            || note.title.to_lowercase().contains(&self.needle)
            || note.description.to_lowercase().contains(&self.needle)
    }
}

/// Returns the notes matching `query`, in input order.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let query = NoteQuery::new(query);
    notes.iter().filter(|note| query.matches(note)).collect()
}

/// Returns the ids of notes matching `query`, in input order.
pub fn filter_ids(notes: &[Note], query: &NoteQuery) -> Vec<NoteId> {
    notes
        .iter()
        .filter(|note| query.matches(note))
        .map(|note| note.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_ids, filter_notes, NoteQuery};
    use crate::model::note::{Note, NoteDraft};

    fn notes() -> Vec<Note> {
        [
            ("Groceries", "Milk and eggs"),
            ("Gym", "5pm"),
            ("Call mom", "about the MILKshake recipe"),
        ]
        .into_iter()
        .map(|(title, description)| Note::from_draft(NoteDraft::new(title, description)).unwrap())
        .collect()
    }

    #[test]
    fn empty_query_returns_all_in_order() {
        let notes = notes();
        let filtered = filter_notes(&notes, "");
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().zip(&notes).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn matches_title_or_description_case_insensitively() {
        let notes = notes();
        let titles: Vec<_> = filter_notes(&notes, "milk")
            .into_iter()
            .map(|note| note.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Groceries", "Call mom"]);

        let titles: Vec<_> = filter_notes(&notes, "GY")
            .into_iter()
            .map(|note| note.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Gym"]);
    }

    #[test]
    fn no_match_and_empty_input_yield_empty() {
        assert!(filter_notes(&notes(), "zebra").is_empty());
        assert!(filter_notes(&[], "milk").is_empty());
    }

    #[test]
    fn whitespace_is_part_of_the_query() {
        let notes = notes();
        assert_eq!(filter_ids(&notes, &NoteQuery::new(" mom")).len(), 1);
        assert!(filter_ids(&notes, &NoteQuery::new("mom ")).is_empty());
    }

    #[test]
    fn every_result_matches_and_no_match_is_dropped() {
        let notes = notes();
        for query in ["", "m", "5", "and", "recipe", "x"] {
            let parsed = NoteQuery::new(query);
            let ids = filter_ids(&notes, &parsed);
            let expected: Vec<_> = notes
                .iter()
                .filter(|note| {
                    let q = query.to_lowercase();
                    note.title.to_lowercase().contains(&q)
                        || note.description.to_lowercase().contains(&q)
                })
                .map(|note| note.id)
                .collect();
            assert_eq!(ids, expected, "query `{query}`");
        }
    }
}
