//! Search and ordering for the notes list.

use crate::models::Note;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recently updated first.
    #[default]
    Newest,
    Oldest,
    /// Case-insensitive, A to Z.
    Title,
}

impl SortOrder {
    pub const ALL: [SortOrder; 3] = [SortOrder::Newest, SortOrder::Oldest, SortOrder::Title];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Title => "title",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest first",
            SortOrder::Oldest => "Oldest first",
            SortOrder::Title => "Title",
        }
    }

    /// Inverse of [`SortOrder::as_str`]; unknown values fall back to the default.
    pub fn parse(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == value)
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteQuery {
    pub search: String,
    pub sort: SortOrder,
}

impl NoteQuery {
    /// Filter and order `notes`. Encrypted notes only match on their title.
    pub fn apply(&self, notes: &[Note]) -> Vec<Note> {
        let needle = self.search.trim().to_lowercase();
        let mut matched: Vec<Note> = notes
            .iter()
            .filter(|note| needle.is_empty() || note.searchable_text().contains(&needle))
            .cloned()
            .collect();

        match self.sort {
            SortOrder::Newest => matched.sort_by(|a, b| b.updated_at.total_cmp(&a.updated_at)),
            SortOrder::Oldest => matched.sort_by(|a, b| a.updated_at.total_cmp(&b.updated_at)),
            SortOrder::Title => matched.sort_by_cached_key(|note| note.title.to_lowercase()),
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_note;

    fn notes() -> Vec<Note> {
        let mut a = sample_note("a", "Buy milk", false);
        a.title = "groceries".into();
        a.updated_at = 3.0;
        let mut b = sample_note("b", "[Encrypted content - Password required to view]", true);
        b.title = "Bank PIN".into();
        b.updated_at = 1.0;
        let mut c = sample_note("c", "call the bank", false);
        c.title = "Todo".into();
        c.updated_at = 2.0;
        vec![a, b, c]
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn sorts() {
        let all = notes();
        let by = |sort| NoteQuery {
            search: String::new(),
            sort,
        };
        assert_eq!(ids(&by(SortOrder::Newest).apply(&all)), ["a", "c", "b"]);
        assert_eq!(ids(&by(SortOrder::Oldest).apply(&all)), ["b", "c", "a"]);
        assert_eq!(ids(&by(SortOrder::Title).apply(&all)), ["b", "a", "c"]);
    }

    #[test]
    fn search_is_case_insensitive_and_skips_locked_content() {
        let all = notes();
        let query = NoteQuery {
            search: "  BANK ".into(),
            sort: SortOrder::Title,
        };
        assert_eq!(ids(&query.apply(&all)), ["b", "c"]);

        let query = NoteQuery {
            search: "encrypted".into(),
            ..NoteQuery::default()
        };
        assert!(query.apply(&all).is_empty());
    }

    #[test]
    fn sort_order_round_trips_through_select_values() {
        for order in SortOrder::ALL {
            assert_eq!(SortOrder::parse(order.as_str()), order);
        }
        assert_eq!(SortOrder::parse("bogus"), SortOrder::Newest);
    }
}
