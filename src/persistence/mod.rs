//! Save/load of the comment collection
//!
//! The whole collection lives as one JSON array under a single key. Every
//! mutation loads the array fresh, changes it, and writes it back whole.
//! A slot that is not a JSON array is logged and treated as empty. Inside a
//! valid array, records that do not read as a [`Comment`] are skipped on load
//! but written back untouched, so no write ever drops them.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::comment::{Comment, CommentId};
use crate::error::Result;
use crate::platform::KeyValueStore;

/// One element of the persisted array
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Entry {
    Comment(Comment),
    /// Kept verbatim; never shown, never dropped
    Unreadable(Value),
}

impl Entry {
    fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match self {
            Entry::Comment(c) => Some(c),
            Entry::Unreadable(_) => None,
        }
    }
}

/// Comment collection over an injected key-value slot
#[derive(Debug)]
pub struct CommentStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> CommentStore<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load all readable comments. Never fails: absent, unreadable or
    /// malformed data yields an empty collection.
    pub fn load(&self) -> Vec<Comment> {
        self.read_entries()
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Comment(c) => Some(c),
                Entry::Unreadable(_) => None,
            })
            .collect()
    }

    /// Number of persisted records that could not be read as comments
    pub fn unreadable_count(&self) -> usize {
        self.read_entries()
            .iter()
            .filter(|e| matches!(e, Entry::Unreadable(_)))
            .count()
    }

    fn read_entries(&self) -> Vec<Entry> {
        let json = match self.backend.get(&self.key) {
            Ok(Some(json)) => json,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read comments from '{}': {}", self.key, e);
                return Vec::new();
            }
        };

        let values = match serde_json::from_str::<Vec<Value>>(&json) {
            Ok(values) => values,
            Err(e) => {
                log::warn!("Discarding malformed comments under '{}': {}", self.key, e);
                return Vec::new();
            }
        };

        let entries: Vec<Entry> = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| match serde_json::from_value::<Comment>(value.clone()) {
                Ok(comment) => Entry::Comment(comment),
                Err(e) => {
                    log::warn!("Skipping unreadable comment #{} under '{}': {}", i, self.key, e);
                    Entry::Unreadable(value)
                }
            })
            .collect();
        log::debug!("Loaded {} entries", entries.len());
        entries
    }

    /// Write entries back; an empty collection clears the slot
    fn write_entries(&self, entries: &[Entry]) -> Result<()> {
        if entries.is_empty() {
            self.backend.remove(&self.key)?;
            log::info!("Comments cleared");
            return Ok(());
        }
        let json = serde_json::to_string(entries)?;
        self.backend.set(&self.key, &json)?;
        log::info!("Comments saved ({} entries)", entries.len());
        Ok(())
    }

    /// Give every legacy record without an id a fresh one and persist the
    /// result. Returns how many ids were assigned; nothing is written if none.
    pub fn backfill_ids<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> Result<usize> {
        let mut entries = self.read_entries();
        let mut backfilled = 0;
        for comment in entries
            .iter_mut()
            .filter_map(Entry::as_comment_mut)
            .filter(|c| c.id.is_empty())
        {
            comment.id = CommentId::generate(now, rng);
            backfilled += 1;
        }
        if backfilled > 0 {
            log::info!("Assigned ids to {} legacy comments", backfilled);
            self.write_entries(&entries)?;
        }
        Ok(backfilled)
    }

    /// Replace the readable comments with `comments`. Unreadable records
    /// already in the slot are kept after them.
    pub fn save(&self, comments: &[Comment]) -> Result<()> {
        let entries: Vec<Entry> = comments
            .iter()
            .cloned()
            .map(Entry::Comment)
            .chain(
                self.read_entries()
                    .into_iter()
                    .filter(|e| matches!(e, Entry::Unreadable(_))),
            )
            .collect();
        self.write_entries(&entries)
    }

    /// Append a comment and persist
    pub fn add(&self, comment: Comment) -> Result<()> {
        let mut entries = self.read_entries();
        entries.push(Entry::Comment(comment));
        self.write_entries(&entries)
    }

    /// Replace the text of `id` and bump its date. `None` if no such comment;
    /// nothing is written in that case.
    pub fn edit(&self, id: &CommentId, text: &str, now: DateTime<Utc>) -> Result<Option<Comment>> {
        let mut entries = self.read_entries();
        let Some(comment) = entries
            .iter_mut()
            .filter_map(Entry::as_comment_mut)
            .find(|c| &c.id == id)
        else {
            log::warn!("Edit of unknown comment {}", id);
            return Ok(None);
        };
        comment.apply_edit(text, now);
        let edited = comment.clone();
        self.write_entries(&entries)?;
        Ok(Some(edited))
    }

    /// Remove the comment with `id` and persist. Returns whether it existed.
    pub fn delete(&self, id: &CommentId) -> Result<bool> {
        let mut entries = self.read_entries();
        let before = entries.len();
        entries.retain(|e| !matches!(e, Entry::Comment(c) if &c.id == id));
        if entries.len() == before {
            log::warn!("Delete of unknown comment {}", id);
            return Ok(false);
        }
        self.write_entries(&entries)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const KEY: &str = "comments";

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn comment(id: &str, author: &str, text: &str, secs: i64) -> Comment {
        Comment::new(id.into(), author, text, at(secs))
    }

    fn seeded(comments: &[Comment]) -> CommentStore<MemoryStore> {
        // empty collections clear the slot, so seed through the backend
        let json = serde_json::to_string(comments).unwrap();
        CommentStore::new(MemoryStore::with_value(KEY, json), KEY)
    }

    #[test]
    fn test_load_absent_is_empty() {
        let store = CommentStore::new(MemoryStore::new(), KEY);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupted_is_empty() {
        for bad in ["{not json", "", "null", r#"{"id":"a"}"#, "42"] {
            let store = CommentStore::new(MemoryStore::with_value(KEY, bad), KEY);
            assert!(store.load().is_empty(), "expected empty for {:?}", bad);
        }
    }

    #[test]
    fn test_add_then_load_has_one_more() {
        let store = seeded(&[comment("a", "Ana", "first", 1)]);
        let mut rng = Pcg32::seed_from_u64(1);
        let id = CommentId::generate(at(2), &mut rng);

        store
            .add(Comment::new(id.clone(), "Bob", "second", at(2)))
            .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        let added = loaded.iter().find(|c| c.id == id).unwrap();
        assert_eq!(added.author, "Bob");
        assert_eq!(added.text, "second");
        assert!(!added.id.is_empty());
    }

    #[test]
    fn test_edit_changes_text_and_date_only() {
        let store = seeded(&[comment("a", "Ana", "old", 1), comment("b", "Bob", "keep", 2)]);

        let edited = store.edit(&"a".into(), "new", at(100)).unwrap().unwrap();
        assert_eq!(edited.id.as_str(), "a");
        assert_eq!(edited.author, "Ana");
        assert_eq!(edited.text, "new");
        assert_eq!(edited.date, at(100));

        let loaded = store.load();
        assert_eq!(loaded[0], edited);
        assert_eq!(loaded[1], comment("b", "Bob", "keep", 2));
    }

    #[test]
    fn test_edit_unknown_writes_nothing() {
        let store = seeded(&[comment("a", "Ana", "old", 1)]);
        let before = store.backend().raw(KEY);
        assert!(store.edit(&"zzz".into(), "new", at(5)).unwrap().is_none());
        assert_eq!(store.backend().raw(KEY), before);
    }

    #[test]
    fn test_delete_removes_exactly_that_id() {
        let a = comment("a", "Ana", "one", 1);
        let b = comment("b", "Bob", "two", 2);
        let c = comment("c", "Cy", "three", 3);
        let store = seeded(&[a.clone(), b, c.clone()]);

        assert!(store.delete(&"b".into()).unwrap());
        assert_eq!(store.load(), vec![a, c]);
        assert!(!store.delete(&"b".into()).unwrap());
    }

    const MIXED: &str = r#"[
        {"id":"a","author":"Ana","text":"keep me","date":"2024-03-10T09:00:00Z"},
        {"id":"odd","author":42,"text":"numeric author"},
        {"id":"b","author":"Bob","text":"me too","date":"2024-03-14T10:00:00"},
        "stray"
    ]"#;

    #[test]
    fn test_unreadable_record_skips_only_itself() {
        let store = CommentStore::new(MemoryStore::with_value(KEY, MIXED), KEY);
        let loaded = store.load();
        let texts: Vec<&str> = loaded.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["keep me", "me too"]);
        assert_eq!(store.unreadable_count(), 2);
    }

    #[test]
    fn test_mutations_keep_unreadable_records() {
        let store = CommentStore::new(MemoryStore::with_value(KEY, MIXED), KEY);

        store.add(comment("c", "Cy", "new", 500)).unwrap();
        store.edit(&"a".into(), "edited", at(600)).unwrap().unwrap();
        assert!(store.delete(&"b".into()).unwrap());

        let raw: Vec<Value> = serde_json::from_str(&store.backend().raw(KEY).unwrap()).unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(raw[0]["text"], "edited");
        assert_eq!(raw[1]["author"], 42);
        assert_eq!(raw[2], "stray");
        assert_eq!(raw[3]["id"], "c");

        // save(load()) keeps them too
        store.save(&store.load()).unwrap();
        assert_eq!(store.unreadable_count(), 2);
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn test_deleting_last_comment_clears_slot() {
        let store = seeded(&[comment("a", "Ana", "only", 1)]);
        assert!(store.delete(&"a".into()).unwrap());
        assert_eq!(store.backend().raw(KEY), None);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_backfill_ids_persists_legacy_records() {
        let json = r#"[
            {"author":"Ana","text":"no id","date":"2024-01-01T00:00:00Z"},
            {"id":"keep","author":"Bob","text":"has id","date":"2024-01-02T00:00:00Z"}
        ]"#;
        let store = CommentStore::new(MemoryStore::with_value(KEY, json), KEY);
        let mut rng = Pcg32::seed_from_u64(3);

        assert_eq!(store.backfill_ids(at(50), &mut rng).unwrap(), 1);
        let loaded = store.load();
        assert!(loaded[0].id.as_str().starts_with("50000"));
        assert_eq!(loaded[0].text, "no id");
        assert_eq!(loaded[1].id.as_str(), "keep");

        // second pass finds nothing and writes nothing
        let before = store.backend().raw(KEY);
        assert_eq!(store.backfill_ids(at(60), &mut rng).unwrap(), 0);
        assert_eq!(store.backend().raw(KEY), before);
    }

    fn arb_comment() -> impl Strategy<Value = Comment> {
        ("[a-z0-9]{1,12}", ".{0,20}", ".{0,40}", 0i64..4_000_000_000)
            .prop_map(|(id, author, text, secs)| comment(&id, &author, &text, secs))
    }

    proptest! {
        #[test]
        fn prop_save_load_is_idempotent(comments in prop::collection::vec(arb_comment(), 0..16)) {
            let store = seeded(&comments);
            store.save(&store.load()).unwrap();
            let first = store.backend().raw(KEY);

            store.save(&store.load()).unwrap();
            prop_assert_eq!(store.backend().raw(KEY), first);
            prop_assert_eq!(store.load(), comments);
        }
    }
}
