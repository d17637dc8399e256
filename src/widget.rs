//! Comment widget controller
//!
//! Owns the store handle and the local edit state, and turns UI events into
//! store mutations. The browser entry point only reads DOM values, calls into
//! here, and re-mounts the result of [`CommentWidget::render`].

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::comment::{Comment, CommentId};
use crate::config::WidgetConfig;
use crate::error::{Error, Field, Result};
use crate::persistence::CommentStore;
use crate::platform::KeyValueStore;
use crate::view::{self, Action, EditState, Node};

/// Blocking user prompts (`window.alert` / `window.confirm` on web)
pub trait Prompt {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

/// Comment widget state
#[derive(Debug)]
pub struct CommentWidget<S> {
    store: CommentStore<S>,
    edits: EditState,
    config: WidgetConfig,
    rng: Pcg32,
}

impl<S: KeyValueStore> CommentWidget<S> {
    /// Create a widget over `backend`; `seed` drives the id suffixes
    pub fn new(backend: S, config: WidgetConfig, seed: u64) -> Self {
        let store = CommentStore::new(backend, config.storage_key.clone());
        Self {
            store,
            edits: EditState::new(),
            config,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn store(&self) -> &CommentStore<S> {
        &self.store
    }

    pub fn edits(&self) -> &EditState {
        &self.edits
    }

    /// Prepare persisted data for use: legacy records get durable ids
    pub fn init(&mut self, now: DateTime<Utc>) -> Result<usize> {
        self.store.backfill_ids(now, &mut self.rng)
    }

    /// Render the current collection, loaded fresh from storage
    pub fn render(&mut self) -> Vec<Node> {
        let comments = self.store.load();
        self.edits.retain_existing(&comments);
        view::render_all(&comments, &self.edits, &self.config)
    }

    /// Create a comment from form input. Both fields are trimmed and must be
    /// non-empty; nothing is stored otherwise.
    pub fn submit(&mut self, author: &str, text: &str, now: DateTime<Utc>) -> Result<Comment> {
        let author = author.trim();
        let text = text.trim();
        if author.is_empty() {
            return Err(Error::MissingField {
                field: Field::Author,
            });
        }
        if text.is_empty() {
            return Err(Error::MissingField { field: Field::Text });
        }

        let id = CommentId::generate(now, &mut self.rng);
        let comment = Comment::new(id, author, text, now);
        self.store.add(comment.clone())?;
        log::info!("Comment {} added by {}", comment.id, comment.author);
        Ok(comment)
    }

    /// Enter edit mode for `id`. Local only; returns false for unknown ids.
    pub fn begin_edit(&mut self, id: &CommentId) -> bool {
        let Some(comment) = self.store.load().into_iter().find(|c| &c.id == id) else {
            return false;
        };
        log::debug!("Editing comment {}", id);
        self.edits.begin(comment.id, comment.text);
        true
    }

    /// Keep in-progress textarea input across re-renders
    pub fn update_draft(&mut self, id: &CommentId, text: &str) {
        self.edits.update(id, text);
    }

    /// Leave edit mode without saving. Returns whether `id` was being edited.
    pub fn cancel_edit(&mut self, id: &CommentId) -> bool {
        let was_editing = self.edits.end(id).is_some();
        if was_editing {
            log::debug!("Edit of comment {} cancelled", id);
        }
        was_editing
    }

    /// Persist edited text and bump the date. Blank text is rejected and the
    /// comment stays in edit mode with the draft kept.
    pub fn save_edit(
        &mut self,
        id: &CommentId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Comment>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.edits.update(id, text);
            return Err(Error::MissingField { field: Field::Text });
        }

        let edited = self.store.edit(id, trimmed, now)?;
        self.edits.end(id);
        if edited.is_some() {
            log::info!("Comment {} edited", id);
        }
        Ok(edited)
    }

    /// Delete `id` once `confirm` approves the configured prompt
    pub fn delete<F>(&mut self, id: &CommentId, confirm: F) -> Result<bool>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(self.config.labels.confirm_delete.as_str()) {
            return Ok(false);
        }
        let removed = self.store.delete(id)?;
        self.edits.end(id);
        if removed {
            log::info!("Comment {} deleted", id);
        }
        Ok(removed)
    }

    /// Route a form submission. Returns true when a comment was created and
    /// the form should be reset. Validation failures become an alert.
    pub fn handle_submit(
        &mut self,
        author: &str,
        text: &str,
        prompt: &impl Prompt,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        match self.submit(author, text, now) {
            Ok(_) => Ok(true),
            Err(e) if e.is_validation() => {
                prompt.alert(&self.config.labels.missing_fields);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Route a click on a rendered control. `draft` is the current textarea
    /// value, needed only for [`Action::Save`]. Returns true when the list
    /// should be re-rendered.
    pub fn handle_action(
        &mut self,
        action: Action,
        id: &CommentId,
        draft: Option<&str>,
        prompt: &impl Prompt,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        match action {
            Action::Edit => Ok(self.begin_edit(id)),
            Action::Cancel => Ok(self.cancel_edit(id)),
            Action::Delete => self.delete(id, |msg| prompt.confirm(msg)),
            Action::Save => {
                let text = draft
                    .map(str::to_string)
                    .or_else(|| self.edits.draft(id).map(str::to_string))
                    .unwrap_or_default();
                match self.save_edit(id, &text, now) {
                    Ok(_) => Ok(true),
                    Err(e) if e.is_validation() => {
                        prompt.alert(&self.config.labels.missing_fields);
                        Ok(true)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use chrono::TimeZone;
    use std::cell::RefCell;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn widget() -> CommentWidget<MemoryStore> {
        CommentWidget::new(MemoryStore::new(), WidgetConfig::default(), 1)
    }

    /// Records prompts and answers confirmations with a fixed reply
    struct FakePrompt {
        answer: bool,
        alerts: RefCell<Vec<String>>,
        confirms: RefCell<Vec<String>>,
    }

    impl FakePrompt {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                alerts: RefCell::new(Vec::new()),
                confirms: RefCell::new(Vec::new()),
            }
        }
    }

    impl Prompt for FakePrompt {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }

        fn confirm(&self, message: &str) -> bool {
            self.confirms.borrow_mut().push(message.to_string());
            self.answer
        }
    }

    fn raw(w: &CommentWidget<MemoryStore>) -> Option<String> {
        w.store().backend().raw(w.store().key())
    }

    #[test]
    fn test_submit_trims_and_stores() {
        let mut w = widget();
        let c = w.submit("  Ana ", "\tHello\n", at(10)).unwrap();
        assert_eq!(c.author, "Ana");
        assert_eq!(c.text, "Hello");
        assert_eq!(c.date, at(10));
        assert!(c.id.as_str().starts_with("10000"));
        assert_eq!(w.store().load(), vec![c]);
    }

    #[test]
    fn test_submit_blank_field_mutates_nothing() {
        let mut w = widget();
        let err = w.submit("   ", "text", at(1)).unwrap_err();
        assert!(matches!(err, Error::MissingField { field: Field::Author }));
        let err = w.submit("Ana", "  ", at(1)).unwrap_err();
        assert!(matches!(err, Error::MissingField { field: Field::Text }));
        assert_eq!(raw(&w), None);
    }

    #[test]
    fn test_handle_submit_alerts_on_blank() {
        let mut w = widget();
        let prompt = FakePrompt::answering(true);
        assert!(!w.handle_submit("", "x", &prompt, at(1)).unwrap());
        assert_eq!(
            *prompt.alerts.borrow(),
            vec!["Veuillez remplir tous les champs.".to_string()]
        );
        assert!(w.handle_submit("Ana", "x", &prompt, at(1)).unwrap());
        assert_eq!(prompt.alerts.borrow().len(), 1);
    }

    #[test]
    fn test_submit_ids_are_unique() {
        let mut w = widget();
        let a = w.submit("a", "1", at(5)).unwrap();
        let b = w.submit("b", "2", at(5)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(w.store().load().len(), 2);
    }

    #[test]
    fn test_edit_toggle_is_local() {
        let mut w = widget();
        let c = w.submit("Ana", "orig", at(1)).unwrap();
        let before = raw(&w);

        assert!(w.begin_edit(&c.id));
        assert_eq!(w.edits().draft(&c.id), Some("orig"));
        w.update_draft(&c.id, "typing");
        let nodes = w.render();
        assert!(nodes[0].as_element().unwrap().has_class("editing"));

        assert!(w.cancel_edit(&c.id));
        assert!(!w.edits().is_editing(&c.id));
        assert_eq!(raw(&w), before);
        assert_eq!(w.store().load()[0].text, "orig");
    }

    #[test]
    fn test_begin_edit_unknown_id() {
        let mut w = widget();
        assert!(!w.begin_edit(&"nope".into()));
        assert!(w.edits().is_empty());
    }

    #[test]
    fn test_save_edit_updates_text_and_date() {
        let mut w = widget();
        let c = w.submit("Ana", "orig", at(1)).unwrap();
        w.begin_edit(&c.id);

        let edited = w.save_edit(&c.id, "  changed ", at(99)).unwrap().unwrap();
        assert_eq!(edited.id, c.id);
        assert_eq!(edited.author, "Ana");
        assert_eq!(edited.text, "changed");
        assert_eq!(edited.date, at(99));
        assert!(!w.edits().is_editing(&c.id));
        assert_eq!(w.store().load(), vec![edited]);
    }

    #[test]
    fn test_save_edit_blank_keeps_edit_mode() {
        let mut w = widget();
        let c = w.submit("Ana", "orig", at(1)).unwrap();
        w.begin_edit(&c.id);

        assert!(w.save_edit(&c.id, "   ", at(2)).unwrap_err().is_validation());
        assert!(w.edits().is_editing(&c.id));
        assert_eq!(w.store().load()[0], c);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut w = widget();
        let a = w.submit("Ana", "one", at(1)).unwrap();
        let b = w.submit("Bob", "two", at(2)).unwrap();

        let declined = FakePrompt::answering(false);
        assert!(!w.handle_action(Action::Delete, &a.id, None, &declined, at(3)).unwrap());
        assert_eq!(w.store().load().len(), 2);
        assert_eq!(
            *declined.confirms.borrow(),
            vec![w.config().labels.confirm_delete.clone()]
        );

        let accepted = FakePrompt::answering(true);
        assert!(w.handle_action(Action::Delete, &a.id, None, &accepted, at(3)).unwrap());
        assert_eq!(w.store().load(), vec![b]);
    }

    #[test]
    fn test_delete_while_editing_drops_draft() {
        let mut w = widget();
        let c = w.submit("Ana", "one", at(1)).unwrap();
        w.begin_edit(&c.id);
        assert!(w.delete(&c.id, |_| true).unwrap());
        assert!(w.edits().is_empty());
    }

    #[test]
    fn test_handle_action_save_uses_textarea_value() {
        let mut w = widget();
        let c = w.submit("Ana", "one", at(1)).unwrap();
        let prompt = FakePrompt::answering(true);

        w.handle_action(Action::Edit, &c.id, None, &prompt, at(2)).unwrap();
        w.handle_action(Action::Save, &c.id, Some("from dom"), &prompt, at(3))
            .unwrap();
        assert_eq!(w.store().load()[0].text, "from dom");

        w.handle_action(Action::Edit, &c.id, None, &prompt, at(4)).unwrap();
        w.update_draft(&c.id, "from draft");
        w.handle_action(Action::Save, &c.id, None, &prompt, at(5)).unwrap();
        let stored = &w.store().load()[0];
        assert_eq!(stored.text, "from draft");
        assert_eq!(stored.date, at(5));
        assert!(prompt.alerts.borrow().is_empty());
    }

    #[test]
    fn test_handle_action_save_blank_alerts() {
        let mut w = widget();
        let c = w.submit("Ana", "one", at(1)).unwrap();
        let prompt = FakePrompt::answering(true);
        w.handle_action(Action::Edit, &c.id, None, &prompt, at(2)).unwrap();
        assert!(w.handle_action(Action::Save, &c.id, Some(" "), &prompt, at(3)).unwrap());
        assert_eq!(prompt.alerts.borrow().len(), 1);
        assert_eq!(w.store().load()[0].text, "one");
    }

    #[test]
    fn test_render_is_newest_first_after_edit() {
        let mut w = widget();
        let old = w.submit("Ana", "old", at(1)).unwrap();
        let new = w.submit("Bob", "new", at(2)).unwrap();
        w.save_edit(&old.id, "bumped", at(3)).unwrap();

        let order: Vec<String> = w
            .render()
            .iter()
            .filter_map(Node::as_element)
            .filter_map(|el| el.get_attr(view::ID_ATTR).map(str::to_string))
            .collect();
        assert_eq!(order, vec![old.id.to_string(), new.id.to_string()]);
    }

    #[test]
    fn test_corrupt_storage_renders_empty_state() {
        let config = WidgetConfig::default();
        let backend = MemoryStore::with_value(&config.storage_key, "garbage");
        let mut w = CommentWidget::new(backend, config, 1);
        assert_eq!(w.init(at(1)).unwrap(), 0);
        let nodes = w.render();
        assert!(nodes[0].as_element().unwrap().has_class("no-comments-message"));
    }

    #[test]
    fn test_odd_records_survive_submit() {
        let config = WidgetConfig::default();
        let backend = MemoryStore::with_value(
            &config.storage_key,
            r#"[
                {"id":"1","author":"Ana","text":"keep me","date":"2024-03-10T09:00:00Z"},
                {"id":"2","author":"Bob","text":"me too","date":"2024-03-14T10:00:00"},
                {"id":"3","author":"Cy","text":"no date"}
            ]"#,
        );
        let mut w = CommentWidget::new(backend, config, 1);
        assert_eq!(w.render().len(), 2);

        w.submit("Dee", "new", at(1_800_000_000)).unwrap();

        let texts: Vec<String> = w.store().load().into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["keep me", "me too", "new"]);
        let slot = raw(&w).unwrap();
        assert!(slot.contains("no date"));
    }

    #[test]
    fn test_init_backfills_legacy_ids() {
        let config = WidgetConfig::default();
        let backend = MemoryStore::with_value(
            &config.storage_key,
            r#"[{"author":"Ana","text":"hi","date":"2024-01-01T00:00:00Z"}]"#,
        );
        let mut w = CommentWidget::new(backend, config, 1);
        assert_eq!(w.init(at(7)).unwrap(), 1);
        let id = w.store().load()[0].id.clone();
        assert!(!id.is_empty());
        assert!(w.begin_edit(&id));
    }
}
