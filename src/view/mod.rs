//! Comment list rendering
//!
//! `render_all` is a pure function of the comment collection, the local edit
//! state and the config. User actions are encoded as `data-action`/`data-id`
//! attributes on the rendered buttons so a single delegated listener can route
//! them back to the widget.

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod format;
pub mod node;

use std::collections::BTreeMap;

pub use format::format_date;
pub use node::{Element, Node};

use crate::comment::{Comment, CommentId};
use crate::config::WidgetConfig;

/// Attribute carrying the action code on buttons
pub const ACTION_ATTR: &str = "data-action";
/// Attribute carrying the comment id on items, buttons and textareas
pub const ID_ATTR: &str = "data-id";

/// Rows of the edit textarea
const EDIT_ROWS: u32 = 4;

/// User actions attached to rendered controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Delete,
    Save,
    Cancel,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Save => "save",
            Action::Cancel => "cancel",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "edit" => Some(Action::Edit),
            "delete" => Some(Action::Delete),
            "save" => Some(Action::Save),
            "cancel" => Some(Action::Cancel),
            _ => None,
        }
    }
}

/// Comments currently in edit mode, with their unsaved drafts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    drafts: BTreeMap<CommentId, String>,
}

impl EditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter edit mode with `text` as the initial draft
    pub fn begin(&mut self, id: CommentId, text: impl Into<String>) {
        self.drafts.insert(id, text.into());
    }

    /// Record textarea input; ignored unless `id` is being edited
    pub fn update(&mut self, id: &CommentId, text: impl Into<String>) {
        if let Some(draft) = self.drafts.get_mut(id) {
            *draft = text.into();
        }
    }

    /// Leave edit mode, returning the discarded draft
    pub fn end(&mut self, id: &CommentId) -> Option<String> {
        self.drafts.remove(id)
    }

    pub fn is_editing(&self, id: &CommentId) -> bool {
        self.drafts.contains_key(id)
    }

    pub fn draft(&self, id: &CommentId) -> Option<&str> {
        self.drafts.get(id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Drop drafts whose comment no longer exists
    pub fn retain_existing(&mut self, comments: &[Comment]) {
        self.drafts
            .retain(|id, _| comments.iter().any(|c| &c.id == id));
    }
}

/// Comments ordered newest first; equal dates keep insertion order
pub fn sort_by_recency(comments: &[Comment]) -> Vec<&Comment> {
    let mut sorted: Vec<&Comment> = comments.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Render the whole list: one item per comment, or the empty-state placeholder
pub fn render_all(comments: &[Comment], edits: &EditState, config: &WidgetConfig) -> Vec<Node> {
    if comments.is_empty() {
        let placeholder = Element::new("p")
            .class("no-comments-message")
            .text(config.labels.empty.as_str());
        return vec![placeholder.into()];
    }

    sort_by_recency(comments)
        .into_iter()
        .map(|c| render_comment(c, edits.draft(&c.id), config).into())
        .collect()
}

/// Render one comment. `draft` is `Some` while the comment is in edit mode.
pub fn render_comment(comment: &Comment, draft: Option<&str>, config: &WidgetConfig) -> Element {
    let id = comment.id.as_str();
    let labels = &config.labels;

    let header = Element::new("div")
        .class("comment-header")
        .child(Element::new("span").class("comment-author").text(comment.author.as_str()))
        .child(
            Element::new("span")
                .class("comment-date")
                .text(format_date(&comment.date, config.locale)),
        );

    let actions = Element::new("div")
        .class("comment-actions")
        .child(button("edit-btn", Action::Edit, id, &labels.edit))
        .child(button("delete-btn", Action::Delete, id, &labels.delete));

    let textarea = Element::new("textarea")
        .class("edit-textarea")
        .attr(ID_ATTR, id)
        .attr("rows", EDIT_ROWS.to_string())
        .text(draft.unwrap_or(comment.text.as_str()));

    Element::new("div")
        .class("comment-item")
        .class_if("editing", draft.is_some())
        .attr(ID_ATTR, id)
        .child(header)
        .child(actions)
        .child(Element::new("p").class("comment-text").text(comment.text.as_str()))
        .child(textarea)
        .child(button("save-edit-btn", Action::Save, id, &labels.save))
        .child(button("cancel-edit-btn", Action::Cancel, id, &labels.cancel))
}

fn button(class: &str, action: Action, id: &str, label: &str) -> Element {
    Element::new("button")
        .class(class)
        .attr("type", "button")
        .attr(ACTION_ATTR, action.as_str())
        .attr(ID_ATTR, id)
        .text(label)
}

/// CSS selector for the edit textarea of one comment
pub fn edit_textarea_selector(id: &CommentId) -> String {
    format!("textarea.edit-textarea[{}=\"{}\"]", ID_ATTR, id)
}

/// Serialize rendered nodes to one HTML string
pub fn to_html(nodes: &[Node]) -> String {
    nodes.iter().map(Node::to_html).collect()
}
