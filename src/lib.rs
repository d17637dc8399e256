//! Comment Wall - a LocalStorage-backed comment widget
//!
//! Core modules:
//! - `comment`: Comment records and id generation
//! - `persistence`: Load/save of the whole collection under one key
//! - `platform`: Browser/native platform abstraction (storage, clock)
//! - `view`: Declarative rendering of the comment list
//! - `widget`: Event handling (submit, edit, delete)
//! - `config`: Element ids, labels and locale

pub mod comment;
pub mod config;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod view;
pub mod widget;

pub use comment::{Comment, CommentId};
pub use config::{Labels, Locale, WidgetConfig};
pub use error::{Error, Field, Result};
pub use persistence::CommentStore;
pub use platform::{KeyValueStore, MemoryStore};
pub use widget::{CommentWidget, Prompt};
