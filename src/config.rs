//! Widget configuration
//!
//! Defaults reproduce the stock French widget. A page can override any subset
//! of fields with a JSON block:
//!
//! ```html
//! <script id="comment-wall-config" type="application/json">
//!   { "locale": "en", "labels": { "edit": "Edit" } }
//! </script>
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default LocalStorage key for the comment collection
pub const DEFAULT_STORAGE_KEY: &str = "interactiveBlogComments";

/// Element id of the optional JSON config block
pub const CONFIG_ELEMENT_ID: &str = "comment-wall-config";

/// Locale used for date formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fr" | "fr-fr" => Some(Locale::Fr),
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            _ => None,
        }
    }

    /// Full month name, `month` in 1..=12
    pub fn month_name(&self, month: u32) -> &'static str {
        const FR: [&str; 12] = [
            "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
            "septembre", "octobre", "novembre", "décembre",
        ];
        const EN: [&str; 12] = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::Fr => FR[idx],
            Locale::En => EN[idx],
        }
    }
}

/// User-visible strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub edit: String,
    pub delete: String,
    pub save: String,
    pub cancel: String,
    /// Placeholder shown when there are no comments
    pub empty: String,
    /// Blocking alert when author or text is blank
    pub missing_fields: String,
    /// Confirmation prompt before deleting
    pub confirm_delete: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            edit: "Modifier".to_string(),
            delete: "Supprimer".to_string(),
            save: "Enregistrer".to_string(),
            cancel: "Annuler".to_string(),
            empty: "Aucun commentaire pour le moment. Soyez le premier !".to_string(),
            missing_fields: "Veuillez remplir tous les champs.".to_string(),
            confirm_delete: "Êtes-vous sûr de vouloir supprimer ce commentaire ?".to_string(),
        }
    }
}

/// Widget configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// LocalStorage key holding the JSON array
    pub storage_key: String,

    // === Host page element ids ===
    pub form_id: String,
    pub author_input_id: String,
    pub text_input_id: String,
    pub list_id: String,

    pub locale: Locale,
    pub labels: Labels,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            form_id: "comment-form".to_string(),
            author_input_id: "author-name".to_string(),
            text_input_id: "comment-text".to_string(),
            list_id: "comments-list".to_string(),
            locale: Locale::Fr,
            labels: Labels::default(),
        }
    }
}

impl WidgetConfig {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from the page's config block (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded widget config from #{}", CONFIG_ELEMENT_ID);
                    return config;
                }
                Err(e) => log::warn!("Ignoring invalid widget config: {}", e),
            }
        }

        log::info!("Using default widget config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
