//! Localization string lookup.
//!
//! A flat key → string table loaded once at startup. Menu captions, button
//! labels, and field prompts all go through it, so swapping the display
//! language never touches engine code.

use std::collections::HashMap;

use crate::error::{BlankoError, Result};

/// Well-known lexicon keys used by the engine itself (categories, documents,
/// and field names are looked up under their own identifiers).
pub mod keys {
    /// Bot description sent in reply to the start command.
    pub const DESCRIPTION: &str = "description";
    /// Caption of the main menu page.
    pub const MAIN_MENU: &str = "main_menu";
    /// Caption of a category's document list page.
    pub const FILES_MENU: &str = "files_menu";
    /// Caption of a single document's page.
    pub const FILE_PAGE: &str = "file_page";
    /// Caption attached to the delivered artifact.
    pub const FILLED_FILE: &str = "filled_file";
    /// Notice shown while the artifact is being prepared.
    pub const WAIT: &str = "wait";
    /// Label of the "back" button.
    pub const BACK_BUTTON: &str = "back_button";
    /// Label of the "fill document" button.
    pub const FILL_BUTTON: &str = "fill_button";
    /// Prefix of every field prompt ("enter ...").
    pub const PROMPT_ENTER: &str = "prompt_enter";
    /// Generic notice for a navigation action that went wrong.
    pub const TRY_AGAIN: &str = "try_again";
    /// Apology sent when rendering the artifact failed.
    pub const RENDER_FAILED: &str = "render_failed";
}

/// Static localization table.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: HashMap<String, String>,
}

impl Lexicon {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// The built-in table extended with `overrides` (overrides win on
    /// duplicate keys).
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        let mut lexicon = default_lexicon();
        lexicon.entries.extend(overrides);
        lexicon
    }

    /// Looks up the localized string for `key`.
    pub fn text(&self, key: &str) -> Result<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| BlankoError::missing_translation(key))
    }
}

/// The built-in lexicon.
pub fn default_lexicon() -> Lexicon {
    let entries = [
        ("Category 1", "Категория 1"),
        ("Category 2", "Категория 2"),
        ("Category 3", "Категория 3"),
        ("Category 4", "Категория 4"),
        ("diploma_cover", "Титульник"),
        ("only_text", "Просто текст"),
        ("name", "имя"),
        ("surname", "фамилию"),
        ("patronimic", "отчество"),
        ("birth_date", "дату рождения"),
        ("final_state", "название документа"),
        (keys::DESCRIPTION, "Описание этого бота и его команд"),
        (keys::MAIN_MENU, "Вот такие группы заявлений у меня есть"),
        (keys::FILES_MENU, "В данном разделе есть следующие файлы"),
        (
            keys::FILE_PAGE,
            "Вот пустой бланк. Можете заполнить его сами или попросить об этом меня",
        ),
        (keys::FILLED_FILE, "Вот ваш заполненный файл"),
        (
            keys::WAIT,
            "Пожалуйста, подождите немного, документ готовится",
        ),
        (keys::BACK_BUTTON, "Назад"),
        (keys::FILL_BUTTON, "Заполнить документ"),
        (keys::PROMPT_ENTER, "Введите"),
        (
            keys::TRY_AGAIN,
            "Что-то пошло не так, попробуйте ещё раз",
        ),
        (
            keys::RENDER_FAILED,
            "Не получилось подготовить документ, попробуйте прислать название ещё раз",
        ),
    ];

    Lexicon::new(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        let lexicon = default_lexicon();
        assert_eq!(lexicon.text("diploma_cover").unwrap(), "Титульник");
        assert_eq!(lexicon.text(keys::BACK_BUTTON).unwrap(), "Назад");
    }

    #[test]
    fn missing_key_is_an_error() {
        let lexicon = default_lexicon();
        let err = lexicon.text("nope").unwrap_err();
        assert!(matches!(err, BlankoError::MissingTranslation { .. }));
    }

    #[test]
    fn overrides_replace_defaults() {
        let lexicon = Lexicon::with_overrides(HashMap::from([(
            "only_text".to_string(),
            "Plain text".to_string(),
        )]));
        assert_eq!(lexicon.text("only_text").unwrap(), "Plain text");
        // Untouched defaults survive.
        assert_eq!(lexicon.text("name").unwrap(), "имя");
    }
}
