//! Inline keyboard builders for the three menu depths.

use blanko_core::catalog::MenuTree;
use blanko_core::error::Result;
use blanko_core::lexicon::{keys, Lexicon};
use blanko_core::token::{FillToken, MenuToken};
use blanko_core::transport::Button;

/// Splits a flat button list into rows of at most `width` buttons.
pub fn chunk_rows(buttons: Vec<Button>, width: usize) -> Vec<Vec<Button>> {
    let width = width.max(1);
    buttons.chunks(width).map(|row| row.to_vec()).collect()
}

/// Main menu: one button per category, leading one level down.
pub fn main_menu_keyboard(
    tree: &MenuTree,
    lexicon: &Lexicon,
    width: usize,
) -> Result<Vec<Vec<Button>>> {
    let mut buttons = Vec::new();
    for category in tree.categories() {
        let label = lexicon.text(category)?;
        let payload = MenuToken::category(category).encode()?;
        buttons.push(Button::new(label, payload));
    }
    Ok(chunk_rows(buttons, width))
}

/// Category page: one button per document plus a back button to the main
/// menu.
pub fn documents_keyboard(
    tree: &MenuTree,
    lexicon: &Lexicon,
    category: &str,
    width: usize,
) -> Result<Vec<Vec<Button>>> {
    let mut buttons = Vec::new();
    for document in tree.documents(category)? {
        let label = lexicon.text(document)?;
        let payload = MenuToken::document(category, document.as_str()).encode()?;
        buttons.push(Button::new(label, payload));
    }
    buttons.push(Button::new(
        lexicon.text(keys::BACK_BUTTON)?,
        MenuToken::main().encode()?,
    ));
    Ok(chunk_rows(buttons, width))
}

/// Document page: a fill button entering the dialogue and a back button to
/// the category page, one per row.
pub fn document_page_keyboard(
    lexicon: &Lexicon,
    category: &str,
    document: &str,
) -> Result<Vec<Vec<Button>>> {
    let fill = Button::new(
        lexicon.text(keys::FILL_BUTTON)?,
        FillToken::new(category, document).encode()?,
    );
    let back = Button::new(
        lexicon.text(keys::BACK_BUTTON)?,
        MenuToken::category(category).encode()?,
    );
    Ok(vec![vec![fill], vec![back]])
}
