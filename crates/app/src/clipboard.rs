use anyhow::{Context, Result};
use arboard::Clipboard;

/// Replace the clipboard contents with `text`
pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to write to the clipboard")?;
    Ok(())
}
