use std::io;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
};
use ratatui::{DefaultTerminal, Frame, layout::Rect};
use tracing::debug;

/// The terminal while a form is on screen.
///
/// Raw mode and the alternate screen come from `ratatui::try_init`, which
/// also restores them on panic. Pasted text arrives as a single event.
pub struct FormTerminal {
    terminal: DefaultTerminal,
}

impl FormTerminal {
    pub fn enter() -> Result<Self> {
        let terminal = ratatui::try_init().context("failed to prepare terminal")?;
        execute!(io::stdout(), EnableBracketedPaste).context("failed to enable bracketed paste")?;
        debug!("terminal prepared");
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> Result<()> {
        self.terminal.draw(render).context("failed to draw form")?;
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.terminal
            .resize(Rect::new(0, 0, width, height))
            .context("failed to resize terminal")
    }
}

impl Drop for FormTerminal {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableBracketedPaste);
        ratatui::restore();
        debug!("terminal restored");
    }
}
