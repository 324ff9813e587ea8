use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::template::{MaskTemplate, MaskedText, PendingKey};

/// Editable masked text driven by key events.
///
/// Each keystroke is first applied to the formatted text the way a plain
/// text box would, then the result is re-masked through
/// [`MaskTemplate::apply`] with the key recorded as [`PendingKey`].
#[derive(Debug, Clone)]
pub struct MaskedInput {
    template: MaskTemplate,
    text: MaskedText,
}

impl MaskedInput {
    pub fn new(template: MaskTemplate) -> Self {
        Self {
            template,
            text: MaskedText::default(),
        }
    }

    pub fn with_value(template: MaskTemplate, value: &str) -> Self {
        let mut input = Self::new(template);
        input.set_value(value);
        input
    }

    pub fn template(&self) -> &MaskTemplate {
        &self.template
    }

    pub fn digits(&self) -> &str {
        &self.text.digits
    }

    pub fn formatted(&self) -> &str {
        &self.text.formatted
    }

    pub fn caret(&self) -> usize {
        self.text.caret
    }

    pub fn state(&self) -> &MaskedText {
        &self.text
    }

    /// Replace the contents, leaving the caret at the end.
    pub fn set_value(&mut self, value: &str) {
        let len = value.chars().count();
        self.text = self.template.apply(value, len, "", PendingKey::None);
    }

    /// Swap the template; the digits are kept and re-laid.
    pub fn set_template(&mut self, template: MaskTemplate) {
        let digits = self.text.digits.clone();
        self.template = template;
        self.set_value(&digits);
    }

    pub fn insert(&mut self, ch: char) -> bool {
        let mut chars: Vec<char> = self.text.formatted.chars().collect();
        let caret = self.text.caret.min(chars.len());
        chars.insert(caret, ch);
        let raw: String = chars.into_iter().collect();
        self.commit(&raw, caret + 1, PendingKey::None)
    }

    pub fn backspace(&mut self) -> bool {
        let mut chars: Vec<char> = self.text.formatted.chars().collect();
        let caret = self.text.caret.min(chars.len());
        if caret == 0 {
            return false;
        }
        chars.remove(caret - 1);
        let raw: String = chars.into_iter().collect();
        self.commit(&raw, caret - 1, PendingKey::Backspace)
    }

    pub fn delete(&mut self) -> bool {
        let mut chars: Vec<char> = self.text.formatted.chars().collect();
        let caret = self.text.caret;
        if caret >= chars.len() {
            return false;
        }
        chars.remove(caret);
        let raw: String = chars.into_iter().collect();
        self.commit(&raw, caret, PendingKey::Delete)
    }

    /// Leftmost caret position: just past the template's leading literals.
    fn min_caret(&self) -> usize {
        if self.text.formatted.is_empty() {
            0
        } else {
            self.template.first_slot_offset()
        }
    }

    pub fn move_caret(&mut self, delta: isize) -> bool {
        let len = self.text.formatted.chars().count();
        let next = self
            .text
            .caret
            .saturating_add_signed(delta)
            .clamp(self.min_caret(), len.max(self.min_caret()));
        let moved = next != self.text.caret;
        self.text.caret = next;
        moved
    }

    /// Returns `true` when the key was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return false;
                }
                self.insert(ch)
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_caret(-1),
            KeyCode::Right => self.move_caret(1),
            KeyCode::Home => {
                self.text.caret = self.min_caret();
                true
            }
            KeyCode::End => {
                self.text.caret = self.text.formatted.chars().count();
                true
            }
            _ => false,
        }
    }

    fn commit(&mut self, raw: &str, caret: usize, pending: PendingKey) -> bool {
        let next = self
            .template
            .apply(raw, caret, &self.text.digits, pending);
        let changed = next != self.text;
        self.text = next;
        changed
    }
}
