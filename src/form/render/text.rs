use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    form::descriptor::FieldKind,
    mask::{InputFormat, MaskedInput},
    value::FieldValue,
};

use super::{
    FieldChange, FieldEditor, FieldProps, FieldRender, FieldRenderer, PREFIX_WIDTH, RendererKind,
    label_line, message_lines, placeholder_span, value_prefix,
};

const PASSWORD_MASK: char = '•';

/// Free text with an optional phone mask.
#[derive(Debug, Clone)]
pub struct TextEditor {
    buffer: String,
    caret: usize,
    mask: Option<MaskedInput>,
}

impl TextEditor {
    pub fn new(value: &str, format: &InputFormat) -> Self {
        match format.template() {
            Some(template) => {
                let mask = MaskedInput::with_value(template.clone(), value);
                Self {
                    buffer: mask.formatted().to_string(),
                    caret: mask.caret(),
                    mask: Some(mask),
                }
            }
            None => Self {
                buffer: value.to_string(),
                caret: value.chars().count(),
                mask: None,
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Char offset into [`TextEditor::text`].
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Apply `key`; returns `true` when the text changed.
    pub fn handle_key(&mut self, format: &InputFormat, key: &KeyEvent) -> bool {
        if let Some(mask) = self.mask.as_mut() {
            mask.handle_key(key);
            let changed = mask.formatted() != self.buffer;
            self.buffer = mask.formatted().to_string();
            self.caret = mask.caret();
            return changed;
        }

        let mut chars: Vec<char> = self.buffer.chars().collect();
        let caret = self.caret.min(chars.len());
        match key.code {
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return false;
                }
                chars.insert(caret, ch);
                self.commit(format, chars, caret + 1)
            }
            KeyCode::Backspace if caret > 0 => {
                chars.remove(caret - 1);
                self.commit(format, chars, caret - 1)
            }
            KeyCode::Delete if caret < chars.len() => {
                chars.remove(caret);
                self.commit(format, chars, caret)
            }
            KeyCode::Left => {
                self.caret = caret.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.caret = (caret + 1).min(chars.len());
                false
            }
            KeyCode::Home => {
                self.caret = 0;
                false
            }
            KeyCode::End => {
                self.caret = chars.len();
                false
            }
            _ => false,
        }
    }

    fn commit(&mut self, format: &InputFormat, chars: Vec<char>, caret: usize) -> bool {
        let raw: String = chars.iter().collect();
        let formatted = format.format_value(&raw);
        // Characters the formatter dropped before the caret shift it left.
        let before: String = chars[..caret].iter().collect();
        let caret = format
            .format_value(&before)
            .chars()
            .count()
            .min(formatted.chars().count());
        let changed = formatted != self.buffer;
        self.buffer = formatted;
        self.caret = caret;
        changed
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextFieldRenderer;

impl TextFieldRenderer {
    fn display(props: &FieldProps<'_>, text: &str) -> String {
        if props.descriptor.kind == FieldKind::Password {
            text.chars().map(|_| PASSWORD_MASK).collect()
        } else {
            text.to_string()
        }
    }
}

impl FieldRenderer for TextFieldRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Text
    }

    fn editor(&self, props: &FieldProps<'_>) -> FieldEditor {
        FieldEditor::Text(TextEditor::new(&props.value.as_text(), &props.format))
    }

    fn lines(&self, props: &FieldProps<'_>, editor: &FieldEditor, width: u16) -> FieldRender {
        let (text, caret) = match editor {
            FieldEditor::Text(editor) => (editor.text().to_string(), editor.caret()),
            _ => {
                let text = props.value.as_text().into_owned();
                let caret = text.chars().count();
                (text, caret)
            }
        };
        let display = Self::display(props, &text);

        let mut lines = vec![label_line(props)];
        let value_span = if display.is_empty() {
            placeholder_span(props, "")
        } else {
            Span::styled(display.clone(), Style::default().fg(Color::White))
        };
        lines.push(Line::from(vec![value_prefix(props), value_span]));
        lines.extend(message_lines(props, width));

        let before: String = display.chars().take(caret).collect();
        let column = PREFIX_WIDTH.saturating_add(UnicodeWidthStr::width(before.as_str()) as u16);
        FieldRender {
            lines,
            cursor: Some((column, 1)),
        }
    }

    fn handle_key(
        &self,
        props: &FieldProps<'_>,
        editor: &mut FieldEditor,
        key: &KeyEvent,
    ) -> Option<FieldChange> {
        let FieldEditor::Text(editor) = editor else {
            return None;
        };
        editor
            .handle_key(&props.format, key)
            .then(|| FieldChange::new(FieldValue::text(editor.text())))
    }
}
