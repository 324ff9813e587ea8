//! Terminal renderers for form fields.
//!
//! The form picks a renderer per field kind through [`RendererSet`]; each
//! renderer owns the editing state of its field in a [`FieldEditor`] and
//! reports edits as [`FieldChange`]s that the caller feeds back through the
//! field's [`ChangeHandler`].

mod date;
mod text;
mod time;

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use serde::Serialize;
use textwrap::wrap;

use crate::{
    calendar::{DateSelectionDetail, TimeSelectionDetail},
    mask::InputFormat,
    value::FieldValue,
};

use super::{
    descriptor::{FieldDescriptor, InputOverrides},
    engine::{Delta, DynamicForm},
    error::FormError,
};

pub use date::{DateEditor, DateFieldRenderer};
pub use text::{TextEditor, TextFieldRenderer};
pub use time::{TimeEditor, TimeFieldRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    Text,
    Date,
    Time,
}

/// Change handler bound to one field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeHandler {
    name: String,
}

impl ChangeHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn emit(&self, form: &mut DynamicForm, change: FieldChange) -> Result<Delta, FormError> {
        form.set_value_with_detail(&self.name, change.value, change.detail)
    }
}

/// Everything a renderer needs to draw one field.
#[derive(Debug, Clone)]
pub struct FieldProps<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub name: &'a str,
    pub label: &'a str,
    pub value: &'a FieldValue,
    pub on_change: ChangeHandler,
    pub error: Option<&'a str>,
    pub helper_text: Option<&'a str>,
    pub placeholder: Option<&'a str>,
    pub required: bool,
    pub focused: bool,
    pub input: &'a InputOverrides,
    pub format: InputFormat,
}

impl FieldProps<'_> {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The error when there is one, otherwise the helper text.
    pub fn message(&self) -> Option<&str> {
        self.error.or(self.helper_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SelectionDetail {
    Date(DateSelectionDetail),
    Time(TimeSelectionDetail),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub value: FieldValue,
    pub detail: Option<SelectionDetail>,
}

impl FieldChange {
    pub fn new(value: FieldValue) -> Self {
        Self {
            value,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: SelectionDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Editing state kept between key presses.
#[derive(Debug, Clone)]
pub enum FieldEditor {
    Text(TextEditor),
    Date(DateEditor),
    Time(TimeEditor),
}

/// Lines of one field plus where the cursor sits, relative to the first line.
#[derive(Debug, Clone, Default)]
pub struct FieldRender {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<(u16, u16)>,
}

pub trait FieldRenderer: Send + Sync {
    fn kind(&self) -> RendererKind;

    /// Fresh editing state seeded from the current value.
    fn editor(&self, props: &FieldProps<'_>) -> FieldEditor;

    fn lines(&self, props: &FieldProps<'_>, editor: &FieldEditor, width: u16) -> FieldRender;

    /// Returns a change when the key produced a new value.
    fn handle_key(
        &self,
        props: &FieldProps<'_>,
        editor: &mut FieldEditor,
        key: &KeyEvent,
    ) -> Option<FieldChange>;

    fn height(&self, props: &FieldProps<'_>, editor: &FieldEditor, width: u16) -> u16 {
        self.lines(props, editor, width).lines.len() as u16
    }

    /// Draw into `area`; returns the absolute cursor position when focused.
    fn render(
        &self,
        props: &FieldProps<'_>,
        editor: &FieldEditor,
        area: Rect,
        buf: &mut Buffer,
    ) -> Option<Position> {
        let render = self.lines(props, editor, area.width);
        Paragraph::new(render.lines).render(area, buf);
        let (column, line) = render.cursor?;
        if !props.focused || line >= area.height {
            return None;
        }
        Some(Position::new(
            area.x.saturating_add(column.min(area.width.saturating_sub(1))),
            area.y.saturating_add(line),
        ))
    }
}

/// The renderer used for each [`RendererKind`]; any of them can be swapped.
#[derive(Clone)]
pub struct RendererSet {
    text: Arc<dyn FieldRenderer>,
    date: Arc<dyn FieldRenderer>,
    time: Arc<dyn FieldRenderer>,
}

impl Default for RendererSet {
    fn default() -> Self {
        Self {
            text: Arc::new(TextFieldRenderer),
            date: Arc::new(DateFieldRenderer::default()),
            time: Arc::new(TimeFieldRenderer::default()),
        }
    }
}

impl RendererSet {
    pub fn with_text(mut self, renderer: impl FieldRenderer + 'static) -> Self {
        self.text = Arc::new(renderer);
        self
    }

    pub fn with_date(mut self, renderer: impl FieldRenderer + 'static) -> Self {
        self.date = Arc::new(renderer);
        self
    }

    pub fn with_time(mut self, renderer: impl FieldRenderer + 'static) -> Self {
        self.time = Arc::new(renderer);
        self
    }

    pub fn for_kind(&self, kind: RendererKind) -> &dyn FieldRenderer {
        match kind {
            RendererKind::Text => self.text.as_ref(),
            RendererKind::Date => self.date.as_ref(),
            RendererKind::Time => self.time.as_ref(),
        }
    }

    pub fn for_props(&self, props: &FieldProps<'_>) -> &dyn FieldRenderer {
        self.for_kind(props.descriptor.kind.renderer())
    }
}

impl std::fmt::Debug for RendererSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererSet")
            .field("text", &self.text.kind())
            .field("date", &self.date.kind())
            .field("time", &self.time.kind())
            .finish()
    }
}

fn label_line(props: &FieldProps<'_>) -> Line<'static> {
    let mut label = props.label.to_string();
    if props.required {
        label.push_str(" *");
    }
    let style = if props.focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    };
    Line::from(Span::styled(label, style))
}

fn value_prefix(props: &FieldProps<'_>) -> Span<'static> {
    if props.focused {
        Span::styled("» ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("  ")
    }
}

/// Width taken by [`value_prefix`].
const PREFIX_WIDTH: u16 = 2;

fn placeholder_span(props: &FieldProps<'_>, fallback: &str) -> Span<'static> {
    Span::styled(
        props.placeholder.unwrap_or(fallback).to_string(),
        Style::default().fg(Color::DarkGray),
    )
}

fn message_lines(props: &FieldProps<'_>, width: u16) -> Vec<Line<'static>> {
    let Some(message) = props.message() else {
        return Vec::new();
    };
    let style = if props.has_error() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let clamp_width = width.saturating_sub(4).max(4) as usize;
    wrap(message, clamp_width)
        .into_iter()
        .map(|line| Line::from(Span::styled(format!("    {line}"), style)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldKind, FormOptions};

    #[test]
    fn renderer_set_dispatches_by_kind() {
        let set = RendererSet::default();
        assert_eq!(set.for_kind(RendererKind::Date).kind(), RendererKind::Date);
        assert_eq!(set.for_kind(RendererKind::Time).kind(), RendererKind::Time);
        assert_eq!(set.for_kind(RendererKind::Text).kind(), RendererKind::Text);

        let form = DynamicForm::new(
            vec![
                crate::form::FieldDescriptor::new("when", FieldKind::Date),
                crate::form::FieldDescriptor::new("email", FieldKind::Email),
            ],
            FormOptions::default(),
        )
        .unwrap();
        let props = form.field_props("when", false).unwrap();
        assert_eq!(set.for_props(&props).kind(), RendererKind::Date);
        let props = form.field_props("email", false).unwrap();
        assert_eq!(set.for_props(&props).kind(), RendererKind::Text);
    }

    #[test]
    fn change_handler_writes_through_the_form() {
        let mut form = DynamicForm::new(
            vec![crate::form::FieldDescriptor::text("name")],
            FormOptions::default(),
        )
        .unwrap();
        let handler = form.field_props("name", true).unwrap().on_change;
        let delta = handler
            .emit(&mut form, FieldChange::new(FieldValue::text("Ada")))
            .unwrap();
        assert_eq!(delta.value, FieldValue::text("Ada"));
        assert!(delta.detail.is_none());
        assert_eq!(form.value("name"), Some(&FieldValue::text("Ada")));
    }

    #[test]
    fn picker_detail_reaches_the_change_callback() {
        use std::sync::Mutex;

        use chrono::NaiveDate;
        use crossterm::event::{KeyCode, KeyModifiers};

        let seen: Arc<Mutex<Vec<Option<SelectionDetail>>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let options = FormOptions::default().with_on_change(move |_, delta| {
            sink.lock().unwrap().push(delta.detail.clone());
        });
        let mut form = DynamicForm::new(
            vec![crate::form::FieldDescriptor::new("when", FieldKind::Date)],
            options,
        )
        .unwrap();
        form.set_value("when", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .unwrap();

        let props = form.field_props("when", true).unwrap();
        let renderer = DateFieldRenderer::default();
        let mut editor = renderer.editor(&props);
        let change = renderer
            .handle_key(&props, &mut editor, &KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        let handler = props.on_change.clone();
        let delta = handler.emit(&mut form, change).unwrap();

        let expected = SelectionDetail::Date(DateSelectionDetail::from(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        ));
        assert_eq!(delta.detail, Some(expected.clone()));
        assert_eq!(*seen.lock().unwrap(), vec![None, Some(expected)]);
    }

    #[test]
    fn render_places_label_and_value() {
        let form = DynamicForm::new(
            vec![
                crate::form::FieldDescriptor::text("name")
                    .with_label("Name")
                    .with_default("Ada"),
            ],
            FormOptions::default(),
        )
        .unwrap();
        let props = form.field_props("name", true).unwrap();
        let renderer = TextFieldRenderer;
        let editor = renderer.editor(&props);
        let area = Rect::new(0, 0, 20, renderer.height(&props, &editor, 20));
        let mut buf = Buffer::empty(area);
        let cursor = renderer.render(&props, &editor, area, &mut buf);

        let row = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        };
        assert!(row(0).starts_with("Name"));
        assert!(row(1).starts_with("» Ada"));
        assert_eq!(cursor, Some(Position::new(5, 1)));
    }
}
