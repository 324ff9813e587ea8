use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use tracing::warn;

use crate::{
    calendar::{
        DateBounds, DateCell, DateSelectionDetail, add_days, build_month_matrix, clamp_date,
        month_label, shift_month, weekday_labels,
    },
    value::FieldValue,
};

use super::{
    FieldChange, FieldEditor, FieldProps, FieldRender, FieldRenderer, RendererKind, SelectionDetail,
    label_line, message_lines, placeholder_span, value_prefix,
};

/// Cursor day of the picker. The displayed month follows the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateEditor {
    cursor: NaiveDate,
    today: NaiveDate,
}

impl DateEditor {
    pub fn new(selected: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            cursor: selected.unwrap_or(today),
            today,
        }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn move_days(&mut self, delta: i64) {
        self.cursor = add_days(self.cursor, delta);
    }

    /// Same day in another month, clamped to that month's length.
    pub fn move_months(&mut self, delta: i32) {
        let (year, month) = shift_month(self.cursor.year(), self.cursor.month0(), delta);
        let mut day = self.cursor.day();
        loop {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month + 1, day) {
                self.cursor = date;
                return;
            }
            if day <= 28 {
                return;
            }
            day -= 1;
        }
    }
}

/// Month-grid date picker.
#[derive(Debug, Clone, Default)]
pub struct DateFieldRenderer {
    /// Extra predicate on top of each field's `min_date`/`max_date`.
    disabled: Option<DateBounds>,
}

impl DateFieldRenderer {
    /// Refuse any day matching `predicate`, for every date field.
    pub fn with_disabled<F>(predicate: F) -> Self
    where
        F: Fn(NaiveDate) -> bool + Send + Sync + 'static,
    {
        Self {
            disabled: Some(DateBounds::default().with_disabled(predicate)),
        }
    }

    fn bounds(&self, props: &FieldProps<'_>) -> DateBounds {
        let mut bounds = self.disabled.clone().unwrap_or_default();
        bounds.min = props.input.min_date;
        bounds.max = props.input.max_date;
        bounds
    }

    fn first_day(props: &FieldProps<'_>) -> u32 {
        props.input.first_day_of_week.unwrap_or(0)
    }

    fn grid_lines(&self, props: &FieldProps<'_>, editor: &DateEditor) -> Vec<Line<'static>> {
        let cursor = editor.cursor();
        let first_day = Self::first_day(props);
        let Ok(mut matrix) = build_month_matrix(cursor.year(), cursor.month0(), first_day) else {
            return Vec::new();
        };
        matrix.decorate(editor.today(), props.value.as_date(), &self.bounds(props));

        let mut lines = Vec::with_capacity(8);
        lines.push(Line::from(Span::styled(
            format!("    {}", month_label(matrix.year(), matrix.month())),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let header: Vec<Span<'static>> = std::iter::once(Span::raw("    "))
            .chain(weekday_labels(first_day).into_iter().map(|label| {
                let short: String = label.chars().take(2).collect();
                Span::styled(format!("{short} "), Style::default().fg(Color::DarkGray))
            }))
            .collect();
        lines.push(Line::from(header));
        for week in matrix.weeks() {
            let mut spans = vec![Span::raw("    ")];
            for cell in week {
                spans.push(Span::styled(
                    format!("{:>2}", cell.date.day()),
                    cell_style(cell, cell.date == cursor),
                ));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

fn cell_style(cell: &DateCell, is_cursor: bool) -> Style {
    let mut style = Style::default();
    if !cell.in_month {
        style = style.fg(Color::DarkGray);
    }
    if cell.is_disabled {
        style = style.fg(Color::Red).add_modifier(Modifier::DIM);
    }
    if cell.is_selected {
        style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
    }
    if cell.is_today {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if is_cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

impl FieldRenderer for DateFieldRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Date
    }

    fn editor(&self, props: &FieldProps<'_>) -> FieldEditor {
        let today = Local::now().date_naive();
        let mut editor = DateEditor::new(props.value.as_date(), today);
        editor.cursor = clamp_date(editor.cursor, props.input.min_date, props.input.max_date);
        FieldEditor::Date(editor)
    }

    fn lines(&self, props: &FieldProps<'_>, editor: &FieldEditor, width: u16) -> FieldRender {
        let mut lines = vec![label_line(props)];
        let value_span = match props.value.as_date() {
            Some(date) => Span::styled(
                date.format("%Y-%m-%d").to_string(),
                Style::default().fg(Color::White),
            ),
            None => placeholder_span(props, "YYYY-MM-DD"),
        };
        lines.push(Line::from(vec![value_prefix(props), value_span]));
        if props.focused
            && let FieldEditor::Date(editor) = editor
        {
            lines.extend(self.grid_lines(props, editor));
        }
        lines.extend(message_lines(props, width));
        FieldRender {
            lines,
            cursor: None,
        }
    }

    fn handle_key(
        &self,
        props: &FieldProps<'_>,
        editor: &mut FieldEditor,
        key: &KeyEvent,
    ) -> Option<FieldChange> {
        let FieldEditor::Date(editor) = editor else {
            return None;
        };
        match key.code {
            KeyCode::Left => editor.move_days(-1),
            KeyCode::Right => editor.move_days(1),
            KeyCode::Up => editor.move_days(-7),
            KeyCode::Down => editor.move_days(7),
            KeyCode::PageUp => editor.move_months(-1),
            KeyCode::PageDown => editor.move_months(1),
            KeyCode::Home => editor.cursor = editor.today,
            KeyCode::Enter | KeyCode::Char(' ') => {
                let date = editor.cursor();
                if self.bounds(props).is_disabled(date) {
                    warn!(field = props.name, %date, "disabled date refused");
                    return None;
                }
                return Some(
                    FieldChange::new(FieldValue::Date(Some(date)))
                        .with_detail(SelectionDetail::Date(DateSelectionDetail::from(date))),
                );
            }
            KeyCode::Delete | KeyCode::Backspace => {
                return props
                    .value
                    .as_date()
                    .is_some()
                    .then(|| FieldChange::new(FieldValue::Date(None)));
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::form::{DynamicForm, FieldDescriptor, FieldKind, FormOptions, InputOverrides};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn form_with(input: InputOverrides) -> DynamicForm {
        DynamicForm::new(
            vec![FieldDescriptor::new("when", FieldKind::Date).with_input(input)],
            FormOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn month_moves_clamp_the_day() {
        let mut editor = DateEditor::new(Some(day(2024, 1, 31)), day(2024, 1, 1));
        editor.move_months(1);
        assert_eq!(editor.cursor(), day(2024, 2, 29));
        editor.move_months(-2);
        assert_eq!(editor.cursor(), day(2023, 12, 29));
    }

    #[test]
    fn enter_selects_with_detail() {
        let form = form_with(InputOverrides::default());
        let props = form.field_props("when", true).unwrap();
        let renderer = DateFieldRenderer::default();
        let mut editor = FieldEditor::Date(DateEditor::new(Some(day(2024, 3, 15)), day(2024, 3, 1)));

        assert!(renderer.handle_key(&props, &mut editor, &key(KeyCode::Right)).is_none());
        let change = renderer
            .handle_key(&props, &mut editor, &key(KeyCode::Enter))
            .unwrap();
        assert_eq!(change.value, FieldValue::Date(Some(day(2024, 3, 16))));
        assert_eq!(
            change.detail,
            Some(SelectionDetail::Date(DateSelectionDetail {
                day: 16,
                month: 3,
                year: 2024,
                iso: "2024-03-16".into(),
            }))
        );
    }

    #[test]
    fn disabled_days_are_refused() {
        let form = form_with(InputOverrides {
            max_date: Some(day(2024, 3, 15)),
            ..InputOverrides::default()
        });
        let props = form.field_props("when", true).unwrap();
        let renderer = DateFieldRenderer::with_disabled(|date| date.weekday().num_days_from_sunday() == 0);
        let mut editor = FieldEditor::Date(DateEditor::new(Some(day(2024, 3, 15)), day(2024, 3, 1)));

        renderer.handle_key(&props, &mut editor, &key(KeyCode::Right));
        assert!(renderer.handle_key(&props, &mut editor, &key(KeyCode::Enter)).is_none());

        // 2024-03-10 is a Sunday
        let mut editor = FieldEditor::Date(DateEditor::new(Some(day(2024, 3, 10)), day(2024, 3, 1)));
        assert!(renderer.handle_key(&props, &mut editor, &key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn focused_render_shows_month_grid() {
        let mut form = form_with(InputOverrides {
            first_day_of_week: Some(1),
            ..InputOverrides::default()
        });
        form.set_value("when", day(2024, 3, 15)).unwrap();
        let props = form.field_props("when", true).unwrap();
        let renderer = DateFieldRenderer::default();
        let editor = FieldEditor::Date(DateEditor::new(Some(day(2024, 3, 15)), day(2024, 3, 1)));
        let render = renderer.lines(&props, &editor, 40);

        assert_eq!(render.lines[1].to_string(), "» 2024-03-15");
        assert_eq!(render.lines[2].to_string(), "    March 2024");
        assert!(render.lines[3].to_string().starts_with("    Mo Tu"));
        // label, value, month, weekdays, six weeks
        assert_eq!(render.lines.len(), 10);
        assert_eq!(renderer.height(&props, &editor, 40), 10);

        let unfocused = form.field_props("when", false).unwrap();
        assert_eq!(renderer.lines(&unfocused, &editor, 40).lines.len(), 2);
    }

    #[test]
    fn delete_clears_a_set_date() {
        let mut form = form_with(InputOverrides::default());
        form.set_value("when", day(2024, 3, 15)).unwrap();
        let props = form.field_props("when", true).unwrap();
        let renderer = DateFieldRenderer::default();
        let mut editor = renderer.editor(&props);
        let change = renderer
            .handle_key(&props, &mut editor, &key(KeyCode::Delete))
            .unwrap();
        assert_eq!(change.value, FieldValue::Date(None));
    }
}
