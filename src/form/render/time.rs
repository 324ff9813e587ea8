use chrono::{Local, NaiveTime, Timelike};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use tracing::warn;

use crate::{
    calendar::{HourFormat, TimeBounds, TimeSelectionDetail, format_time},
    value::FieldValue,
};

use super::{
    FieldChange, FieldEditor, FieldProps, FieldRender, FieldRenderer, RendererKind, SelectionDetail,
    label_line, message_lines, placeholder_span, value_prefix,
};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Time being adjusted; committed on every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeEditor {
    cursor: NaiveTime,
}

impl TimeEditor {
    pub fn new(cursor: NaiveTime) -> Self {
        Self { cursor }
    }

    pub fn cursor(&self) -> NaiveTime {
        self.cursor
    }
}

fn minutes_of(time: NaiveTime) -> i64 {
    i64::from(time.hour() * 60 + time.minute())
}

fn from_minutes(total: i64) -> NaiveTime {
    let total = total.rem_euclid(MINUTES_PER_DAY) as u32;
    NaiveTime::from_hms_opt(total / 60, total % 60, 0).unwrap_or(NaiveTime::MIN)
}

/// Next (or previous) multiple of `step` strictly past `time`, wrapping at midnight.
fn step_minutes(time: NaiveTime, step: u32, forward: bool) -> NaiveTime {
    let step = i64::from(step.clamp(1, 60));
    let total = minutes_of(time);
    let next = if forward {
        (total / step + 1) * step
    } else if total % step == 0 {
        total - step
    } else {
        total - total % step
    };
    from_minutes(next)
}

/// Hour/minute stepper for time fields.
#[derive(Debug, Clone, Default)]
pub struct TimeFieldRenderer {
    /// Extra predicate on top of each field's `min_time`/`max_time`.
    disabled: Option<TimeBounds>,
}

impl TimeFieldRenderer {
    /// Refuse any `(hours, minutes)` matching `predicate`, for every time field.
    pub fn with_disabled<F>(predicate: F) -> Self
    where
        F: Fn(u32, u32) -> bool + Send + Sync + 'static,
    {
        Self {
            disabled: Some(TimeBounds::default().with_disabled(predicate)),
        }
    }

    fn bounds(&self, props: &FieldProps<'_>) -> TimeBounds {
        self.disabled
            .clone()
            .unwrap_or_default()
            .with_range(props.input.min_time.as_deref(), props.input.max_time.as_deref())
    }

    fn hint(format: HourFormat) -> &'static str {
        match format {
            HourFormat::H12 => "    ↑/↓ hour  ←/→ minute  p AM/PM  n now  Del clear",
            HourFormat::H24 => "    ↑/↓ hour  ←/→ minute  n now  Del clear",
        }
    }
}

impl FieldRenderer for TimeFieldRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Time
    }

    fn editor(&self, props: &FieldProps<'_>) -> FieldEditor {
        let fallback = props
            .input
            .min_time
            .as_deref()
            .and_then(|raw| NaiveTime::parse_from_str(raw, "%H:%M").ok())
            .unwrap_or(NaiveTime::MIN);
        FieldEditor::Time(TimeEditor::new(props.value.as_time().unwrap_or(fallback)))
    }

    fn lines(&self, props: &FieldProps<'_>, _editor: &FieldEditor, width: u16) -> FieldRender {
        let format = props.input.hour_format;
        let mut lines = vec![label_line(props)];
        let value_span = match props.value.as_time() {
            Some(time) => Span::styled(
                format_time(time, format),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            None => placeholder_span(
                props,
                match format {
                    HourFormat::H12 => "--:-- --",
                    HourFormat::H24 => "--:--",
                },
            ),
        };
        lines.push(Line::from(vec![value_prefix(props), value_span]));
        if props.focused {
            lines.push(Line::from(Span::styled(
                Self::hint(format),
                Style::default().fg(Color::DarkGray),
            )));
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
        let FieldEditor::Time(editor) = editor else {
            return None;
        };
        let format = props.input.hour_format;
        let step = props.input.minute_step.unwrap_or(1);
        let current = editor.cursor;
        let next = match key.code {
            KeyCode::Up => from_minutes(minutes_of(current) + 60),
            KeyCode::Down => from_minutes(minutes_of(current) - 60),
            KeyCode::Right => step_minutes(current, step, true),
            KeyCode::Left => step_minutes(current, step, false),
            KeyCode::Char('p') | KeyCode::Char('P') if format == HourFormat::H12 => {
                from_minutes(minutes_of(current) + 12 * 60)
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                let now = Local::now().time();
                from_minutes(minutes_of(now))
            }
            KeyCode::Enter => current,
            KeyCode::Delete | KeyCode::Backspace => {
                return props
                    .value
                    .as_time()
                    .is_some()
                    .then(|| FieldChange::new(FieldValue::Time(None)));
            }
            _ => return None,
        };
        if self.bounds(props).is_disabled(next) {
            warn!(field = props.name, time = %next, "time outside allowed range refused");
            return None;
        }
        editor.cursor = next;
        Some(
            FieldChange::new(FieldValue::Time(Some(next)))
                .with_detail(SelectionDetail::Time(TimeSelectionDetail::new(next, format))),
        )
    }
}
