use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::form::{DynamicForm, FieldEditor, RendererSet};

pub struct ViewContext<'a> {
    pub title: Option<&'a str>,
    pub form: &'a DynamicForm,
    pub editors: &'a [FieldEditor],
    pub focus: usize,
    pub renderers: &'a RendererSet,
    pub status_message: &'a str,
    pub help: Option<&'a str>,
}

pub fn draw(frame: &mut Frame<'_>, ctx: ViewContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(frame.area());

    render_fields(frame, chunks[0], &ctx);
    render_footer(frame, chunks[1], &ctx);
}

fn render_fields(frame: &mut Frame<'_>, area: Rect, ctx: &ViewContext<'_>) {
    let block = Block::default()
        .title(ctx.title.unwrap_or("Form").to_string())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut focus_span = (0u16, 0u16);
    let mut cursor = None;
    for (idx, editor) in ctx.editors.iter().enumerate() {
        let focused = idx == ctx.focus;
        let Some(props) = ctx.form.field_props_at(idx, focused) else {
            continue;
        };
        let render = ctx
            .renderers
            .for_props(&props)
            .lines(&props, editor, inner.width);
        let start = lines.len() as u16;
        if focused {
            focus_span = (start, render.lines.len() as u16);
            cursor = render
                .cursor
                .map(|(column, line)| (column, start.saturating_add(line)));
        }
        lines.extend(render.lines);
        lines.push(Line::default());
    }
    lines.push(submit_line(ctx.form));

    // Keep the focused field on screen.
    let (start, height) = focus_span;
    let bottom = start.saturating_add(height);
    let scroll = bottom.saturating_sub(inner.height).min(start);

    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);

    if let Some((column, line)) = cursor {
        let line = line.saturating_sub(scroll);
        if line < inner.height {
            frame.set_cursor_position(Position::new(
                inner.x.saturating_add(column.min(inner.width.saturating_sub(1))),
                inner.y.saturating_add(line),
            ));
        }
    }
}

fn submit_line(form: &DynamicForm) -> Line<'static> {
    let style = if form.is_submit_disabled() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("[ {} ]", form.submit_label()), style),
        Span::styled("  Ctrl+S", Style::default().fg(Color::DarkGray)),
    ])
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, ctx: &ViewContext<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let actions = ctx.help.unwrap_or(" ");
    let actions_widget = Paragraph::new(format!("Actions: {actions}"))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(actions_widget, rows[0]);

    let error_count = ctx.form.errors().len();
    let mut status = ctx.status_message.to_string();
    if ctx.form.is_dirty() {
        status.push_str(" • unsubmitted changes");
    }
    if let Some(field) = ctx.form.fields().get(ctx.focus) {
        status.push_str(" • focus: ");
        status.push_str(&field.label);
    }

    let badge = if error_count > 0 {
        Span::styled(
            format!("[! {error_count}]"),
            Style::default().fg(Color::Red).bg(Color::Black),
        )
    } else {
        Span::styled("[ok]", Style::default().fg(Color::Green))
    };

    let status_widget = Paragraph::new(Line::from(vec![
        Span::raw("Status: "),
        Span::raw(status),
        Span::raw(" "),
        badge,
    ]))
    .wrap(Wrap { trim: true });
    frame.render_widget(status_widget, rows[1]);
}
