use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use tracing::{debug, warn};

use crate::form::{DynamicForm, FieldEditor, SubmitOutcome, Values};

use super::{
    input::{HELP_TEXT, KeyCommand, classify},
    options::UiOptions,
    status::StatusLine,
    terminal::FormTerminal,
    view::{self, ViewContext},
};

pub(crate) struct App {
    form: DynamicForm,
    options: UiOptions,
    title: Option<String>,
    editors: Vec<FieldEditor>,
    focus: usize,
    status: StatusLine,
    exit_armed: bool,
    should_quit: bool,
    result: Option<Values>,
}

impl App {
    pub fn new(form: DynamicForm, title: Option<String>, options: UiOptions) -> Self {
        let mut app = Self {
            form,
            options,
            title,
            editors: Vec::new(),
            focus: 0,
            status: StatusLine::new(),
            exit_armed: false,
            should_quit: false,
            result: None,
        };
        app.editors = (0..app.form.fields().len())
            .filter_map(|idx| app.build_editor(idx))
            .collect();
        app
    }

    fn build_editor(&self, index: usize) -> Option<FieldEditor> {
        let props = self.form.field_props_at(index, index == self.focus)?;
        Some(self.options.renderers.for_props(&props).editor(&props))
    }

    pub fn run(&mut self) -> Result<Values> {
        let mut terminal = FormTerminal::enter()?;
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(self.options.tick_rate)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Paste(text) => self.handle_paste(&text),
                Event::Resize(width, height) => terminal.resize(width, height)?,
                Event::Mouse(_) | Event::FocusGained | Event::FocusLost => {}
            }
        }

        self.result
            .take()
            .ok_or_else(|| anyhow!("user exited without submitting"))
    }

    pub fn form(&self) -> &DynamicForm {
        &self.form
    }

    pub fn take_result(&mut self) -> Option<Values> {
        self.result.take()
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        view::draw(
            frame,
            ViewContext {
                title: self.title.as_deref(),
                form: &self.form,
                editors: &self.editors,
                focus: self.focus,
                renderers: &self.options.renderers,
                status_message: self.status.message(),
                help: self.options.show_help.then_some(HELP_TEXT),
            },
        );
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match classify(&key) {
            KeyCommand::Submit => {
                self.exit_armed = false;
                self.on_submit();
            }
            KeyCommand::Quit => self.on_exit(),
            KeyCommand::NextField => self.move_focus(1),
            KeyCommand::PrevField => self.move_focus(-1),
            KeyCommand::ResetStatus => {
                self.exit_armed = false;
                self.status.ready();
            }
            KeyCommand::Edit(event) => self.handle_field_input(&event),
            KeyCommand::None => {}
        }
    }

    fn handle_paste(&mut self, text: &str) {
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            self.handle_field_input(&KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    fn handle_field_input(&mut self, key: &KeyEvent) {
        let Some(props) = self.form.field_props_at(self.focus, true) else {
            return;
        };
        let Some(editor) = self.editors.get_mut(self.focus) else {
            return;
        };
        let renderer = self.options.renderers.for_props(&props);
        let change = renderer.handle_key(&props, editor, key);
        let label = props.label.to_string();
        let handler = props.on_change.clone();

        let Some(change) = change else {
            return;
        };
        self.exit_armed = false;
        match handler.emit(&mut self.form, change) {
            Ok(_) => self.status.value_updated(&label),
            Err(err) => {
                warn!(field = handler.name(), %err, "field update rejected");
                self.status.set_raw(err.to_string());
            }
        }
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.editors.len();
        if len == 0 {
            return;
        }
        self.focus_index((self.focus as isize + delta).rem_euclid(len as isize) as usize);
    }

    fn focus_index(&mut self, index: usize) {
        self.exit_armed = false;
        self.focus = index;
        if let Some(editor) = self.build_editor(index)
            && let Some(slot) = self.editors.get_mut(index)
        {
            *slot = editor;
        }
        if let Some(field) = self.form.fields().get(index) {
            debug!(field = %field.name, "focus moved");
            let label = field.label.clone();
            self.status.editing(&label);
        }
    }

    fn on_submit(&mut self) {
        match self.form.submit() {
            SubmitOutcome::Submitted(values) => {
                self.status.submitted();
                self.result = Some(values);
                self.should_quit = true;
            }
            SubmitOutcome::Invalid(errors) => {
                let first = errors
                    .keys()
                    .next()
                    .and_then(|name| self.form.fields().iter().position(|f| &f.name == name));
                if let Some(index) = first {
                    self.focus_index(index);
                }
                self.status.issues_remaining(errors.len());
            }
            SubmitOutcome::Rejected(reason) => self.status.rejected(&reason),
            SubmitOutcome::Disabled => self.status.submit_disabled(),
            SubmitOutcome::Busy => self.status.busy(),
        }
    }

    fn on_exit(&mut self) {
        if self.options.confirm_exit && self.form.is_dirty() && !self.exit_armed {
            self.exit_armed = true;
            self.status.pending_exit();
            return;
        }
        self.should_quit = true;
    }
}
