use anyhow::Result;

use crate::{
    form::{DynamicForm, Values, values_to_json},
    io::{self, OutputOptions},
};

use super::{options::UiOptions, runtime::App};

/// Interactive terminal front end for a [`DynamicForm`].
#[derive(Debug)]
pub struct FormUI {
    form: DynamicForm,
    title: Option<String>,
    options: UiOptions,
    output: Option<OutputOptions>,
}

impl FormUI {
    pub fn new(form: DynamicForm) -> Self {
        Self {
            form,
            title: None,
            options: UiOptions::default(),
            output: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    /// Write the submitted values once the terminal is restored.
    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = Some(output);
        self
    }

    pub fn run(self) -> Result<Values> {
        let FormUI {
            form,
            title,
            options,
            output,
        } = self;

        let mut app = App::new(form, title, options);
        let values = app.run()?;
        if let Some(output) = output {
            io::emit(&values_to_json(&values), &output)?;
        }
        Ok(values)
    }
}
