use std::time::Duration;

use crate::form::{FieldRenderer, RendererSet};

#[derive(Debug, Clone)]
pub struct UiOptions {
    pub tick_rate: Duration,
    pub confirm_exit: bool,
    pub show_help: bool,
    pub renderers: RendererSet,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
            confirm_exit: true,
            show_help: true,
            renderers: RendererSet::default(),
        }
    }
}

impl UiOptions {
    pub fn with_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    pub fn with_confirm_exit(mut self, confirm: bool) -> Self {
        self.confirm_exit = confirm;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_renderers(mut self, renderers: RendererSet) -> Self {
        self.renderers = renderers;
        self
    }

    pub fn with_text_renderer(mut self, renderer: impl FieldRenderer + 'static) -> Self {
        self.renderers = self.renderers.with_text(renderer);
        self
    }

    pub fn with_date_renderer(mut self, renderer: impl FieldRenderer + 'static) -> Self {
        self.renderers = self.renderers.with_date(renderer);
        self
    }

    pub fn with_time_renderer(mut self, renderer: impl FieldRenderer + 'static) -> Self {
        self.renderers = self.renderers.with_time(renderer);
        self
    }
}
