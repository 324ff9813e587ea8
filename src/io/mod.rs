mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{load_fields_str, load_fields_value, load_values_str, parse_document_str};
pub use output::{OutputDestination, OutputOptions, emit, render_values};
