//! Masked phone-number input and the simpler email/URL formatters.

mod format;
mod input;
mod template;

pub use format::{FormatKind, InputFormat};
pub use input::MaskedInput;
pub use template::{DEFAULT_PATTERN, MaskTemplate, MaskedText, PLACEHOLDER, PendingKey};
