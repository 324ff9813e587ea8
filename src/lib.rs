#![deny(rust_2018_idioms)]

pub mod calendar;
pub mod form;
pub mod io;
pub mod mask;
pub mod validate;
pub mod value;

#[cfg(feature = "tui")]
mod app;

#[cfg(feature = "tui")]
pub use app::{FormUI, UiOptions};
pub use form::{DynamicForm, FieldDescriptor, FieldKind, FormError, FormOptions, SubmitOutcome};
pub use value::FieldValue;

pub mod prelude {
    #[cfg(feature = "tui")]
    pub use super::{FormUI, UiOptions};
    pub use super::{
        calendar::{HourFormat, build_month_matrix},
        form::{
            Delta, DynamicForm, FieldDescriptor, FieldKind, FormError, FormOptions, InputOverrides,
            MemoryStore, StoreMirror, SubmitOutcome, Values,
        },
        mask::{InputFormat, MaskTemplate, MaskedInput},
        validate::{ValidatorKind, ValidatorRef, ValidatorRegistry},
        value::FieldValue,
    };
}
