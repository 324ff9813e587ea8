mod descriptor;
mod engine;
mod error;
mod options;
pub mod render;
mod state;
mod store;

pub use descriptor::{CustomValidator, FieldDescriptor, FieldKind, FieldValidation, InputOverrides};
pub use engine::{Delta, DynamicForm, SubmitOutcome, SubmitTicket, compute_field_error};
pub use error::FormError;
pub use options::{ChangeCallback, FormOptions, SubmitGate};
pub use render::{
    ChangeHandler, FieldChange, FieldEditor, FieldProps, FieldRenderer, RendererKind, RendererSet,
    SelectionDetail,
};
pub use state::{Errors, FieldStatus, FormPhase, FormState, Values, values_to_json};
pub use store::{MemoryStore, StoreMirror};
