use thiserror::Error;

use crate::{calendar::CalendarError, value::ValueError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),
    #[error("no field named `{0}`")]
    UnknownField(String),
    #[error("invalid value for `{name}`: {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: ValueError,
    },
    #[error("invalid calendar settings for `{name}`: {source}")]
    Calendar {
        name: String,
        #[source]
        source: CalendarError,
    },
}
