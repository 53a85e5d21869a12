//! Core types for the activity shell: configuration, the error taxonomy,
//! intents and parameter bags, the activity draft, and the remote API port.

pub mod config;
pub mod crm;
pub mod domain;
pub mod errors;

pub use crm::{ActivityApi, ApiResponse};
pub use domain::activity::{ActivityDraft, ActivityField, ActivityId, DueTime, Participant};
pub use domain::intent::{CanonicalMethod, ParamBag, ParsedIntent};
pub use errors::{FieldFormatError, RemoteError, ShellError};
