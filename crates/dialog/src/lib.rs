pub mod machine;
pub mod options;
pub mod orchestrator;
pub mod session;

pub use machine::{CancelSource, CloseReason, DialogMachine, DialogPhase, SubmitRejection};
pub use options::{BaseUrlChoice, DialogOptions, DialogOverrides, DEFAULT_STORAGE_KEY};
pub use orchestrator::{ConfigOrchestrator, DialogPresenter};
pub use session::{
    CredentialDialog, DialogEvent, DialogHandle, DialogOutcome, DialogView, SessionOutcome,
};
