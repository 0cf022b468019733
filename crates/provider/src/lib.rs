pub mod error;
pub mod probe;
pub mod store;
pub mod types;

pub use error::{CredentialError, CredentialResult};
pub use probe::{HttpProbe, ModelProbe};
pub use store::{ConfigStore, FileStore, MemoryStore};
pub use types::*;
