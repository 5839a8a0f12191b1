pub mod lookup;
pub mod orchestrator;
pub mod validator;

pub use lookup::{LookupClient, LookupError};
pub use orchestrator::{ResultReporter, SearchOrchestrator};
