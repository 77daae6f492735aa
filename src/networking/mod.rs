//! Remote services
//!
//! - [`completion`] - chat-completion client used by AI players
//! - [`expert`] - chess expert questions, facts and analysis
//! - [`auth`] - login and registration against the auth service

pub mod auth;
pub mod completion;
pub mod expert;

pub use auth::{AuthClient, AuthOutcome, AuthUser};
pub use completion::{CompletionClient, DisabledCompletion, OpenRouterClient};
pub use expert::ExpertService;
