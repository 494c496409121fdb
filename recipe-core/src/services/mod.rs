//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account;
pub mod credential;
pub mod logging;
pub mod migration;
mod recipe;

pub use account::AccountManager;
pub use credential::CredentialStore;
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use recipe::RecipeService;
