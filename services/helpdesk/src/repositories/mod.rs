//! Repositories for database operations

pub mod log_history;
pub mod profile;
pub mod role;
pub mod ticket;
pub mod user;

pub use log_history::LogHistoryRepository;
pub use profile::ProfileRepository;
pub use role::RoleRepository;
pub use ticket::TicketRepository;
pub use user::{CreateUserError, UserRepository};
