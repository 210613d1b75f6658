pub mod session_manager;
pub mod validation;

pub use session_manager::SessionManager;
