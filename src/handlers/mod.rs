pub mod execute;
pub mod generate;
pub mod health;
pub mod register;
pub mod retrieve;
pub mod session;

pub use execute::execute_handler;
pub use generate::generate_handler;
pub use health::{health_handler, ready_handler};
pub use register::register_handler;
pub use retrieve::retrieve_handler;
pub use session::session_handler;
