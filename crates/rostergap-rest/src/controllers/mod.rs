//! REST API controllers.

pub mod clients_controller;
pub mod health_controller;
pub mod unenrolled_controller;

pub use health_controller::*;
