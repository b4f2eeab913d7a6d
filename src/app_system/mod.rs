//! System orchestration, startup, and shutdown logic.

pub mod order_system;
pub mod telemetry;

pub use order_system::*;
pub use telemetry::*;
