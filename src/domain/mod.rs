pub mod recipe;
pub mod cart;
pub mod order;
pub mod notification;
mod timestamp;

pub use recipe::*;
pub use cart::*;
pub use order::*;
pub use notification::*;
