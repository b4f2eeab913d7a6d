//! The cart: a single-owner service holding the lines the user intends to order.

mod policy;
mod service;

pub use policy::add_line;
pub use service::CartService;
