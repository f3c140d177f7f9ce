//! Domain models for the shop and accounts.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{NewOrder, Order, OrderDetails, OrderProductLinks};
pub use product::{NewProduct, Product};
pub use session::keys as session_keys;
pub use user::{NewUser, Profile, User};
