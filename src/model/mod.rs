//! Pure data structures (DTOs) exchanged with the remote gateway and held by the store.

pub mod product;
pub mod user;

pub use product::*;
pub use user::*;
