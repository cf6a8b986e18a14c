pub mod hello;
pub mod user;

pub use hello::*;
pub use user::*;
