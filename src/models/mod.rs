pub mod session;
pub mod token;

pub use session::{Session, User};
pub use token::TokenGrant;
