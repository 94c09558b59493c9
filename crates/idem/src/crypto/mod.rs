// Crypto module — password hashing, session tokens, random strings.

pub mod password;
pub mod random;
pub mod session;

pub use password::{hash_password, verify_password};
pub use random::generate_random_string;
pub use session::{sign_session_token, verify_session_token, SessionClaims};
