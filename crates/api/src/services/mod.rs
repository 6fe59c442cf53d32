//! Business logic services.

pub mod accounts;
pub mod email;
pub mod otp;
pub mod password;
pub mod tokens;

pub use accounts::AccountService;
pub use email::EmailService;
pub use otp::OtpService;
pub use tokens::{Claims, TokenPair, TokenSigner, TokenUse};
