//! Domain types for the API.

pub mod category;
pub mod otp;
pub mod user;

pub use category::Category;
pub use otp::OtpCode;
pub use user::{CurrentUser, User, UserProfile, UserSummary};
