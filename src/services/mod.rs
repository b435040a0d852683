//! Business logic: sessions and tweets.

pub mod session;
pub mod tweets;

pub use session::{Session, SessionService};
pub use tweets::TweetService;
