//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database and credential operations.

pub mod hashtag;
mod identity;
mod tweet;

pub use identity::{IdentityService, Profile};
pub use tweet::{ExpandedTweet, TweetService};
