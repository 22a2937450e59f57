//! API layer
//!
//! HTTP handlers for:
//! - Accounts and the follow graph (`/users`)
//! - Tweets, likes and hashtags (`/tweets`)
//! - Metrics (Prometheus)

mod converters;
mod dto;
pub mod metrics;
mod tweets;
mod users;

pub use converters::*;
pub use dto::*;

pub use metrics::{metrics_router, track_metrics};
pub use tweets::tweets_router;
pub use users::users_router;
