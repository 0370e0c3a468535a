pub mod cli;
pub mod error;
pub mod pacing;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::*;
pub use pacing::{Clock, ManualClock, RateLimiter, TokioClock};
pub use retry::RetryPolicy;
pub use traits::*;
pub use types::*;
