mod check;
mod matcher;
mod normalize;

pub use check::{CheckEngine, CheckResult, EMPTY_DOMAIN_ERROR};
pub use matcher::match_sentinel;
pub use normalize::normalize;
