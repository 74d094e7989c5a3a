pub mod sequential;
pub mod single;
pub mod types;

pub use self::sequential::{Resolution, ResolutionError, SequentialResolver};
pub use self::single::UdpLookup;
pub use self::types::{DnsLookup, LookupError};
