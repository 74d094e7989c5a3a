pub mod source;
mod watcher;

pub use self::source::{EnvFileSource, SourceError, SourceValues};
pub use self::watcher::spawn_watcher;
