pub mod condition;
pub mod listing;
pub mod watch;

pub use condition::*;
pub use listing::*;
pub use watch::*;
