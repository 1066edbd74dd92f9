pub mod classify;
pub mod inspect;
pub mod list;
pub mod remove;
pub mod sweep;

pub use classify::*;
pub use inspect::*;
pub use list::*;
pub use remove::*;
pub use sweep::*;
