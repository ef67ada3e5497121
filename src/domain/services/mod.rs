pub mod actions;
mod conversation;
mod model_registry;
mod sessions;

pub use conversation::*;
pub use model_registry::*;
pub use sessions::*;
