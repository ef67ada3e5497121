mod backend;
mod error;
mod event;
mod message;
mod model_entry;
mod role;
mod selector;
mod session;
mod slash_commands;
mod usage;

pub use backend::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use model_entry::*;
pub use role::*;
pub use selector::*;
pub use session::*;
pub use slash_commands::*;
pub use usage::*;
