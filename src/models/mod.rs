pub mod command;
pub mod messages;

pub use command::*;
pub use messages::*;
