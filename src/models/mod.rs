pub mod message;

pub use message::{Message, NewMessage, RosterEntry};
