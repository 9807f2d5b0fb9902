mod dispatcher;
mod listener;

pub use dispatcher::*;
pub use listener::*;
