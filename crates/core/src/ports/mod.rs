mod event_source;
mod handler;
mod repository;
mod search;

pub use event_source::*;
pub use handler::*;
pub use repository::*;
pub use search::*;
