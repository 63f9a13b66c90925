pub mod extractors;
pub mod store;

pub use extractors::CurrentSession;
pub use store::{MemorySessionStore, Session, SessionStore};
