//! Session layer for Strata: save storage, chunk loading, ticking, and gravity.

mod render;
mod session;
mod store;

pub use render::render_rows;
pub use session::{BlockEdits, Session, SessionError};
pub use store::{MemoryStore, PersistenceStore, RonStore, StoreError};
