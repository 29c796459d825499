//! Event-sourced persistence.
//!
//! A save is a header, an append-only log of game events and the latest
//! snapshot. Live play feeds an [`AutoSaver`], which buffers events until
//! the pitch key advances and hands store commands to an [`Outbox`].

pub mod autosave;
pub mod buffer;
pub mod error;
pub mod export;
pub mod file_store;
pub mod format;
pub mod loader;
pub mod migration;
pub mod outbox;
pub mod store;

pub use autosave::AutoSaver;
pub use buffer::ActionBuffer;
pub use error::{MissingDependency, SaveError};
pub use export::{export_doc, export_save, import_save, parse_import, signature, EXPORT_VERSION};
pub use file_store::FileStore;
pub use format::{
    decode_doc, encode_doc, GameEvent, InningMarker, ProgressPatch, SaveDoc, SaveHeader, SaveId,
    SaveProgress, SaveSummary, StateSnapshot, SCHEMA_VERSION,
};
pub use loader::{load_resume, rebuild_state, ResumePoint, ResumeSource};
pub use migration::migrate_header;
pub use outbox::{Outbox, OutboxCommand, PumpReport};
pub use store::{MemoryStore, SaveStore};
