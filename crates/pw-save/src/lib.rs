//! Persistence for Patchwork sessions.
//!
//! Versioned save slots with atomic writes, backup recovery and schema
//! migration, plus the cross-session profile file.

mod file;

pub mod error;
pub mod migrate;
pub mod profile;
pub mod record;
pub mod store;

pub use error::{SaveError, SaveResult};
pub use migrate::{CURRENT_VERSION, migrate};
pub use profile::{load_profile, load_profile_or_default, write_profile};
pub use record::{SaveMetadata, SaveRecord};
pub use store::{
    AUTOSAVE_SLOT, BACKUP_FILE, QUICK_SLOT, SAVE_FILE, SaveStore, load_save, normalize_slot,
    write_save,
};
