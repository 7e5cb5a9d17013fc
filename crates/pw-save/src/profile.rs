//! Profile persistence: unlocked starts, seen endings and profile flags
//! that outlive a single session.

use std::path::Path;

use pw_fiction::Profile;

use crate::error::{SaveError, SaveResult};
use crate::file::{backup_path, read_json, write_json_atomic};

/// Load a profile. A missing file yields an empty profile; a corrupt one
/// falls back to its backup.
pub fn load_profile(path: &Path) -> SaveResult<Profile> {
    let primary_err = match read_json::<Profile>(path) {
        Ok(Some(profile)) => return Ok(profile),
        Ok(None) => return Ok(Profile::default()),
        Err(e) => e,
    };
    match read_json::<Profile>(&backup_path(path)) {
        Ok(Some(profile)) => {
            tracing::warn!(path = %path.display(), error = %primary_err, "profile unreadable, using backup");
            Ok(profile)
        }
        Ok(None) | Err(_) => Err(primary_err),
    }
}

/// Write a profile atomically, keeping the previous one as a backup.
pub fn write_profile(path: &Path, profile: &Profile) -> SaveResult<()> {
    write_json_atomic(path, profile)
}

/// Load a profile, treating any failure as a fresh profile.
pub fn load_profile_or_default(path: &Path) -> Profile {
    load_profile(path).unwrap_or_else(|e: SaveError| {
        tracing::warn!(error = %e, "starting with an empty profile");
        Profile::default()
    })
}
