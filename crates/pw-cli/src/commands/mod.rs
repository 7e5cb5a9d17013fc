pub mod check;
pub mod play;
pub mod profile;
pub mod starts;

use std::path::Path;

use pw_core::Story;

/// Load a story file, merging its modules.
fn load_story(path: &Path) -> Result<Story, String> {
    Story::load(path).map_err(|e| format!("failed to load story: {e}"))
}

/// Load the profile, reporting a corrupt file instead of discarding it.
fn load_profile(path: &Path) -> Result<pw_fiction::Profile, String> {
    pw_save::load_profile(path).map_err(|e| format!("failed to load profile: {e}"))
}
