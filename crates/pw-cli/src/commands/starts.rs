use std::path::Path;

pub fn run(story_path: &Path, profile_path: &Path) -> Result<(), String> {
    let story = super::load_story(story_path)?;
    let profile = super::load_profile(profile_path)?;

    if story.starts.is_empty() {
        println!("  No starts defined.");
        return Ok(());
    }

    for start in &story.starts {
        if profile.is_available(start) {
            println!("  {:<20} {}", start.id(), start.display_title());
            if let Some(blurb) = &start.blurb {
                println!("  {:<20} {blurb}", "");
            }
        } else {
            let title = start.locked_title.as_deref().unwrap_or("???");
            println!("  {:<20} {title} (locked)", start.id());
        }
    }
    Ok(())
}
