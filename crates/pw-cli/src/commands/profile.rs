use std::path::Path;

pub fn run(path: &Path) -> Result<(), String> {
    let profile = super::load_profile(path)?;

    println!("  Unlocked starts:");
    if profile.unlocked_starts.is_empty() {
        println!("    (none)");
    }
    for start in &profile.unlocked_starts {
        println!("    {start}");
    }

    println!("  Endings seen:");
    if profile.seen_endings.is_empty() {
        println!("    (none)");
    }
    for ending in &profile.seen_endings {
        println!("    {ending}");
    }

    if !profile.flags.is_empty() {
        println!("  Flags:");
        for (key, value) in &profile.flags {
            println!("    {key} = {value}");
        }
    }
    Ok(())
}
