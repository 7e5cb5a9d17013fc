use std::path::Path;

pub fn run(path: &Path) -> Result<(), String> {
    let story = super::load_story(path)?;

    let problems = story.reference_problems();
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  {problem}");
        }
        return Err(format!(
            "{} reference problem{}",
            problems.len(),
            if problems.len() == 1 { "" } else { "s" }
        ));
    }

    println!("  All checks passed for '{}'.", story.title);
    println!(
        "  {} nodes, {} starts, {} endings",
        story.node_count(),
        story.starts.len(),
        story.endings.len()
    );
    Ok(())
}
