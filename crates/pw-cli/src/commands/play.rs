//! Interactive play loop over stdin/stdout.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pw_core::Story;
use pw_fiction::{EngineConfig, FictionError, Phase, Profile, StepReport, Walker};
use pw_save::{QUICK_SLOT, SaveRecord, SaveStore};

pub struct PlayOptions {
    pub story: PathBuf,
    pub start: Option<String>,
    pub profile: PathBuf,
    pub saves: PathBuf,
    pub load: Option<String>,
    pub config: Option<PathBuf>,
}

pub fn run(opts: &PlayOptions) -> Result<(), String> {
    let story = Arc::new(super::load_story(&opts.story)?);
    let config = load_config(opts.config.as_deref())?;
    let profile = super::load_profile(&opts.profile)?;
    let store = SaveStore::new(&opts.saves);

    println!("  {}", story.title);
    println!("  Enter a choice number, 's' to save, 'l' to load, 'q' to quit.\n");

    let mut walker = match &opts.load {
        Some(slot) => {
            let record = store.load(slot).map_err(|e| e.to_string())?;
            resume(&story, profile, record, &config)
                .map_err(|e| format!("failed to resume '{slot}': {e}"))?
        }
        None => Walker::new_session(
            Arc::clone(&story),
            profile,
            opts.start.as_deref(),
            config.clone(),
        )
        .map_err(|e| format!("failed to start session: {e}"))?,
    };
    tracing::debug!(story = %opts.story.display(), saves = %opts.saves.display(), "session ready");
    show_node(&walker);

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        if matches!(walker.phase(), Phase::Active { .. }) {
            let report = walker.enter().map_err(|e| e.to_string())?;
            show_node(&walker);
            after_step(&walker, &report, &store, &opts.profile);
        }

        match walker.phase() {
            Phase::Ended { .. } => break,
            Phase::Active { .. } => continue,
            Phase::AwaitingChoice { available, .. } => {
                if available.is_empty() {
                    println!("  There is nowhere to go from here.");
                }
                for (i, choice) in available.iter().enumerate() {
                    println!("  {}. {}", i + 1, choice.text);
                }
            }
        }

        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        match input.to_ascii_lowercase().as_str() {
            "" => continue,
            "q" | "quit" => break,
            "s" | "save" => {
                let record = record_for(&walker);
                match store.save(QUICK_SLOT, &record) {
                    Ok(_) => println!("  Saved.\n"),
                    Err(e) => println!("  Save failed: {e}\n"),
                }
            }
            "l" | "load" => {
                let loaded = store
                    .load(QUICK_SLOT)
                    .map_err(|e| e.to_string())
                    .and_then(|record| {
                        resume(&story, walker.profile().clone(), record, &config)
                            .map_err(|e| e.to_string())
                    });
                match loaded {
                    Ok(resumed) => {
                        walker = resumed;
                        println!("  Loaded.\n");
                        if let Phase::Ended { ending } = walker.phase() {
                            println!("  This save has already reached its ending: {ending}");
                        }
                        show_node(&walker);
                    }
                    Err(e) => println!("  Load failed: {e}\n"),
                }
            }
            _ => match input.parse::<usize>() {
                Ok(n) if n >= 1 => match walker.choose(n - 1) {
                    Ok(report) => after_step(&walker, &report, &store, &opts.profile),
                    Err(FictionError::InvalidChoice { available, .. }) => {
                        println!("  Pick a number from 1 to {available}.\n");
                    }
                    Err(e) => println!("  {e}\n"),
                },
                _ => println!("  Unknown command '{input}'.\n"),
            },
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

fn show_node(walker: &Walker) {
    if let Phase::AwaitingChoice { .. } = walker.phase()
        && let Some(node) = walker.current_node()
    {
        if !node.title.is_empty() {
            println!("  == {} ==", node.title);
        }
        if !node.text.is_empty() {
            println!("  {}", node.text);
        }
        println!();
    }
}

fn record_for(walker: &Walker) -> SaveRecord {
    SaveRecord::new(QUICK_SLOT, walker.state().clone()).for_story(walker.story())
}

/// Resume a saved session, warning when the save was written against a
/// different version of the story.
fn resume(
    story: &Arc<Story>,
    profile: Profile,
    record: SaveRecord,
    config: &EngineConfig,
) -> Result<Walker, FictionError> {
    if !record.matches_story(story) {
        tracing::warn!(slot = %record.metadata.slot, "save signature differs from the loaded story");
        println!("  [!] This save was written against a different version of the story.");
    }
    Walker::resume(Arc::clone(story), profile, record.state, config.clone())
}

/// Print a step's output, then persist the profile (if it changed) and the
/// autosave. Persistence failures are reported but never end the session.
fn after_step(
    walker: &Walker,
    report: &StepReport,
    store: &SaveStore,
    profile_path: &Path,
) {
    for message in &report.messages {
        println!("  {message}");
    }
    for issue in &report.issues {
        println!("  [?] {issue}");
    }
    if !report.messages.is_empty() || !report.issues.is_empty() {
        println!();
    }

    if report.profile_changed
        && let Err(e) = pw_save::write_profile(profile_path, walker.profile())
    {
        eprintln!("warning: {e}");
    }
    if let Err(e) = store.autosave(&record_for(walker)) {
        eprintln!("warning: {e}");
    }
}
