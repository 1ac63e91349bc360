//! List the built-in music catalog.

use mixcut_media_model::{auto_select, builtin_catalog, Mood};

pub fn run(mood: Option<String>) -> anyhow::Result<()> {
    let catalog = builtin_catalog();

    println!("Music catalog:");
    for track in &catalog {
        println!(
            "  [{}] {} ({}s, {})",
            track.id,
            track.name,
            track.duration_secs,
            track.mood.as_str()
        );
    }

    if let Some(hint) = mood {
        let parsed = Mood::parse(&hint)
            .ok_or_else(|| anyhow::anyhow!("Unknown mood: {hint}. Use: Upbeat, Cinematic, Chill, Energetic, Epic"))?;
        let selected = auto_select(&catalog, parsed).unwrap_or(&catalog[0]);
        println!();
        println!("Mood '{}' selects: [{}] {}", parsed.as_str(), selected.id, selected.name);
    }

    Ok(())
}
