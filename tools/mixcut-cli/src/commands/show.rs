//! Show an edit session.

use std::path::PathBuf;

use mixcut_media_model::builtin_catalog;
use mixcut_media_model::EditSession;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let session =
        EditSession::load(&path).map_err(|e| anyhow::anyhow!("Failed to load session: {e}"))?;

    println!("Session: {}", path.display());
    println!("  Version: {}", session.version);
    println!("  Created: {}", session.created_at);
    println!("  Modified: {}", session.modified_at);
    println!();

    println!("Source: {}", session.source_path.display());
    println!(
        "  Trim: {:.1}s .. {:.1}s ({:.1}s selected)",
        session.trim.start(),
        session.trim.end(),
        session.trim.span()
    );
    println!();

    let s = &session.settings;
    println!("Settings:");
    println!("  Rate: {}", s.rate.label());
    println!("  Filter: {}", s.visual_filter.label());
    println!("  Video volume: {:.2}", s.video_volume);
    println!("  Music volume: {:.2}", s.music_volume);
    println!("  Voice clarity: {}", s.voice_clarity);
    println!("  HD upscale: {}", s.hd_upscale);
    println!();

    let catalog = builtin_catalog();
    match session.selected_track(&catalog) {
        Some(track) => println!("Music: [{}] {} ({})", track.id, track.name, track.mood.as_str()),
        None => println!("Music: none"),
    }

    Ok(())
}
