//! Create an edit session for a source file.

use std::path::PathBuf;

use mixcut_media_model::{EditSession, SourceDescriptor};

pub fn run(source: PathBuf, duration: f64, output: Option<PathBuf>) -> anyhow::Result<()> {
    let descriptor = SourceDescriptor::probe(&source)
        .map_err(|e| anyhow::anyhow!("Cannot use source: {e}"))?;

    if duration <= 0.0 {
        return Err(anyhow::anyhow!("Duration must be positive, got {duration}"));
    }

    let session_path = output.unwrap_or_else(|| {
        let mut name = source.file_stem().map_or_else(
            || "session".to_string(),
            |s| s.to_string_lossy().into_owned(),
        );
        name.push_str(".mixcut.json");
        source.with_file_name(name)
    });

    let mut session = EditSession::for_source(&descriptor.path, duration);
    session
        .save(&session_path)
        .map_err(|e| anyhow::anyhow!("Failed to save session: {e}"))?;

    println!("Created session: {}", session_path.display());
    println!("  Source: {} ({} MB)", descriptor.path.display(), descriptor.size_bytes / (1024 * 1024));
    println!("  Trim: full {duration:.1}s");
    Ok(())
}
