//! Generate metadata for a video file with the local analyzer.

use std::path::PathBuf;

use mixcut_common::config::AppConfig;
use mixcut_media_model::SourceDescriptor;
use mixcut_video_ai::{
    analysis_eligible, AnalysisConfig, HeuristicAnalyzer, MetadataAnalyzer,
    ANALYSIS_UPLOAD_LIMIT_MB,
};

pub fn run(source: PathBuf, api_key: Option<String>) -> anyhow::Result<()> {
    let descriptor = SourceDescriptor::probe(&source)
        .map_err(|e| anyhow::anyhow!("Cannot use source: {e}"))?;

    if !analysis_eligible(descriptor.size_bytes) {
        return Err(anyhow::anyhow!(
            "{} is {} MB; files over {ANALYSIS_UPLOAD_LIMIT_MB} MB skip analysis (still renderable)",
            source.display(),
            descriptor.size_bytes / (1024 * 1024)
        ));
    }

    let app_config = AppConfig::load();
    let explicit = api_key.as_deref().or(app_config.analysis_api_key.as_deref());
    let analyzer = HeuristicAnalyzer::new(AnalysisConfig::resolve(explicit));

    println!("Analyzing: {} ({})", source.display(), descriptor.mime);
    let bytes = std::fs::read(&source)?;
    let metadata = analyzer.analyze(&bytes, &descriptor.mime)?;

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    if let Some(mood) = metadata.recommended_mood() {
        println!();
        println!("Recommended music mood: {}", mood.as_str());
    }

    Ok(())
}
