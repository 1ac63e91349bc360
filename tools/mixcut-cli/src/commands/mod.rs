pub mod analyze;
pub mod init;
pub mod render;
pub mod show;
pub mod simulate;
pub mod tracks;

use anyhow::anyhow;
use mixcut_media_model::{PlaybackRate, VisualFilter};

/// Parse a numeric rate flag against the supported steps.
pub fn parse_rate(rate: f64) -> anyhow::Result<PlaybackRate> {
    PlaybackRate::try_from(rate)
        .map_err(|_| anyhow!("Unsupported rate: {rate}. Use: 0.5, 1, 1.5, 2"))
}

/// Parse a filter flag by its kebab-case name.
pub fn parse_filter(name: &str) -> anyhow::Result<VisualFilter> {
    let wanted = name.to_lowercase().replace('-', " ");
    VisualFilter::ALL
        .iter()
        .copied()
        .find(|f| f.label().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| {
            anyhow!(
                "Unknown filter: {name}. Use: original, grayscale, sepia, high-contrast, \
                 brighten, vintage, cyberpunk"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_flag_parses_supported_steps() {
        assert_eq!(parse_rate(1.5).unwrap(), PlaybackRate::OnePointFive);
        assert!(parse_rate(3.0).is_err());
    }

    #[test]
    fn test_filter_flag_accepts_kebab_case() {
        assert_eq!(
            parse_filter("high-contrast").unwrap(),
            VisualFilter::HighContrast
        );
        assert_eq!(parse_filter("Sepia").unwrap(), VisualFilter::Sepia);
        assert!(parse_filter("glitch").is_err());
    }
}
