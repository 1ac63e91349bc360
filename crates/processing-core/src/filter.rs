//! Visual filter composition.
//!
//! Maps the selected preset and the HD-upscale flag to a single composed
//! filter expression string, in the CSS filter syntax the compositor
//! consumes. Same inputs always yield the same string.

use mixcut_media_model::VisualFilter;

/// The no-op expression the compositor treats as "draw unfiltered".
pub const IDENTITY_EXPRESSION: &str = "none";

/// Appended when HD upscale is enabled; simulates an upscale pass with a
/// fixed contrast/saturation/brightness lift.
pub const UPSCALE_BOOST: &str = "contrast(115%) saturate(110%) brightness(105%)";

/// Expression contributed by a preset. The identity preset contributes
/// nothing.
pub fn preset_expression(filter: VisualFilter) -> &'static str {
    match filter {
        VisualFilter::Original => "",
        VisualFilter::Grayscale => "grayscale(100%)",
        VisualFilter::Sepia => "sepia(60%)",
        VisualFilter::HighContrast => "contrast(150%)",
        VisualFilter::Brighten => "brightness(120%)",
        VisualFilter::Vintage => "sepia(30%) contrast(120%) brightness(110%) saturate(80%)",
        VisualFilter::Cyberpunk => "contrast(120%) saturate(150%) hue-rotate(10deg)",
    }
}

/// Compose the final filter expression: visual preset first, then the
/// upscale boost, space-separated. An empty result normalizes to
/// [`IDENTITY_EXPRESSION`].
pub fn compose(filter: VisualFilter, hd_upscale: bool) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(2);

    let preset = preset_expression(filter);
    if !preset.is_empty() {
        parts.push(preset);
    }
    if hd_upscale {
        parts.push(UPSCALE_BOOST);
    }

    if parts.is_empty() {
        IDENTITY_EXPRESSION.to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_without_upscale_is_noop() {
        assert_eq!(compose(VisualFilter::Original, false), "none");
    }

    #[test]
    fn test_identity_with_upscale_is_exactly_the_boost() {
        assert_eq!(compose(VisualFilter::Original, true), UPSCALE_BOOST);
    }

    #[test]
    fn test_preset_with_upscale_appends_boost() {
        assert_eq!(
            compose(VisualFilter::Grayscale, true),
            format!("grayscale(100%) {UPSCALE_BOOST}")
        );
    }

    #[test]
    fn test_compound_preset_keeps_internal_order() {
        assert_eq!(
            compose(VisualFilter::Vintage, false),
            "sepia(30%) contrast(120%) brightness(110%) saturate(80%)"
        );
        assert_eq!(
            compose(VisualFilter::Vintage, true),
            format!("sepia(30%) contrast(120%) brightness(110%) saturate(80%) {UPSCALE_BOOST}")
        );
    }

    #[test]
    fn test_every_preset_composes_deterministically() {
        for filter in VisualFilter::ALL {
            for upscale in [false, true] {
                assert_eq!(compose(filter, upscale), compose(filter, upscale));
            }
        }
    }

    #[test]
    fn test_no_preset_produces_empty_output() {
        for filter in VisualFilter::ALL {
            for upscale in [false, true] {
                assert!(!compose(filter, upscale).is_empty());
            }
        }
    }
}
