//! Background music catalog and mood-based selection.

use serde::{Deserialize, Serialize};

/// Mood vocabulary shared with the metadata analysis contract.
///
/// Serialized form matches the analysis vocabulary exactly ("Upbeat",
/// "Cinematic", ...), so hints can be parsed straight off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Upbeat,
    Cinematic,
    Chill,
    Energetic,
    Epic,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Upbeat,
        Mood::Cinematic,
        Mood::Chill,
        Mood::Energetic,
        Mood::Epic,
    ];

    /// Parse a mood hint, tolerating case differences.
    pub fn parse(hint: &str) -> Option<Mood> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(hint.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Upbeat => "Upbeat",
            Mood::Cinematic => "Cinematic",
            Mood::Chill => "Chill",
            Mood::Energetic => "Energetic",
            Mood::Epic => "Epic",
        }
    }
}

/// One entry in the music catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicTrack {
    pub id: String,
    pub name: String,
    pub url: String,
    pub duration_secs: f64,
    pub mood: Mood,
}

/// The builtin catalog offered by the editor.
pub fn builtin_catalog() -> Vec<MusicTrack> {
    vec![
        MusicTrack {
            id: "1".to_string(),
            name: "Corporate Upbeat".to_string(),
            url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3".to_string(),
            duration_secs: 372.0,
            mood: Mood::Upbeat,
        },
        MusicTrack {
            id: "2".to_string(),
            name: "Inspiring Cinematic".to_string(),
            url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-10.mp3".to_string(),
            duration_secs: 300.0,
            mood: Mood::Cinematic,
        },
        MusicTrack {
            id: "3".to_string(),
            name: "Lo-Fi Chill".to_string(),
            url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-16.mp3".to_string(),
            duration_secs: 240.0,
            mood: Mood::Chill,
        },
        MusicTrack {
            id: "4".to_string(),
            name: "Viral Phonk".to_string(),
            url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-15.mp3".to_string(),
            duration_secs: 180.0,
            mood: Mood::Energetic,
        },
        MusicTrack {
            id: "5".to_string(),
            name: "Epic Orchestral".to_string(),
            url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-8.mp3".to_string(),
            duration_secs: 420.0,
            mood: Mood::Epic,
        },
    ]
}

/// Pick the track for a mood hint: first catalog entry whose mood matches,
/// falling back to the catalog's first track when nothing matches.
pub fn auto_select(catalog: &[MusicTrack], hint: Mood) -> Option<&MusicTrack> {
    catalog
        .iter()
        .find(|t| t.mood == hint)
        .or_else(|| catalog.first())
}

/// Look up a track by id.
pub fn find_by_id<'a>(catalog: &'a [MusicTrack], id: &str) -> Option<&'a MusicTrack> {
    catalog.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_mood() {
        let catalog = builtin_catalog();
        for mood in Mood::ALL {
            assert!(catalog.iter().any(|t| t.mood == mood));
        }
    }

    #[test]
    fn test_auto_select_matches_mood() {
        let catalog = builtin_catalog();
        let track = auto_select(&catalog, Mood::Epic).unwrap();
        assert_eq!(track.name, "Epic Orchestral");
    }

    #[test]
    fn test_auto_select_falls_back_to_first_track() {
        let catalog: Vec<MusicTrack> = builtin_catalog()
            .into_iter()
            .filter(|t| t.mood != Mood::Chill)
            .collect();
        let track = auto_select(&catalog, Mood::Chill).unwrap();
        assert_eq!(track.id, "1");
    }

    #[test]
    fn test_auto_select_empty_catalog() {
        assert!(auto_select(&[], Mood::Upbeat).is_none());
    }

    #[test]
    fn test_mood_parse_is_case_insensitive() {
        assert_eq!(Mood::parse("cinematic"), Some(Mood::Cinematic));
        assert_eq!(Mood::parse(" EPIC "), Some(Mood::Epic));
        assert_eq!(Mood::parse("mellow"), None);
    }

    #[test]
    fn test_mood_serializes_to_vocabulary_string() {
        let json = serde_json::to_string(&Mood::Energetic).unwrap();
        assert_eq!(json, "\"Energetic\"");
    }
}
