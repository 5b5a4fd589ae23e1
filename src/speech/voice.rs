//! Synthesizer voices and default-voice selection.

use serde::{Deserialize, Serialize};

/// One voice offered by a speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Value passed back to the engine to select this voice.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// BCP-47-ish language tag, e.g. `en-gb`.
    pub language: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
        }
    }

    /// `true` when the voice's language starts with `locale`, ignoring case
    /// and `_`/`-` differences.
    pub fn matches_locale(&self, locale: &str) -> bool {
        let lang = self.language.to_lowercase().replace('_', "-");
        let locale = locale.to_lowercase().replace('_', "-");
        !locale.is_empty() && lang.starts_with(&locale)
    }

    /// Label for the voice picker.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.language)
    }
}

/// Choose the voice to use when the user has not picked one.
///
/// `preferred` (a voice id) wins when it exists.  Otherwise the first voice
/// whose language matches `locale`, otherwise the first voice.
///
/// ```rust
/// use speakeasy::speech::{pick_default_voice, Voice};
///
/// let voices = vec![
///     Voice::new("de", "German", "de"),
///     Voice::new("en-us", "English (America)", "en-us"),
/// ];
/// assert_eq!(pick_default_voice(&voices, "en", None).unwrap().id, "en-us");
/// assert_eq!(pick_default_voice(&voices, "fr", None).unwrap().id, "de");
/// ```
pub fn pick_default_voice<'a>(
    voices: &'a [Voice],
    locale: &str,
    preferred: Option<&str>,
) -> Option<&'a Voice> {
    if let Some(id) = preferred {
        if let Some(voice) = voices.iter().find(|v| v.id == id) {
            return Some(voice);
        }
        log::warn!("speech: configured voice {id:?} is not installed");
    }
    voices
        .iter()
        .find(|v| v.matches_locale(locale))
        .or_else(|| voices.first())
}

/// Parse the table printed by `espeak-ng --voices[=<lang>]`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  2  en-gb           --/M      English_(Great_Britain) gmw/en          (en 2)
/// ```
///
/// The header and rows with too few columns are skipped.
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 4 {
                return None;
            }
            let language = cols[1];
            let name = cols[3].replace('_', " ");
            Some(Voice::new(language, name, language))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ESPEAK_EN: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 2  en-gb           --/M      English_(Great_Britain) gmw/en               (en 2)
 2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
 5  en-gb-scotland  --/M      English_(Scotland) gmw/en-GB-scotland
";

    #[test]
    fn parses_espeak_table() {
        let voices = parse_voice_list(ESPEAK_EN);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].id, "en-gb");
        assert_eq!(voices[0].name, "English (Great Britain)");
        assert_eq!(voices[2].language, "en-gb-scotland");
    }

    #[test]
    fn empty_output_has_no_voices() {
        assert!(parse_voice_list("").is_empty());
        assert!(parse_voice_list("Pty Language Age/Gender VoiceName File\n").is_empty());
    }

    #[test]
    fn locale_match_is_prefix_and_case_insensitive() {
        let v = Voice::new("en_US", "x", "en_US");
        assert!(v.matches_locale("en"));
        assert!(v.matches_locale("EN-us"));
        assert!(!v.matches_locale("de"));
        assert!(!v.matches_locale(""));
    }

    #[test]
    fn preferred_voice_wins() {
        let voices = parse_voice_list(ESPEAK_EN);
        let picked = pick_default_voice(&voices, "en", Some("en-us")).unwrap();
        assert_eq!(picked.id, "en-us");
    }

    #[test]
    fn missing_preferred_voice_falls_back_to_locale() {
        let voices = parse_voice_list(ESPEAK_EN);
        let picked = pick_default_voice(&voices, "en", Some("xx")).unwrap();
        assert_eq!(picked.id, "en-gb");
    }

    #[test]
    fn no_voices_no_default() {
        assert!(pick_default_voice(&[], "en", None).is_none());
    }
}
