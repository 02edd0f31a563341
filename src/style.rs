//! Mood and language style rules, and resolution of free-form selections to
//! their canonical keys.

/// An ordered table of `(key, style rule)` pairs. Declaration order is the
/// tie-break when a raw value mentions more than one key.
pub struct StyleTable {
    entries: &'static [(&'static str, &'static str)],
    default_key: &'static str,
}

impl StyleTable {
    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn default_key(&self) -> &'static str {
        self.default_key
    }

    /// First key (in declaration order) appearing anywhere inside `raw`, or the
    /// table default when none does.
    pub fn resolve(&self, raw: &str) -> &'static str {
        self.keys()
            .find(|key| raw.contains(*key))
            .unwrap_or(self.default_key)
    }

    pub fn rule(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, rule)| *rule)
    }
}

pub static LANGUAGES: StyleTable = StyleTable {
    entries: &[
        (
            "Bangla",
            "Use pure Bengali Script (বাংলা অক্ষর). Add deep poetic words (আবেগ) and local context.",
        ),
        (
            "Banglish",
            "Use Romanized Bengali (English letters). Mix Bengali and English slang (e.g., 'Vibe ta pura joss').",
        ),
        (
            "English",
            "Use modern Gen-Z English with emojis. Keep it aesthetic and minimalist.",
        ),
        (
            "Urdu",
            "Use Romanized Urdu mixed with English. Example style: 'Yeh scene toh kamaal hai ✨' or 'Aaj ka vibe bohot sakht hai.'",
        ),
        (
            "Hindi",
            "Use Romanized Hindi mixed with English. Keep it trendy and relatable.",
        ),
    ],
    default_key: "English",
};

pub static MOODS: StyleTable = StyleTable {
    entries: &[
        (
            "Romantic",
            "Poetic, dreamy, and soft. Focus on feelings and 'Mon' (মন).",
        ),
        (
            "Funny",
            "Sarcastic, humorous, and witty. Use funny local observations.",
        ),
        (
            "Zen-Z-Hype",
            "Savage, confident, and bold. Use boss-level energy.",
        ),
        (
            "Attitude",
            "Savage, confident, and bold. Use boss-level energy.",
        ),
        ("Minimal", "Short, 3-5 words only, very aesthetic."),
        ("Aesthetic", "Visually pleasing, artsy, and calm."),
        ("Poetic", "Deep, rhyming, and metaphorical."),
    ],
    default_key: "Aesthetic",
};

/// Canonical keys resolved from the user's mood and language selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedStyle {
    pub language_key: &'static str,
    pub mood_key: &'static str,
}

impl NormalizedStyle {
    pub fn resolve(mood_display: &str, language_display: &str) -> Self {
        Self {
            language_key: LANGUAGES.resolve(language_display),
            mood_key: MOODS.resolve(mood_display),
        }
    }

    pub fn language_rule(&self) -> Option<&'static str> {
        LANGUAGES.rule(self.language_key)
    }

    pub fn mood_rule(&self) -> Option<&'static str> {
        MOODS.rule(self.mood_key)
    }
}
