//! Languages offered by the interactive translator.

/// A language the translator can select as source or target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// Code sent to the translation provider
    pub code: &'static str,
    /// Localization key of the display name
    pub name_key: &'static str,
    pub flag: &'static str,
}

pub const LANGUAGES: [Language; 10] = [
    Language { code: "ru", name_key: "lang-ru", flag: "🇷🇺" },
    Language { code: "en", name_key: "lang-en", flag: "🇬🇧" },
    Language { code: "zh-CN", name_key: "lang-zh-cn", flag: "🇨🇳" },
    Language { code: "ar", name_key: "lang-ar", flag: "🇸🇦" },
    Language { code: "es", name_key: "lang-es", flag: "🇪🇸" },
    Language { code: "pt", name_key: "lang-pt", flag: "🇵🇹" },
    Language { code: "fr", name_key: "lang-fr", flag: "🇫🇷" },
    Language { code: "de", name_key: "lang-de", flag: "🇩🇪" },
    Language { code: "it", name_key: "lang-it", flag: "🇮🇹" },
    Language { code: "tr", name_key: "lang-tr", flag: "🇹🇷" },
];

/// Look up a supported language by its exact code
pub fn find_language(code: &str) -> Option<Language> {
    LANGUAGES.iter().copied().find(|lang| lang.code == code)
}
