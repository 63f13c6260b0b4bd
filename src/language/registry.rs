use super::Language;

/// Every supported locale, in curated order. Popular choices come first.
pub const LANGUAGES: &[Language] = &[
    Language { code: "en-US", name: "English (US)", flag: "🇺🇸", region: "United States" },
    Language { code: "en-IN", name: "English (India)", flag: "🇮🇳", region: "India" },
    Language { code: "hi-IN", name: "Hindi", flag: "🇮🇳", region: "India" },
    Language { code: "en-GB", name: "English (UK)", flag: "🇬🇧", region: "United Kingdom" },
    Language { code: "es-ES", name: "Spanish", flag: "🇪🇸", region: "Spain" },
    Language { code: "fr-FR", name: "French", flag: "🇫🇷", region: "France" },
    Language { code: "de-DE", name: "German", flag: "🇩🇪", region: "Germany" },
    Language { code: "ar-SA", name: "Arabic", flag: "🇸🇦", region: "Saudi Arabia" },
    Language { code: "bn-IN", name: "Bengali", flag: "🇮🇳", region: "India" },
    Language { code: "ta-IN", name: "Tamil", flag: "🇮🇳", region: "India" },
    Language { code: "te-IN", name: "Telugu", flag: "🇮🇳", region: "India" },
    Language { code: "mr-IN", name: "Marathi", flag: "🇮🇳", region: "India" },
    Language { code: "gu-IN", name: "Gujarati", flag: "🇮🇳", region: "India" },
    Language { code: "kn-IN", name: "Kannada", flag: "🇮🇳", region: "India" },
    Language { code: "ml-IN", name: "Malayalam", flag: "🇮🇳", region: "India" },
    Language { code: "pa-IN", name: "Punjabi", flag: "🇮🇳", region: "India" },
    Language { code: "ur-PK", name: "Urdu", flag: "🇵🇰", region: "Pakistan" },
    Language { code: "es-MX", name: "Spanish (Mexico)", flag: "🇲🇽", region: "Mexico" },
    Language { code: "pt-BR", name: "Portuguese (Brazil)", flag: "🇧🇷", region: "Brazil" },
    Language { code: "pt-PT", name: "Portuguese", flag: "🇵🇹", region: "Portugal" },
    Language { code: "it-IT", name: "Italian", flag: "🇮🇹", region: "Italy" },
    Language { code: "nl-NL", name: "Dutch", flag: "🇳🇱", region: "Netherlands" },
    Language { code: "ru-RU", name: "Russian", flag: "🇷🇺", region: "Russia" },
    Language { code: "tr-TR", name: "Turkish", flag: "🇹🇷", region: "Turkey" },
    Language { code: "zh-CN", name: "Chinese (Simplified)", flag: "🇨🇳", region: "China" },
    Language { code: "ja-JP", name: "Japanese", flag: "🇯🇵", region: "Japan" },
    Language { code: "ko-KR", name: "Korean", flag: "🇰🇷", region: "South Korea" },
    Language { code: "id-ID", name: "Indonesian", flag: "🇮🇩", region: "Indonesia" },
    Language { code: "vi-VN", name: "Vietnamese", flag: "🇻🇳", region: "Vietnam" },
    Language { code: "th-TH", name: "Thai", flag: "🇹🇭", region: "Thailand" },
];

/// Fallback returned for unregistered codes
pub const DEFAULT_LANGUAGE: &Language = &LANGUAGES[0];

/// Look up a locale by code, falling back to the first registry entry
pub fn find_by_code(code: &str) -> &'static Language {
    LANGUAGES
        .iter()
        .find(|lang| lang.code == code)
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Whether `code` names a registered locale
pub fn is_registered(code: &str) -> bool {
    LANGUAGES.iter().any(|lang| lang.code == code)
}

/// First `n` entries in registry order
pub fn list_popular(n: usize) -> &'static [Language] {
    &LANGUAGES[..n.min(LANGUAGES.len())]
}
