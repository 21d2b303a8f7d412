/// Map a human-readable language name to the code the engines expect.
///
/// Returns `None` for "auto" or an empty name, which callers translate to
/// "no language constraint" (the field is omitted from the request rather
/// than sent literally). Names without a mapping pass through unchanged so
/// codes the engine already understands keep working.
pub fn engine_language_code(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let code = match lower.as_str() {
        "english" => "en",
        "spanish" => "es",
        "french" => "fr",
        "german" => "de",
        "italian" => "it",
        "portuguese" => "pt",
        "dutch" => "nl",
        "russian" => "ru",
        "japanese" => "ja",
        "korean" => "ko",
        "chinese" | "mandarin" | "zh-hans" | "zh-hant" => "zh",
        "arabic" => "ar",
        "hindi" => "hi",
        "turkish" => "tr",
        "polish" => "pl",
        "swedish" => "sv",
        "ukrainian" => "uk",
        "vietnamese" => "vi",
        "indonesian" => "id",
        "thai" => "th",
        _ => return Some(trimmed.to_string()),
    };

    Some(code.to_string())
}
