use super::model::LandClass;

/// Keyword rules checked in order; the first class with a matching keyword wins.
const CLASSIFICATION_RULES: [(LandClass, &[&str]); 3] = [
    (LandClass::High, &["high", "alta", "alto"]),
    (LandClass::Medium, &["medium", "media", "medio", "med"]),
    (LandClass::Low, &["low", "baja", "bajo"]),
];

/// Reads a free-text classification such as `"Alta"` or `"HIGH (land titling)"`.
/// Keywords must be whole words, so `"below"` or `"immediate"` match nothing.
pub fn classify_text(raw: &str) -> Option<LandClass> {
    let lowered = raw.to_lowercase();
    let words = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>();

    CLASSIFICATION_RULES
        .iter()
        .find(|(_, keywords)| words.iter().any(|word| keywords.contains(word)))
        .map(|(class, _)| *class)
}

/// The score band wins when a score was reported. Returns the class and whether
/// the text had to be overridden.
pub fn normalize_classification(score: Option<u8>, text: Option<&str>) -> (LandClass, bool) {
    let from_text = text.and_then(classify_text);
    match (score, from_text) {
        (Some(score), Some(class)) if class == LandClass::from_score(score) => (class, false),
        (Some(score), _) => (LandClass::from_score(score), true),
        (None, Some(class)) => (class, false),
        (None, None) => (LandClass::from_score(super::model::DEFAULT_SCORE), true),
    }
}
