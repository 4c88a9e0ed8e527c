/// Lookup key for opponent names: lowercase, alphanumeric characters only.
///
/// Ladder exports key head-to-head records by this form, so `"PAC-MM Alpha"`
/// and `"pacmmalpha"` refer to the same competitor.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}
