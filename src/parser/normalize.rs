/// Lowercases `input` and drops every character that is not alphanumeric.
///
/// Used on both sides of a match so that "Diamond Sword", "diamond_sword" and
/// "DIAMOND-SWORD" all compare equal.
#[must_use]
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Substring match on already-normalized strings.
///
/// An empty `term` matches everything.
#[must_use]
pub fn matches_normalized(term: &str, name: &str) -> bool {
    name.contains(term)
}
