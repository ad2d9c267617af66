/// Strips a user-supplied tag list down to the characters a session tag may
/// contain. Anything outside `[-a-zA-Z0-9_:,]` is dropped.
pub fn sanitize_tag_list(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | ','))
        .collect();
    cleaned
        .split(',')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
