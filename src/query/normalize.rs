use std::collections::BTreeSet;

/// Trims, lower-cases and de-duplicates raw tags, dropping empty entries.
pub fn normalize_tags<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Splits the comma-separated form (`"2girls, 1boy, hands"`) into normalized tags.
pub fn split_tag_list(raw: &str) -> BTreeSet<String> {
    normalize_tags(raw.split(','))
}
