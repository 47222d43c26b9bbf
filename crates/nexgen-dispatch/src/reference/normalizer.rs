/// Canonical column name: `Fuel_Efficiency (KM/L)` becomes `fuel_efficiency_km_l`.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let replaced: String = cleaned
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '/') {
                '_'
            } else {
                ch
            }
        })
        .collect();

    replaced
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Case and whitespace insensitive form of a categorical value.
pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}
