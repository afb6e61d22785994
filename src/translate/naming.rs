//! Field name → column name mapping

/// Converts a message field name to its snake_case column name.
///
/// Already snake-cased names pass through unchanged. Runs of capitals are
/// treated as one word, so `RecordID` becomes `record_id` and `HTTPCode`
/// becomes `http_code`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();

            let starts_word = match prev {
                None => false,
                Some(p) if p == '_' => false,
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                // end of an acronym: "HTTPCode" → "http_code"
                Some(p) if p.is_ascii_uppercase() => {
                    next.map(|n| n.is_ascii_lowercase()).unwrap_or(false)
                }
                Some(_) => false,
            };

            if starts_word && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
