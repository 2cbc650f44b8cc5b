//! Identifier normalization.

/// Convert an arbitrary entity/attribute name into a snake_case SQL identifier.
///
/// camelCase and PascalCase boundaries become underscores, whitespace and
/// common separators become underscores, every other non-alphanumeric
/// character is dropped. A leading digit gets an underscore prefix.
/// Returns `None` when nothing usable is left.
pub fn to_snake_case(input: &str) -> Option<String> {
    let chars: Vec<char> = input.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars
                    .get(i + 1)
                    .map(|n| n.is_ascii_lowercase())
                    .unwrap_or(false);
                if prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_is_lower)
                {
                    out.push('_');
                }
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if c.is_whitespace() || matches!(c, '_' | '-' | '.' | '/' | ':') {
            out.push('_');
        }
    }

    let collapsed = collapse_underscores(&out);
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        Some(format!("_{}", trimmed))
    } else {
        Some(trimmed.to_string())
    }
}

/// Snake-case a name, falling back to `fallback` for empty/missing input
pub fn identifier_or(name: Option<&str>, fallback: &str) -> String {
    name.and_then(to_snake_case)
        .unwrap_or_else(|| fallback.to_string())
}

/// Collapse runs of underscores into one
pub fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !last_underscore {
                out.push(c);
            }
            last_underscore = true;
        } else {
            out.push(c);
            last_underscore = false;
        }
    }
    out
}

/// Append `_2`, `_3`, ... until `taken` no longer reports a collision
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
