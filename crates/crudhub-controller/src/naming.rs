//! Naming helpers: printf-style patterns and case conversion.

/// Substitute successive `%s` placeholders in `pattern` with `args`.
///
/// `%%` yields a literal `%`. Placeholders without a matching argument are
/// replaced with nothing.
pub fn format_pattern(pattern: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(pattern.len() + args.iter().map(|a| a.len()).sum::<usize>());
    let mut args = args.iter();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                if let Some(arg) = args.next() {
                    out.push_str(arg);
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}

/// `blogPost` -> `blog_post`, `HTTPServer` -> `http_server`.
pub fn camel_case_to_underscore(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && prev != '_' {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Upper-case the first character.
pub fn ucfirst(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
