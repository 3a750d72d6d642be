//! Locale detection restricted to the supported language set.

use std::env;

/// What: Collect locale candidates from environment variables.
///
/// Output:
/// - Normalized locale codes in priority order (may be empty)
///
/// Details:
/// - Checks `LC_ALL`, `LC_MESSAGES`, `LANG`, then the colon-separated `LANGUAGE` list
/// - Parses locale strings like "de_DE.UTF-8" -> "de-DE"
#[must_use]
pub fn system_locale_candidates() -> Vec<String> {
    let mut candidates = Vec::new();
    for var_name in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(locale_str) = env::var(var_name)
            && let Some(parsed) = parse_locale_string(&locale_str)
        {
            candidates.push(parsed);
        }
    }
    if let Ok(list) = env::var("LANGUAGE") {
        candidates.extend(list.split(':').filter_map(parse_locale_string));
    }
    candidates.dedup();
    candidates
}

/// What: Parse a POSIX or BCP 47 style locale string into a normalized code.
///
/// Inputs:
/// - `locale_str`: Locale string like "de_DE.UTF-8", "de-DE", "en_US.utf8", "zh_CN@pinyin"
///
/// Output:
/// - `Option<String>` with standardized format (e.g., "de-DE") or None if invalid
///
/// Details:
/// - Removes encoding suffix and `@modifier`
/// - Language lowercased, two-letter region uppercased, script subtags kept as written
/// - "C" and "POSIX" carry no language information and yield None
#[must_use]
pub fn parse_locale_string(locale_str: &str) -> Option<String> {
    let trimmed = locale_str.trim();
    let locale_part = trimmed.split(['.', '@']).next()?.trim();
    if locale_part.is_empty()
        || locale_part.eq_ignore_ascii_case("c")
        || locale_part.eq_ignore_ascii_case("posix")
    {
        return None;
    }

    let normalized = locale_part.replace('_', "-");
    let mut parts = normalized.split('-');
    let language = parts.next()?.to_ascii_lowercase();
    if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut code = language;
    for part in parts {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        code.push('-');
        if part.len() == 2 {
            code.push_str(&part.to_ascii_uppercase());
        } else {
            code.push_str(part);
        }
    }
    Some(code)
}

/// What: Parse an `Accept-Language` style list into codes ordered by preference.
///
/// Inputs:
/// - `header`: e.g. "zh-CN,zh;q=0.9,en;q=0.8"
///
/// Output:
/// - Normalized codes, highest quality first; `*` and q=0 entries dropped
///
/// Details:
/// - Entries with equal quality keep their original order.
#[must_use]
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(f32, String)> = header
        .split(',')
        .filter_map(|entry| {
            let mut pieces = entry.split(';');
            let tag = pieces.next()?.trim();
            if tag == "*" {
                return None;
            }
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .map_or(Some(1.0), |q| q.trim().parse::<f32>().ok())?;
            if quality <= 0.0 {
                return None;
            }
            parse_locale_string(tag).map(|code| (quality, code))
        })
        .collect();
    weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
    weighted.into_iter().map(|(_, code)| code).collect()
}

/// What: Map locale candidates onto the supported language set.
///
/// Inputs:
/// - `candidates`: Detected locale codes in priority order
/// - `supported`: Languages the site ships dictionaries for
///
/// Output:
/// - First supported language that matches a candidate, or None
///
/// Details:
/// - Per candidate, tries an exact (case-insensitive) match, then the primary subtag
///   ("zh-CN" -> "zh"), then any supported code with the same primary subtag ("en" -> "en-US").
#[must_use]
pub fn match_supported<S: AsRef<str>>(candidates: &[S], supported: &[String]) -> Option<String> {
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if let Some(hit) = supported
            .iter()
            .find(|s| s.eq_ignore_ascii_case(candidate))
        {
            return Some(hit.clone());
        }
        let primary = primary_subtag(candidate);
        if let Some(hit) = supported.iter().find(|s| s.eq_ignore_ascii_case(primary)) {
            return Some(hit.clone());
        }
        if let Some(hit) = supported
            .iter()
            .find(|s| primary_subtag(s).eq_ignore_ascii_case(primary))
        {
            return Some(hit.clone());
        }
    }
    None
}

fn primary_subtag(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_string() {
        assert_eq!(
            parse_locale_string("de_DE.UTF-8"),
            Some("de-DE".to_string())
        );
        assert_eq!(parse_locale_string("en_US.utf8"), Some("en-US".to_string()));
        assert_eq!(parse_locale_string("zh-cn"), Some("zh-CN".to_string()));
        assert_eq!(parse_locale_string("EN"), Some("en".to_string()));
        assert_eq!(
            parse_locale_string("zh_Hans_CN.UTF-8"),
            Some("zh-Hans-CN".to_string())
        );
        assert_eq!(
            parse_locale_string("de_DE@euro"),
            Some("de-DE".to_string())
        );
        assert_eq!(parse_locale_string(""), None);
        assert_eq!(parse_locale_string("   "), None);
        assert_eq!(parse_locale_string("C"), None);
        assert_eq!(parse_locale_string("POSIX.UTF-8"), None);
        assert_eq!(parse_locale_string("en US"), None);
    }

    #[test]
    fn test_parse_accept_language() {
        assert_eq!(
            parse_accept_language("en;q=0.8, zh-CN, zh;q=0.9, *;q=0.1"),
            vec!["zh-CN", "zh", "en"]
        );
        assert_eq!(parse_accept_language("fr;q=0, de"), vec!["de"]);
        assert!(parse_accept_language("").is_empty());
        assert!(parse_accept_language("en;q=abc").is_empty());
    }

    #[test]
    fn test_match_supported() {
        let supported = vec!["en".to_string(), "zh".to_string(), "pt-BR".to_string()];
        assert_eq!(match_supported(&["zh-CN"], &supported), Some("zh".to_string()));
        assert_eq!(match_supported(&["EN"], &supported), Some("en".to_string()));
        assert_eq!(match_supported(&["pt"], &supported), Some("pt-BR".to_string()));
        assert_eq!(
            match_supported(&["fr-FR", "de", "en-GB"], &supported),
            Some("en".to_string())
        );
        assert_eq!(match_supported(&["fr"], &supported), None);
        assert_eq!(match_supported::<&str>(&[], &supported), None);
    }
}
