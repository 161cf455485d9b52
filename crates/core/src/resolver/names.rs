//! Directory name cleaning and matching.

use once_cell::sync::Lazy;
use regex_lite::Regex;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

static MOVIE_DIR: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(.*?)[\s._]*[(\[]((?:18|19|20)\d{2})[)\]]\s*$").ok());

/// Makes a title usable as a single path component.
pub fn clean_name(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();
    replaced.trim_end_matches(['.', ' ']).to_string()
}

/// Name for a new directory: the clean title, plus `_<slug>` when disambiguating.
pub fn cleanest_name(title: &str, slug: Option<&str>) -> String {
    match slug {
        Some(slug) => format!("{}_{}", clean_name(title), slug),
        None => clean_name(title),
    }
}

/// Names an existing directory may carry for this title. With a slug only slugged names count.
pub fn candidate_names(title: &str, slug: Option<&str>) -> Vec<String> {
    let mut names = vec![title.to_string()];
    let clean = clean_name(title);
    if clean != title {
        names.push(clean);
    }
    match slug {
        Some(slug) => names.into_iter().map(|n| format!("{}_{}", n, slug)).collect(),
        None => names,
    }
}

/// Splits a `Title (Year)` directory name. Names without a year return themselves.
pub fn clean_movie_title(dir_name: &str) -> (String, Option<i32>) {
    if let Some(caps) = MOVIE_DIR.as_ref().and_then(|re| re.captures(dir_name)) {
        let title = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let year = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if !title.is_empty() {
            return (title.to_string(), year);
        }
    }
    (dir_name.to_string(), None)
}

/// Finds an existing entry in `names` matching `title`.
///
/// With `year`, names are parsed as `Title (Year)` and a differing year rules a
/// name out. With `strip_art_suffix`, each name loses its trailing `-<arttype>`
/// first (file listings), and the stripped name is what is returned.
pub fn find_existing(
    names: &[String],
    title: &str,
    slug: Option<&str>,
    year: Option<i32>,
    strip_art_suffix: bool,
) -> Option<String> {
    let candidates = candidate_names(title, slug);
    for name in names {
        let (clean_title, name_year) = match year {
            Some(_) => clean_movie_title(name),
            None => (name.clone(), None),
        };
        if let (Some(found), Some(wanted)) = (name_year, year) {
            if found != wanted {
                continue;
            }
        }
        let item = if strip_art_suffix {
            name.rsplit_once('-').map(|(head, _)| head).unwrap_or(name)
        } else {
            name.as_str()
        };
        if candidates.iter().any(|c| *c == clean_title || c == item) {
            return Some(item.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("AC/DC"), "AC_DC");
        assert_eq!(clean_name("What?*"), "What__");
        assert_eq!(clean_name("Mr. Robot..."), "Mr. Robot");
        assert_eq!(clean_name("Trailing. . "), "Trailing");
        assert_eq!(clean_name("Plain"), "Plain");
    }

    #[test]
    fn test_cleanest_name() {
        assert_eq!(cleanest_name("Genesis", Some("8e3f")), "Genesis_8e3f");
        assert_eq!(cleanest_name("AC/DC", None), "AC_DC");
    }

    #[test]
    fn test_candidate_names_with_slug_excludes_plain() {
        let candidates = candidate_names("AC/DC", Some("abcd"));
        assert_eq!(candidates, vec!["AC/DC_abcd", "AC_DC_abcd"]);
        assert_eq!(candidate_names("Genesis", None), vec!["Genesis"]);
    }

    #[test]
    fn test_clean_movie_title() {
        assert_eq!(clean_movie_title("Alien (1979)"), ("Alien".to_string(), Some(1979)));
        assert_eq!(clean_movie_title("Alien [1979]"), ("Alien".to_string(), Some(1979)));
        assert_eq!(clean_movie_title("Alien"), ("Alien".to_string(), None));
        assert_eq!(clean_movie_title("(2001)"), ("(2001)".to_string(), None));
    }

    #[test]
    fn test_find_existing_movie_year() {
        let dirs = names(&["Alien (1979)", "Alien (2003)", "Aliens (1986)"]);
        assert_eq!(
            find_existing(&dirs, "Alien", None, Some(2003), false).as_deref(),
            Some("Alien (2003)")
        );
        assert_eq!(find_existing(&dirs, "Alien", None, Some(1990), false), None);
    }

    #[test]
    fn test_find_existing_slug() {
        let dirs = names(&["Genesis", "Genesis_8e3f"]);
        assert_eq!(
            find_existing(&dirs, "Genesis", Some("8e3f"), None, false).as_deref(),
            Some("Genesis_8e3f")
        );
        assert_eq!(find_existing(&dirs, "Genesis", Some("0000"), None, false), None);
        assert_eq!(find_existing(&dirs, "Genesis", None, None, false).as_deref(), Some("Genesis"));
    }

    #[test]
    fn test_find_existing_files_strip_art_suffix() {
        let files = names(&["Pilot-fanart.jpg", "Other-thumb.jpg"]);
        assert_eq!(find_existing(&files, "Pilot", None, None, true).as_deref(), Some("Pilot"));
        assert_eq!(find_existing(&files, "Missing", None, None, true), None);
    }
}
