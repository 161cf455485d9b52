//! String path helpers for library paths.
//!
//! Library paths are not necessarily local (`smb://`, `nfs://`, Windows
//! drive paths), so they are handled as strings rather than `PathBuf`.

/// Returns the separator used by a path: `\` for Windows-style paths, `/` otherwise.
pub fn path_sep(path: &str) -> char {
    if path.contains('\\') && !path.contains('/') {
        '\\'
    } else {
        '/'
    }
}

/// Appends the path's own separator unless it already ends with one.
pub fn with_trailing_sep(path: &str) -> String {
    let sep = path_sep(path);
    if path.ends_with(sep) {
        path.to_string()
    } else {
        format!("{}{}", path, sep)
    }
}

fn last_sep_index(path: &str) -> Option<usize> {
    path.rfind(['/', '\\'])
}

/// Splits a path into (directory, basename). The directory has no trailing separator
/// unless it is the root.
pub fn split(path: &str) -> (&str, &str) {
    match last_sep_index(path) {
        Some(0) => (&path[..1], &path[1..]),
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Returns the directory part of a path.
pub fn dirname(path: &str) -> &str {
    split(path).0
}

/// Splits off the extension of the final component, keeping the dot with the extension.
///
/// A leading dot on the basename is not an extension (`.hidden` has none).
pub fn split_ext(path: &str) -> (&str, &str) {
    let base_start = last_sep_index(path).map(|i| i + 1).unwrap_or(0);
    let base = &path[base_start..];
    let stripped = base.trim_start_matches('.');
    let leading = base.len() - stripped.len();
    match stripped.rfind('.') {
        Some(dot) => {
            let idx = base_start + leading + dot;
            (&path[..idx], &path[idx..])
        }
        None => (path, ""),
    }
}

/// Expands a `stack://` path into its member files. Other paths yield themselves.
pub fn movie_path_list(path: &str) -> Vec<String> {
    match path.strip_prefix("stack://") {
        Some(rest) => rest
            .split(" , ")
            .map(|part| part.replace(",,", ","))
            .collect(),
        None => vec![path.to_string()],
    }
}

/// Character-wise common prefix of several paths.
pub fn common_prefix<'a>(paths: impl IntoIterator<Item = &'a str>) -> String {
    let mut iter = paths.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut prefix: &str = first;
    for path in iter {
        let len = prefix
            .char_indices()
            .zip(path.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((idx, c), _)| idx + c.len_utf8())
            .unwrap_or(0);
        prefix = &prefix[..len];
    }
    prefix.to_string()
}

/// Lexically normalizes a local-style path: collapses `.`/`..` and duplicate separators.
pub fn normalize(path: &str) -> String {
    let sep = path_sep(path);
    let absolute = path.starts_with(sep);
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join(&sep.to_string());
    if absolute {
        format!("{}{}", sep, joined)
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_sep() {
        assert_eq!(path_sep("/media/movies/film.mkv"), '/');
        assert_eq!(path_sep("smb://nas/share/film.mkv"), '/');
        assert_eq!(path_sep(r"C:\Movies\film.mkv"), '\\');
    }

    #[test]
    fn test_split() {
        assert_eq!(split("/media/tv/show.mkv"), ("/media/tv", "show.mkv"));
        assert_eq!(split("/show.mkv"), ("/", "show.mkv"));
        assert_eq!(split("show.mkv"), ("", "show.mkv"));
        assert_eq!(split(r"D:\tv\ep.avi"), (r"D:\tv", "ep.avi"));
    }

    #[test]
    fn test_split_ext() {
        assert_eq!(split_ext("/a/b/film.mkv"), ("/a/b/film", ".mkv"));
        assert_eq!(split_ext("/a/b.dir/film"), ("/a/b.dir/film", ""));
        assert_eq!(split_ext("/a/b/.hidden"), ("/a/b/.hidden", ""));
        assert_eq!(split_ext("/a/b/"), ("/a/b/", ""));
        assert_eq!(split_ext("/a/Movie.2001.mkv"), ("/a/Movie.2001", ".mkv"));
    }

    #[test]
    fn test_movie_path_list_stack() {
        let list = movie_path_list("stack:///m/film-cd1.avi , /m/film-cd2.avi");
        assert_eq!(list, vec!["/m/film-cd1.avi", "/m/film-cd2.avi"]);
        assert_eq!(movie_path_list("/m/film.avi"), vec!["/m/film.avi"]);
    }

    #[test]
    fn test_common_prefix() {
        let prefix = common_prefix(["/music/Album/CD1", "/music/Album/CD2"]);
        assert_eq!(prefix, "/music/Album/CD");
        assert_eq!(dirname(&prefix), "/music/Album");
        assert_eq!(common_prefix(Vec::<&str>::new()), "");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/media//movies/./a/../b/"), "/media/movies/b");
        assert_eq!(normalize("/media/movies"), "/media/movies");
    }
}
