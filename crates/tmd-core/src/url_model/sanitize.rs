//! File name cleanup for Linux filesystems.

/// Linux NAME_MAX, in bytes.
const NAME_MAX: usize = 255;

fn is_separator_like(c: char) -> bool {
    matches!(c, '\0' | '/' | '\\' | ' ' | '\t') || c.is_control()
}

/// Make `name` usable as a single path component.
///
/// Separators, whitespace and control characters become `_` (runs collapse
/// to one), leading and trailing dots and underscores are trimmed, and the
/// result is cut to NAME_MAX bytes on a char boundary.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if is_separator_like(c) {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmt_dates() {
        assert_eq!(
            sanitize_filename_for_linux("2018-09-26 08:00:00 GMT.77.mov"),
            "2018-09-26_08:00:00_GMT.77.mov"
        );
    }

    #[test]
    fn separators_and_controls() {
        assert_eq!(sanitize_filename_for_linux("a/b\\c\x00d.jpg"), "a_b_c_d.jpg");
        assert_eq!(sanitize_filename_for_linux("a  /  b"), "a_b");
    }

    #[test]
    fn edges_trimmed() {
        assert_eq!(sanitize_filename_for_linux(" ..x.jpg.. "), "x.jpg");
        assert_eq!(sanitize_filename_for_linux(".."), "");
    }

    #[test]
    fn long_names_cut_on_char_boundary() {
        let name = "é".repeat(200);
        let out = sanitize_filename_for_linux(&name);
        assert!(out.len() <= NAME_MAX);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
