use chrono::Utc;
use std::path::Path;

/// Suffix + extension marking processed outputs in the upload directory
pub const PROCESSED_SUFFIX: &str = "_processed";
pub const PROCESSED_EXT: &str = "png";

/// Reduce a client-supplied filename to a safe flat name. Client names can
/// carry arbitrary path fragments; only the final component survives, with
/// separator and control characters replaced.
pub fn sanitize_original(filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == '/'
                || c == '\\'
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized
    }
}

/// Name for a stored input: millisecond timestamp prefix plus the original
/// name. Best-effort collision resistance only; two uploads in the same
/// millisecond can still collide.
pub fn stored_input_name(original: &str) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), original)
}

/// Name for the processed output, derived deterministically from the
/// original name: same base name in, same output name out, so a repeat
/// upload overwrites the previous output.
pub fn output_name(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original);
    format!("{}{}.{}", stem, PROCESSED_SUFFIX, PROCESSED_EXT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_passes_plain_names_through() {
        assert_eq!(sanitize_original("cat.jpg"), "cat.jpg");
        assert_eq!(sanitize_original("my photo.png"), "my photo.png");
        assert_eq!(sanitize_original("测试.jpg"), "测试.jpg");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_original("../../../etc/passwd"), "passwd");
        assert_eq!(sanitize_original("/tmp/cat.jpg"), "cat.jpg");
    }

    #[test]
    fn test_sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_original("a:b*c.jpg"), "a_b_c.jpg");
    }

    #[test]
    fn test_sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_original(""), "unnamed");
        assert_eq!(sanitize_original(".."), "unnamed");
    }

    #[test]
    fn test_stored_input_name_is_timestamp_prefixed() {
        let name = stored_input_name("cat.jpg");
        let (prefix, rest) = name.split_once('-').unwrap();
        assert!(prefix.parse::<i64>().is_ok());
        assert_eq!(rest, "cat.jpg");
    }

    #[test]
    fn test_output_name_is_deterministic() {
        assert_eq!(output_name("cat.jpg"), "cat_processed.png");
        assert_eq!(output_name("cat.jpg"), output_name("cat.jpg"));
    }

    #[test]
    fn test_output_name_without_extension() {
        assert_eq!(output_name("cat"), "cat_processed.png");
    }

    #[test]
    fn test_output_name_ignores_original_extension() {
        assert_eq!(output_name("portrait.tiff"), "portrait_processed.png");
    }
}
