use crate::error::QrisError;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read `KEY=VALUE` pairs from an env file into a local map.
///
/// A missing file yields an empty map; a file that exists but cannot be read
/// is a fatal error. Blank lines, `#` comments, and lines without `=` are
/// skipped. Values keep everything after the first `=`, trimmed, with one
/// pair of surrounding matching quotes stripped. The first occurrence of a
/// key wins.
pub fn load(path: &Path) -> Result<HashMap<String, String>, QrisError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(err) => {
            return Err(QrisError::EnvFile {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    let mut vars = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_string();
        let value = strip_quotes(value.trim()).to_string();
        vars.entry(key).or_insert(value);
    }
    debug!("Loaded {} entries from {}", vars.len(), path.display());
    Ok(vars)
}

fn strip_quotes(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_env(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(".env");
        let mut file = fs::File::create(&path).expect("create env file");
        file.write_all(content.as_bytes()).expect("write env file");
        (dir, path)
    }

    #[test]
    fn parses_trimmed_pairs() {
        let (_dir, path) = write_env("  MANDIRI_SECRET_ID = abc123  \nMANDIRI_COOKIE=a=1; b=2\n");
        let vars = load(&path).expect("env file should load");
        assert_eq!(vars.get("MANDIRI_SECRET_ID").map(String::as_str), Some("abc123"));
        // value keeps everything after the first `=`
        assert_eq!(vars.get("MANDIRI_COOKIE").map(String::as_str), Some("a=1; b=2"));
    }

    #[test]
    fn strips_surrounding_quotes() {
        let (_dir, path) = write_env(
            "A=\"double quoted\"\nB='single quoted'\nC=\"mismatched'\nD=\"\"\nE=say \"hi\" there\n",
        );
        let vars = load(&path).expect("env file should load");
        assert_eq!(vars.get("A").map(String::as_str), Some("double quoted"));
        assert_eq!(vars.get("B").map(String::as_str), Some("single quoted"));
        assert_eq!(vars.get("C").map(String::as_str), Some("\"mismatched'"));
        assert_eq!(vars.get("D").map(String::as_str), Some(""));
        // quotes are only stripped when they surround the whole value
        assert_eq!(vars.get("E").map(String::as_str), Some("say \"hi\" there"));
    }

    #[test]
    fn skips_comments_blanks_and_malformed_lines() {
        let (_dir, path) = write_env("# comment\n\n   \nnot a pair\nKEY=value\n  # indented comment\n");
        let vars = load(&path).expect("env file should load");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("KEY").map(String::as_str), Some("value"));
    }

    #[test]
    fn first_occurrence_wins() {
        let (_dir, path) = write_env("KEY=first\nKEY=second\n");
        let vars = load(&path).expect("env file should load");
        assert_eq!(vars.get("KEY").map(String::as_str), Some("first"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let vars = load(&dir.path().join("no-such.env")).expect("missing file is a no-op");
        assert!(vars.is_empty());
    }

    #[test]
    fn unreadable_file_is_fatal() {
        // a directory exists but cannot be read as a file
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load(dir.path()).expect_err("directory should not load");
        assert!(matches!(err, QrisError::EnvFile { .. }));
    }
}
