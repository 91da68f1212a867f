//! This module provides the `ProgramLoader` struct, responsible for loading program source
//! text from files, strings and directories, together with the default initial tape a
//! program may declare in a `$INITIAL_TAPE:` comment.

use crate::types::TuringMachineError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of program files.
pub const PROGRAM_EXTENSION: &str = "tm";

lazy_static! {
    static ref INITIAL_TAPE: Regex =
        Regex::new(r";.*\$INITIAL_TAPE:? *(.+)$").expect("initial tape pattern is valid");
}

/// Program source text as delivered by a source provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSource {
    /// A display name, usually the file stem.
    pub name: String,
    /// The raw source text, compiled by the machine.
    pub text: String,
    /// The initial tape declared by the source, if any.
    pub initial_tape: Option<String>,
}

impl ProgramSource {
    /// Wraps source text, picking up its `$INITIAL_TAPE:` directive.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            name: name.into(),
            initial_tape: initial_tape_directive(&text),
            text,
        }
    }

    /// Returns the declared initial tape, or an empty tape.
    pub fn initial_tape(&self) -> &str {
        self.initial_tape.as_deref().unwrap_or_default()
    }
}

/// Finds the first `$INITIAL_TAPE:` directive inside a comment and returns its value.
///
/// The colon is optional and the value runs to the end of the line, with
/// surrounding whitespace removed.
///
/// ```text
/// ; Binary increment
/// ; $INITIAL_TAPE: 1011
/// ```
pub fn initial_tape_directive(text: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| INITIAL_TAPE.captures(line.trim_end_matches('\r')))
        .filter_map(|captures| captures.get(1))
        .map(|value| value.as_str().trim().to_string())
        .find(|value| !value.is_empty())
}

/// `ProgramLoader` is a utility struct for loading programs.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(ProgramSource)` named after the file stem.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    pub fn load_program(path: &Path) -> Result<ProgramSource, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(ProgramSource::new(name, content))
    }

    /// Loads a single program from the provided string content, e.g. from user input.
    pub fn load_program_from_string(name: &str, content: &str) -> ProgramSource {
        ProgramSource::new(name, content)
    }

    /// Loads all program files (`.tm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each remaining
    /// file produces one result, so a single unreadable file doesn't hide the
    /// others.
    pub fn load_programs(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, ProgramSource), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.tm files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(Self::load_program(&path).map(|source| (path, source)))
            })
            .collect();

        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_initial_tape_directive() {
        let text = "; Binary increment\n; $INITIAL_TAPE: 1011\n0 * * r 0\n";
        assert_eq!(initial_tape_directive(text), Some("1011".to_string()));
    }

    #[test]
    fn test_initial_tape_directive_variants() {
        assert_eq!(
            initial_tape_directive("0 1 1 r 0 ; $INITIAL_TAPE 111  "),
            Some("111".to_string())
        );
        assert_eq!(
            initial_tape_directive(";$INITIAL_TAPE:abc def\r\n"),
            Some("abc def".to_string())
        );
        assert_eq!(
            initial_tape_directive("; first\n; $INITIAL_TAPE: 1\n; $INITIAL_TAPE: 2"),
            Some("1".to_string())
        );
    }

    #[test]
    fn test_initial_tape_directive_requires_comment() {
        assert_eq!(initial_tape_directive("$INITIAL_TAPE: 101"), None);
        assert_eq!(initial_tape_directive("; $INITIAL_TAPE:   "), None);
        assert_eq!(initial_tape_directive("0 1 1 r 0"), None);
    }

    #[test]
    fn test_program_source_initial_tape() {
        let source = ProgramSource::new("inline", "0 1 1 r 0");
        assert_eq!(source.initial_tape(), "");

        let source = ProgramSource::new("inline", "; $INITIAL_TAPE: 10\n0 1 1 r 0");
        assert_eq!(source.initial_tape(), "10");
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("increment.tm");

        let program_content = "; $INITIAL_TAPE: 11\n0 1 1 r 0\n0 _ 1 * halt\n";

        let mut file = File::create(&file_path).unwrap();
        file.write_all(program_content.as_bytes()).unwrap();

        let source = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(source.name, "increment");
        assert_eq!(source.text, program_content);
        assert_eq!(source.initial_tape.as_deref(), Some("11"));
    }

    #[test]
    fn test_load_missing_program() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_program(&dir.path().join("missing.tm"));

        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_program_from_string() {
        let source = ProgramLoader::load_program_from_string("stdin", "0 1 1 r 0");

        assert_eq!(source.name, "stdin");
        assert_eq!(source.initial_tape, None);
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        for (name, content) in [
            ("b.tm", "0 1 1 r 0"),
            ("a.tm", "; $INITIAL_TAPE: 1\n0 1 1 r 0"),
            ("ignored.txt", "This file should be ignored"),
        ] {
            let mut file = File::create(dir.path().join(name)).unwrap();
            file.write_all(content.as_bytes()).unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let results = ProgramLoader::load_programs(dir.path());

        assert_eq!(results.len(), 2);
        let names: Vec<String> = results
            .iter()
            .map(|result| result.as_ref().unwrap().1.name.clone())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_load_programs_missing_directory() {
        let dir = tempdir().unwrap();
        let results = ProgramLoader::load_programs(&dir.path().join("nope"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
