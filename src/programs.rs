use crate::loader::ProgramSource;
use crate::types::TuringMachineError;

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 4] = [
    (
        "binary-increment",
        include_str!("../programs/binary-increment.tm"),
    ),
    ("unary-addition", include_str!("../programs/unary-addition.tm")),
    ("palindrome", include_str!("../programs/palindrome.tm")),
    ("busy-beaver-3", include_str!("../programs/busy-beaver-3.tm")),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<ProgramSource> = PROGRAM_TEXTS
        .iter()
        .map(|(name, text)| ProgramSource::new(*name, *text))
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_by_index(index: usize) -> Result<&'static ProgramSource, TuringMachineError> {
        PROGRAMS.get(index).ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_by_name(name: &str) -> Result<&'static ProgramSource, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// List all program names
    pub fn list_names() -> Vec<&'static str> {
        PROGRAMS
            .iter()
            .map(|program| program.name.as_str())
            .collect()
    }

    /// Search for programs by name
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}
