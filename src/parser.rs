//! This module provides the compiler for transition-table programs, utilizing the `pest` crate
//! to split each source line into fields. Compilation never fails: malformed lines are skipped
//! and reported as diagnostics on the resulting `Program`.

use crate::types::{Diagnostic, Direction, Program, Transition};
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;
use tracing::{debug, warn};

/// Derives a `PestParser` for a single program line as defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TransitionTableParser;

/// The number of fields a rule line must provide.
const RULE_FIELDS: usize = 5;

/// Compiles program source text into a `Program`.
///
/// Every line is handled independently:
///
/// * blank and comment-only lines are skipped,
/// * lines with fewer than five fields produce a [`Diagnostic::Syntax`],
/// * a rule for an already defined (state, symbol) pair replaces the earlier
///   one and produces a [`Diagnostic::Redefinition`].
///
/// Carriage returns are removed before splitting into lines, so CRLF input
/// compiles the same as LF input.
pub fn compile(source: &str) -> Program {
    let source = source.replace('\r', "");
    let mut program = Program::default();

    for (index, text) in source.split('\n').enumerate() {
        let line = index + 1;

        let fields = match split_fields(text) {
            Some(fields) => fields,
            None => {
                syntax_error(&mut program, line, text);
                continue;
            }
        };

        if fields.is_empty() {
            continue;
        }

        if fields.len() < RULE_FIELDS {
            syntax_error(&mut program, line, text);
            continue;
        }

        let transition = parse_transition(&fields, line);
        if let Some(previous) = program.insert(transition.clone()) {
            let diagnostic = Diagnostic::Redefinition {
                state: transition.state,
                symbol: transition.symbol,
                first_line: previous.line,
                second_line: line,
            };
            warn!("{diagnostic}");
            program.diagnostics.push(diagnostic);
        }
    }

    debug!(
        rules = program.len(),
        diagnostics = program.diagnostics.len(),
        "compiled program"
    );

    program
}

/// Splits a line into its fields, dropping any comment.
///
/// Returns `None` when the grammar rejects the line.
fn split_fields(text: &str) -> Option<Vec<&str>> {
    let mut pairs = TransitionTableParser::parse(Rule::line, text).ok()?;
    let line = pairs.next()?;

    Some(
        line.into_inner()
            .filter(|pair| pair.as_rule() == Rule::field)
            .map(|pair| pair.as_str())
            .collect(),
    )
}

/// Builds a transition from the first five fields of a line. Extra fields are ignored.
fn parse_transition(fields: &[&str], line: usize) -> Transition {
    Transition {
        state: fields[0].to_string(),
        symbol: parse_symbol(fields[1]),
        write: parse_symbol(fields[2]),
        direction: Direction::from_action(parse_symbol(fields[3])),
        next_state: fields[4].to_string(),
        line,
    }
}

/// Takes the first character of a field. Fields produced by the grammar are never empty.
fn parse_symbol(field: &str) -> char {
    field.chars().next().unwrap_or(crate::types::BLANK_SYMBOL)
}

fn syntax_error(program: &mut Program, line: usize, text: &str) {
    let diagnostic = Diagnostic::Syntax {
        line,
        text: text.to_string(),
    };
    warn!("{diagnostic}");
    program.diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BLANK_SYMBOL, WILDCARD, WILDCARD_STATE};

    #[test]
    fn test_compile_simple_program() {
        let program = compile("0 1 0 r 0\n0 _ _ r halt");

        assert_eq!(program.len(), 2);
        assert!(program.diagnostics().is_empty());
        assert_eq!(
            program.rule("0", '1'),
            Some(&Transition {
                state: "0".into(),
                symbol: '1',
                write: '0',
                direction: Direction::Right,
                next_state: "0".into(),
                line: 1,
            })
        );
        assert_eq!(program.rule("0", BLANK_SYMBOL).unwrap().next_state, "halt");
    }

    #[test]
    fn test_compile_redefinition() {
        let program = compile("0 1 0 r 1\n0 1 1 l 2");

        let rule = program.rule("0", '1').unwrap();
        assert_eq!(rule.write, '1');
        assert_eq!(rule.direction, Direction::Left);
        assert_eq!(rule.next_state, "2");
        assert_eq!(rule.line, 2);
        assert_eq!(program.len(), 1);

        assert_eq!(
            program.diagnostics(),
            &[Diagnostic::Redefinition {
                state: "0".into(),
                symbol: '1',
                first_line: 1,
                second_line: 2,
            }]
        );
    }

    #[test]
    fn test_compile_comments_and_blank_lines() {
        let source = "; a comment\n\n   \n0 1 1 r 0 ; move right\n\t;indented comment";
        let program = compile(source);

        assert_eq!(program.len(), 1);
        assert!(program.diagnostics().is_empty());
        assert_eq!(program.rule("0", '1').unwrap().line, 4);
    }

    #[test]
    fn test_compile_comment_truncates_fields() {
        // The comment starts before the fifth field
        let program = compile("0 1 1 r;halt");

        assert!(program.is_empty());
        assert_eq!(
            program.diagnostics(),
            &[Diagnostic::Syntax {
                line: 1,
                text: "0 1 1 r;halt".into(),
            }]
        );
    }

    #[test]
    fn test_compile_short_lines_are_syntax_errors() {
        let program = compile("0\n0 1\n0 1 1\n0 1 1 r\n0 1 1 r 0");

        assert_eq!(program.len(), 1);
        let lines: Vec<usize> = program
            .diagnostics()
            .iter()
            .map(|d| match d {
                Diagnostic::Syntax { line, .. } => *line,
                other => panic!("unexpected diagnostic {other:?}"),
            })
            .collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_compile_tabs_and_extra_whitespace() {
        let program = compile("  q0\t\ta   b \t R  q1   extra fields");

        let rule = program.rule("q0", 'a').unwrap();
        assert_eq!(rule.write, 'b');
        assert_eq!(rule.direction, Direction::Right);
        assert_eq!(rule.next_state, "q1");
    }

    #[test]
    fn test_compile_uses_first_character_of_symbol_fields() {
        let program = compile("s abc xyz left next");

        let rule = program.rule("s", 'a').unwrap();
        assert_eq!(rule.write, 'x');
        assert_eq!(rule.direction, Direction::Left);
    }

    #[test]
    fn test_compile_actions() {
        let program = compile("0 a a > 0\n0 b b < 0\n0 c c R 0\n0 d d L 0\n0 e e * 0\n0 f f - 0");

        let direction = |symbol| program.rule("0", symbol).unwrap().direction;
        assert_eq!(direction('a'), Direction::Right);
        assert_eq!(direction('b'), Direction::Left);
        assert_eq!(direction('c'), Direction::Right);
        assert_eq!(direction('d'), Direction::Left);
        assert_eq!(direction('e'), Direction::Stay);
        assert_eq!(direction('f'), Direction::Stay);
    }

    #[test]
    fn test_compile_wildcards() {
        let program = compile("* * * r *");

        let rule = program.rule(WILDCARD_STATE, WILDCARD).unwrap();
        assert_eq!(rule.write, WILDCARD);
        assert_eq!(rule.next_state, WILDCARD_STATE);
    }

    #[test]
    fn test_compile_is_case_sensitive() {
        let program = compile("A x y r B\na x z r b");

        assert_eq!(program.len(), 2);
        assert_eq!(program.rule("A", 'x').unwrap().write, 'y');
        assert_eq!(program.rule("a", 'x').unwrap().write, 'z');
        assert!(program.rule("a", 'X').is_none());
    }

    #[test]
    fn test_compile_crlf() {
        let program = compile("0 1 0 r 1\r\n1 _ 1 l halt\r\n");

        assert_eq!(program.len(), 2);
        assert!(program.diagnostics().is_empty());
        assert_eq!(program.rule("1", '_').unwrap().next_state, "halt");
    }

    #[test]
    fn test_compile_empty_source() {
        let program = compile("");

        assert!(program.is_empty());
        assert!(program.diagnostics().is_empty());
    }
}
