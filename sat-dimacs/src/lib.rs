//! DIMACS CNF reader and writer.
//!
//! Reads the textual DIMACS CNF format into a [`Model`](sat_formula::Model): `c`-prefixed comment
//! lines and blank lines are ignored, exactly one `p cnf <vars> <clauses>` header is required, and
//! clauses are whitespace/newline-separated runs of signed non-zero integers terminated by `0`.
use std::{borrow::Borrow, io};

use sat_formula::{Lit, Model, Var};

use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParserError {
    #[error("line {line}: unexpected token in DIMACS CNF input: '{token}'")]
    UnexpectedToken { line: usize, token: String },
    #[error("line {line}: literal index is too large for {max} declared variables: {text}")]
    LiteralTooLarge {
        line: usize,
        text: String,
        max: usize,
    },
    #[error("line {line}: invalid header, expected 'p cnf <variables> <clauses>': {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("missing 'p cnf <variables> <clauses>' header")]
    MissingHeader,
    #[error("line {line}: duplicate 'p cnf' header")]
    DuplicateHeader { line: usize },
    #[error("line {line}: unterminated clause (no trailing '0')")]
    UnterminatedClause { line: usize },
    #[error("formula has {var_count} variables while the header declares {header_var_count}")]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error("formula has {clause_count} clauses while the header declares {header_clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
}

/// Variable and clause count declared in a DIMACS CNF header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parses a full DIMACS CNF input into a [`Model`].
///
/// The declared header counts are cross-checked against the observed variable and clause counts:
/// the check compares against the *declared* header values, not against any internal container
/// capacity.
pub fn parse(mut input: impl io::Read) -> Result<Model, ParserError> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(|err| ParserError::UnexpectedToken {
            line: 0,
            token: err.to_string(),
        })?;
    parse_str(&text)
}

/// Parses a full DIMACS CNF input already held in memory.
pub fn parse_str(text: &str) -> Result<Model, ParserError> {
    let mut header: Option<DimacsHeader> = None;
    let mut model = Model::new();
    let mut clause_count = 0usize;
    let mut partial_clause: Vec<Lit> = vec![];
    let mut partial_clause_start_line = 0usize;

    for (line_index, line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('c') {
            continue;
        }

        if trimmed.starts_with('p') {
            if header.is_some() {
                return Err(ParserError::DuplicateHeader { line: line_number });
            }
            header = Some(parse_header_line(line_number, trimmed)?);
            continue;
        }

        let declared = header.ok_or(ParserError::MissingHeader)?;

        for token in trimmed.split_whitespace() {
            let number: isize = token.parse().map_err(|_| ParserError::UnexpectedToken {
                line: line_number,
                token: token.to_owned(),
            })?;

            if number == 0 {
                model.add_clause(partial_clause.drain(..));
                clause_count += 1;
                continue;
            }

            if partial_clause.is_empty() {
                partial_clause_start_line = line_number;
            }

            let index = number.unsigned_abs();
            if index > declared.var_count {
                return Err(ParserError::LiteralTooLarge {
                    line: line_number,
                    text: token.to_owned(),
                    max: declared.var_count,
                });
            }

            partial_clause.push(Lit::from_dimacs(number));
        }
    }

    let declared = header.ok_or(ParserError::MissingHeader)?;

    if !partial_clause.is_empty() {
        return Err(ParserError::UnterminatedClause {
            line: partial_clause_start_line,
        });
    }

    let observed_var_count = model.var_count();

    if observed_var_count != declared.var_count {
        return Err(ParserError::VarCount {
            var_count: observed_var_count,
            header_var_count: declared.var_count,
        });
    }

    model.set_var_count(declared.var_count);

    if clause_count != declared.clause_count {
        return Err(ParserError::ClauseCount {
            clause_count,
            header_clause_count: declared.clause_count,
        });
    }

    Ok(model)
}

fn parse_header_line(line: usize, header_line: &str) -> Result<DimacsHeader, ParserError> {
    let invalid = || ParserError::InvalidHeader {
        line,
        header: header_line.to_owned(),
    };

    let mut fields = header_line.split_whitespace();

    if fields.next() != Some("p") {
        return Err(invalid());
    }
    if fields.next() != Some("cnf") {
        return Err(invalid());
    }

    let var_count: usize = fields.next().and_then(|v| v.parse().ok()).ok_or_else(invalid)?;
    let clause_count: usize = fields.next().and_then(|v| v.parse().ok()).ok_or_else(invalid)?;

    if fields.next().is_some() {
        return Err(invalid());
    }

    if var_count > Var::max_count() {
        return Err(ParserError::LiteralTooLarge {
            line,
            text: var_count.to_string(),
            max: Var::max_count(),
        });
    }

    Ok(DimacsHeader {
        var_count,
        clause_count,
    })
}

/// Writes a DIMACS CNF header.
pub fn write_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Writes an iterator of clauses as headerless DIMACS CNF.
pub fn write_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Writes a model as DIMACS CNF, header followed by clauses.
pub fn write(target: &mut impl io::Write, model: &Model) -> io::Result<()> {
    write_header(
        &mut *target,
        DimacsHeader {
            var_count: model.var_count(),
            clause_count: model.len(),
        },
    )?;
    write_clauses(&mut *target, model.iter())
}
