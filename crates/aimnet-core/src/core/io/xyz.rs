use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::element::Element;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const DEFAULT_PROPERTIES: &str = "Properties=species:S:1:pos:R:3";
const NON_PERIODIC: &str = "pbc=\"F F F\"";
/// Upper bound on the atom buffer reserved from the count line.
const MAX_PREALLOCATED_ATOMS: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyzMetadata {
    /// The free-form second line of the frame.
    pub comment: String,
}

impl XyzMetadata {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
        }
    }

    /// Extended-XYZ style comment carrying the potential energy in eV.
    pub fn with_energy(energy: f64) -> Self {
        Self::new(format!(
            "{} energy={:.8} {}",
            DEFAULT_PROPERTIES, energy, NON_PERIODIC
        ))
    }
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Missing comment line after the atom count")]
    MissingComment,
    #[error("Expected {expected} atom lines, found {found}")]
    MissingAtoms { expected: usize, found: usize },
    #[error("Unexpected content after the last atom on line {line}")]
    TrailingContent { line: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count '{value}'")]
    InvalidAtomCount { value: String },
    #[error("Atom count must be at least 1")]
    ZeroAtoms,
    #[error("Expected {expected} tokens (symbol x y z), found {found}")]
    WrongTokenCount { expected: usize, found: usize },
    #[error("Unknown element symbol '{symbol}'")]
    UnknownElement { symbol: String },
    #[error("Invalid {axis} coordinate '{value}'")]
    InvalidFloat { axis: char, value: String },
    #[error("Non-finite {axis} coordinate '{value}'")]
    NonFiniteCoordinate { axis: char, value: String },
}

fn parse_error(line: usize, kind: XyzParseErrorKind) -> XyzError {
    XyzError::Parse { line, kind }
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<Atom, XyzError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 4 {
        return Err(parse_error(
            line_num,
            XyzParseErrorKind::WrongTokenCount {
                expected: 4,
                found: tokens.len(),
            },
        ));
    }

    let element = Element::from_symbol(tokens[0]).map_err(|_| {
        parse_error(
            line_num,
            XyzParseErrorKind::UnknownElement {
                symbol: tokens[0].to_string(),
            },
        )
    })?;

    let mut coords = [0.0; 3];
    for ((slot, token), axis) in coords.iter_mut().zip(&tokens[1..]).zip(['x', 'y', 'z']) {
        let value: f64 = token.parse().map_err(|_| {
            parse_error(
                line_num,
                XyzParseErrorKind::InvalidFloat {
                    axis,
                    value: token.to_string(),
                },
            )
        })?;
        if !value.is_finite() {
            return Err(parse_error(
                line_num,
                XyzParseErrorKind::NonFiniteCoordinate {
                    axis,
                    value: token.to_string(),
                },
            ));
        }
        *slot = value;
    }

    Ok(Atom::new(element, Point3::new(coords[0], coords[1], coords[2])))
}

/// The plain XYZ format: an atom-count line, a comment line, then one
/// `Symbol x y z` line per atom (Angstroms).
///
/// Only single-frame files are accepted.
pub struct XyzFile;

impl StructureFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(AtomicConfiguration, Self::Metadata), Self::Error> {
        let mut lines = reader.lines().enumerate().map(|(idx, l)| (idx + 1, l));

        let (count_line_num, count_line) = match lines.next() {
            Some((num, line)) => (num, line?),
            None => {
                return Err(parse_error(
                    1,
                    XyzParseErrorKind::InvalidAtomCount {
                        value: String::new(),
                    },
                ));
            }
        };
        let count_str = count_line.trim();
        let atom_count: usize = count_str.parse().map_err(|_| {
            parse_error(
                count_line_num,
                XyzParseErrorKind::InvalidAtomCount {
                    value: count_str.to_string(),
                },
            )
        })?;
        if atom_count == 0 {
            return Err(parse_error(count_line_num, XyzParseErrorKind::ZeroAtoms));
        }

        let comment = match lines.next() {
            Some((_, line)) => line?.trim_end().to_string(),
            None => return Err(XyzError::MissingComment),
        };

        let mut atoms = Vec::with_capacity(atom_count.min(MAX_PREALLOCATED_ATOMS));
        while atoms.len() < atom_count {
            match lines.next() {
                Some((line_num, line)) => atoms.push(parse_atom_line(&line?, line_num)?),
                None => {
                    return Err(XyzError::MissingAtoms {
                        expected: atom_count,
                        found: atoms.len(),
                    });
                }
            }
        }

        for (line_num, line) in lines {
            if !line?.trim().is_empty() {
                return Err(XyzError::TrailingContent { line: line_num });
            }
        }

        let configuration = AtomicConfiguration::new(atoms).map_err(|e| {
            XyzError::Io(io::Error::new(io::ErrorKind::InvalidData, e))
        })?;
        Ok((configuration, XyzMetadata { comment }))
    }

    fn write_to(
        configuration: &AtomicConfiguration,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", configuration.len())?;
        writeln!(writer, "{}", metadata.comment.replace(['\n', '\r'], " "))?;
        for atom in configuration.atoms() {
            writeln!(
                writer,
                "{:<2} {:>16.8} {:>16.8} {:>16.8}",
                atom.element.symbol(),
                atom.position.x,
                atom.position.y,
                atom.position.z
            )?;
        }
        Ok(())
    }

    fn write_configuration_to(
        configuration: &AtomicConfiguration,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let metadata = XyzMetadata::new(format!("{} {}", DEFAULT_PROPERTIES, NON_PERIODIC));
        Self::write_to(configuration, &metadata, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER: &str = "3\nwater molecule\nO 0.000000 0.000000 0.119262\nH 0.000000 0.763239 -0.477047\nH 0.000000 -0.763239 -0.477047\n";

    fn parse_kind(text: &str) -> XyzParseErrorKind {
        match XyzFile::read_from_str(text) {
            Err(XyzError::Parse { kind, .. }) => kind,
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn read_parses_elements_coordinates_and_comment() {
        let (config, metadata) = XyzFile::read_from_str(WATER).unwrap();
        assert_eq!(config.len(), 3);
        let symbols: Vec<_> = config.elements().map(|e| e.symbol()).collect();
        assert_eq!(symbols, vec!["O", "H", "H"]);
        assert_eq!(config.atoms()[1].position, Point3::new(0.0, 0.763239, -0.477047));
        assert_eq!(metadata.comment, "water molecule");
    }

    #[test]
    fn write_then_read_reproduces_atoms_within_tolerance() {
        let (config, metadata) = XyzFile::read_from_str(WATER).unwrap();
        let text = XyzFile::write_to_string(&config, &metadata).unwrap();
        let (reparsed, reparsed_meta) = XyzFile::read_from_str(&text).unwrap();

        assert_eq!(reparsed_meta, metadata);
        assert_eq!(reparsed.len(), config.len());
        for (a, b) in config.atoms().iter().zip(reparsed.atoms()) {
            assert_eq!(a.element, b.element);
            assert!((a.position - b.position).norm() < 1e-8);
        }
    }

    #[test]
    fn write_uses_fixed_width_columns() {
        let (config, _) = XyzFile::read_from_str(WATER).unwrap();
        let mut out = Vec::new();
        XyzFile::write_configuration_to(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "3");
        assert_eq!(lines[1], "Properties=species:S:1:pos:R:3 pbc=\"F F F\"");
        assert_eq!(lines[2], "O        0.00000000       0.00000000       0.11926200");
    }

    #[test]
    fn with_energy_embeds_energy_in_comment() {
        let metadata = XyzMetadata::with_energy(-76.5);
        assert!(metadata.comment.contains("energy=-76.50000000"));
    }

    #[test]
    fn read_rejects_malformed_atom_count() {
        assert_eq!(
            parse_kind("three\n\nH 0 0 0\n"),
            XyzParseErrorKind::InvalidAtomCount {
                value: "three".to_string()
            }
        );
        assert_eq!(parse_kind("0\ncomment\n"), XyzParseErrorKind::ZeroAtoms);
        assert!(matches!(
            parse_kind(""),
            XyzParseErrorKind::InvalidAtomCount { .. }
        ));
    }

    #[test]
    fn read_rejects_unknown_element_with_line_number() {
        let result = XyzFile::read_from_str("1\n\nQq 0 0 0\n");
        match result {
            Err(XyzError::Parse { line, kind }) => {
                assert_eq!(line, 3);
                assert_eq!(
                    kind,
                    XyzParseErrorKind::UnknownElement {
                        symbol: "Qq".to_string()
                    }
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn read_rejects_wrong_token_count() {
        assert_eq!(
            parse_kind("1\n\nH 0 0\n"),
            XyzParseErrorKind::WrongTokenCount {
                expected: 4,
                found: 3
            }
        );
        assert_eq!(
            parse_kind("1\n\nH 0 0 0 0.5\n"),
            XyzParseErrorKind::WrongTokenCount {
                expected: 4,
                found: 5
            }
        );
    }

    #[test]
    fn read_rejects_invalid_and_non_finite_coordinates() {
        assert_eq!(
            parse_kind("1\n\nH 0 abc 0\n"),
            XyzParseErrorKind::InvalidFloat {
                axis: 'y',
                value: "abc".to_string()
            }
        );
        assert_eq!(
            parse_kind("1\n\nH 0 0 nan\n"),
            XyzParseErrorKind::NonFiniteCoordinate {
                axis: 'z',
                value: "nan".to_string()
            }
        );
    }

    #[test]
    fn read_never_truncates_short_or_long_input() {
        assert!(matches!(
            XyzFile::read_from_str("3\ncomment\nH 0 0 0\n"),
            Err(XyzError::MissingAtoms {
                expected: 3,
                found: 1
            })
        ));
        assert!(matches!(
            XyzFile::read_from_str("1\ncomment\nH 0 0 0\nH 1 0 0\n"),
            Err(XyzError::TrailingContent { line: 4 })
        ));
        assert!(matches!(
            XyzFile::read_from_str("2\n"),
            Err(XyzError::MissingComment)
        ));
    }

    #[test]
    fn huge_atom_count_is_missing_atoms_not_an_allocation() {
        assert!(matches!(
            XyzFile::read_from_str("1000000000000000000\n\nH 0 0 0\n"),
            Err(XyzError::MissingAtoms {
                expected: 1_000_000_000_000_000_000,
                found: 1
            })
        ));
    }

    #[test]
    fn read_tolerates_trailing_blank_lines() {
        let (config, _) = XyzFile::read_from_str("1\n\nH 0 0 0\n\n   \n").unwrap();
        assert_eq!(config.len(), 1);
    }
}
