use crate::core::models::configuration::AtomicConfiguration;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing textual structure formats.
///
/// Implementors handle format-specific parsing and serialization of an
/// [`AtomicConfiguration`] together with whatever format metadata must survive
/// a read/write cycle (comment lines, headers, ...).
pub trait StructureFile {
    /// The type of metadata associated with the file format.
    type Metadata;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a configuration from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    /// Malformed input is always reported, never silently truncated.
    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(AtomicConfiguration, Self::Metadata), Self::Error>;

    /// Writes a configuration and metadata to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        configuration: &AtomicConfiguration,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a configuration with default metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_configuration_to(
        configuration: &AtomicConfiguration,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Parses a configuration from an in-memory string.
    fn read_from_str(text: &str) -> Result<(AtomicConfiguration, Self::Metadata), Self::Error> {
        Self::read_from(&mut text.as_bytes())
    }

    /// Serializes a configuration and metadata into a `String`.
    fn write_to_string(
        configuration: &AtomicConfiguration,
        metadata: &Self::Metadata,
    ) -> Result<String, Self::Error> {
        let mut buffer = Vec::new();
        Self::write_to(configuration, metadata, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Reads a configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(AtomicConfiguration, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a configuration and metadata to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        configuration: &AtomicConfiguration,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(configuration, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
