//! Row decoding sessions.
//!
//! A [`Decoder`] is bound to one input stream. [`Decoder::decode`] consumes it:
//! the first row becomes the [`FieldTable`], every following row becomes a
//! fresh record, and the records are appended to the caller's vector only once
//! the stream is exhausted. Type mismatches are non-fatal; the first one is
//! returned after the output has been filled.
//!
//! The decoder never closes its input. Pass `&mut reader` to keep ownership
//! of the stream past the session.

use std::{any::type_name, io::Read};

use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    coerce::{coerce, mismatch},
    error::{DecodeError, ReadError, TypeMismatchError},
    header::{Column, FieldTable},
    io_utils,
    record::{Kind, Record, validate_fields},
};

/// One tokenized row.
///
/// `malformed` lists the columns whose bytes were not valid in the source
/// encoding; their text holds replacement characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    pub malformed: Vec<usize>,
}

impl Row {
    pub fn is_malformed(&self, column: usize) -> bool {
        self.malformed.contains(&column)
    }
}

impl From<Vec<String>> for Row {
    fn from(cells: Vec<String>) -> Self {
        Self {
            cells,
            malformed: Vec::new(),
        }
    }
}

/// Source of tokenized rows. `Ok(None)` signals the end of the stream.
pub trait RowSource {
    fn read_row(&mut self) -> Result<Option<Row>, ReadError>;
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn read_row(&mut self) -> Result<Option<Row>, ReadError> {
        (**self).read_row()
    }
}

/// [`RowSource`] over a comma-delimited byte stream.
pub struct CsvRows<R> {
    reader: csv::Reader<R>,
    record: csv::ByteRecord,
    encoding: &'static Encoding,
}

impl<R: Read> CsvRows<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: io_utils::open_csv_reader(reader),
            record: csv::ByteRecord::new(),
            encoding: UTF_8,
        }
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

impl<R: Read> RowSource for CsvRows<R> {
    fn read_row(&mut self) -> Result<Option<Row>, ReadError> {
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(None);
        }
        let mut row = Row::default();
        for (idx, bytes) in self.record.iter().enumerate() {
            let (text, had_errors) = io_utils::decode_bytes(bytes, self.encoding);
            if had_errors {
                row.malformed.push(idx);
            }
            row.cells.push(text);
        }
        Ok(Some(row))
    }
}

/// Keeps the first type mismatch of a session.
#[derive(Debug, Default)]
pub struct FirstError {
    error: Option<TypeMismatchError>,
}

impl FirstError {
    pub fn record(&mut self, error: TypeMismatchError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn is_set(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_inner(self) -> Option<TypeMismatchError> {
        self.error
    }
}

/// A single-use decode session over one row source.
pub struct Decoder<S> {
    source: S,
    first_error: FirstError,
}

impl<R: Read> Decoder<CsvRows<R>> {
    pub fn new(reader: R) -> Self {
        Self::from_source(CsvRows::new(reader))
    }

    pub fn with_encoding(self, encoding: &'static Encoding) -> Self {
        Self {
            source: self.source.with_encoding(encoding),
            first_error: self.first_error,
        }
    }
}

impl<S: RowSource> Decoder<S> {
    pub fn from_source(source: S) -> Self {
        Self {
            source,
            first_error: FirstError::default(),
        }
    }

    /// Decodes every remaining row of the stream into `output`.
    ///
    /// Records are appended in row order and only when the whole stream was
    /// read. A read failure on any row leaves `output` untouched. If some
    /// cell failed to coerce, `output` is still filled and the first
    /// mismatch is returned as [`DecodeError::TypeMismatch`].
    pub fn decode<T: Record>(mut self, output: &mut Vec<T>) -> Result<(), DecodeError> {
        let fields = validate_fields::<T>()?;

        let header = match self.source.read_row() {
            Ok(Some(row)) => row,
            Ok(None) => return Err(DecodeError::MissingHeader),
            Err(err) => return Err(DecodeError::HeaderRead(err)),
        };
        let table = FieldTable::build(&header.cells, &fields);
        debug!(
            "Decoding into {}: {} of {} column(s) mapped, ignoring {:?}",
            type_name::<T>(),
            table.mapped_count(),
            header.cells.len(),
            table.ignored_names()
        );

        let mut decoded = Vec::new();
        while let Some(row) = self.source.read_row().map_err(DecodeError::RowRead)? {
            let record = self.decode_row(&table, &row, decoded.len() + 1);
            decoded.push(record);
        }

        debug!(
            "Decoded {} record(s){}",
            decoded.len(),
            if self.first_error.is_set() {
                " with type mismatches"
            } else {
                ""
            }
        );
        output.extend(decoded);
        match self.first_error.into_inner() {
            Some(err) => Err(DecodeError::TypeMismatch(err)),
            None => Ok(()),
        }
    }

    /// Undecodable bytes only matter in mapped columns, where they count as
    /// a type mismatch for that field.
    fn decode_row<T: Record>(&mut self, table: &FieldTable<T>, row: &Row, row_number: usize) -> T {
        let mut record = T::default();
        for (idx, column) in table.columns() {
            let Column::Mapped(field) = column else {
                continue;
            };
            let Some(value) = row.cells.get(idx) else {
                continue;
            };
            let outcome = if row.is_malformed(idx) && table.kind(idx) != Kind::Ignored {
                Err(mismatch(value, field))
            } else {
                coerce(value, field, &mut record)
            };
            if let Err(mut err) = outcome {
                err.row = row_number;
                err.column = idx;
                self.first_error.record(err);
            }
        }
        record
    }
}

/// Decodes a UTF-8 CSV stream into `output`.
pub fn decode_reader<T: Record, R: Read>(reader: R, output: &mut Vec<T>) -> Result<(), DecodeError> {
    Decoder::new(reader).decode(output)
}
