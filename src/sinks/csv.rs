use std::borrow::Cow;
use std::io::Write;

use csv::{ByteRecord, Writer, WriterBuilder};
use itoa::Buffer as ItoaBuffer;
use ryu::Buffer as RyuBuffer;

use crate::error::{Error, Result};
use crate::sinks::{RowSink, SinkContext};
use crate::value::Value;

/// Writes dataset rows into a delimited text file (CSV/TSV).
///
/// Missing cells become empty fields, whatever their provenance.
pub struct CsvSink<W: Write> {
    output: Option<W>,
    writer: Option<Writer<W>>,
    delimiter: u8,
    write_headers: bool,
    column_count: usize,
    record: ByteRecord,
    scratch: Vec<Vec<u8>>, // one scratch buffer per column
}

impl<W: Write> CsvSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            output: Some(writer),
            writer: None,
            delimiter: b',',
            write_headers: true,
            column_count: 0,
            record: ByteRecord::new(),
            scratch: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn with_headers(mut self, headers: bool) -> Self {
        self.write_headers = headers;
        self
    }

    /// Returns the underlying writer once the sink has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink is still writing or was already drained.
    pub fn into_inner(mut self) -> Result<W> {
        if self.writer.is_some() {
            return Err(Error::InvalidData {
                details: Cow::from("CSV sink has not finished"),
            });
        }
        self.output.take().ok_or_else(|| Error::InvalidData {
            details: Cow::from("CSV sink output already taken"),
        })
    }

    fn build_writer(&mut self) -> Result<()> {
        let output = self.output.take().ok_or_else(|| Error::InvalidData {
            details: Cow::from("CSV sink output already taken"),
        })?;
        let writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(output);
        self.writer = Some(writer);
        Ok(())
    }

    fn writer(&mut self) -> Result<&mut Writer<W>> {
        self.writer.as_mut().ok_or_else(|| Error::InvalidData {
            details: Cow::from("CSV sink used before begin"),
        })
    }

    fn write_headers(&mut self, context: &SinkContext<'_>) -> Result<()> {
        if !self.write_headers {
            return Ok(());
        }
        let mut header = ByteRecord::new();
        for column in context.columns {
            header.push_field(column.name().as_bytes());
        }
        self.writer()?.write_byte_record(&header)?;
        Ok(())
    }

    fn encode_value(value: &Value, out: &mut Vec<u8>, ryu: &mut RyuBuffer, itoa: &mut ItoaBuffer) {
        out.clear();
        match value {
            Value::Missing(_) => {
                // empty field
            }
            Value::Float(v) => {
                out.extend_from_slice(ryu.format(*v).as_bytes());
            }
            Value::Integer(v) => {
                out.extend_from_slice(itoa.format(*v).as_bytes());
            }
            Value::Boolean(v) => {
                out.extend_from_slice(if *v { b"true".as_slice() } else { b"false".as_slice() });
            }
            Value::Text(s) => {
                out.extend_from_slice(s.as_bytes());
            }
        }
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()> {
        if self.writer.is_some() {
            return Err(Error::InvalidData {
                details: Cow::from("CSV sink cannot be reused without finishing"),
            });
        }

        self.build_writer()?;
        self.column_count = context.columns.len();
        self.record = ByteRecord::with_capacity(self.column_count * 16, self.column_count);
        self.scratch = (0..self.column_count).map(|_| Vec::with_capacity(32)).collect();

        self.write_headers(&context)
    }

    fn write_row(&mut self, row: &[&Value]) -> Result<()> {
        if row.len() != self.column_count {
            return Err(Error::InvalidData {
                details: Cow::Owned(format!(
                    "row length {} does not match expected {}",
                    row.len(),
                    self.column_count
                )),
            });
        }
        self.record.clear();
        let mut ryu = RyuBuffer::new();
        let mut itoa = ItoaBuffer::new();

        for (buf, value) in self.scratch.iter_mut().zip(row) {
            Self::encode_value(value, buf, &mut ryu, &mut itoa);
            self.record.push_field(buf);
        }
        let writer = self.writer.as_mut().ok_or_else(|| Error::InvalidData {
            details: Cow::from("CSV sink used before begin"),
        })?;
        writer.write_byte_record(&self.record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            let out = writer.into_inner().map_err(|e| Error::Csv {
                details: Cow::Owned(format!("csv into_inner failed: {e}")),
            })?;
            self.output = Some(out);
        }
        self.column_count = 0;
        self.scratch.clear();
        self.record.clear();
        Ok(())
    }
}
