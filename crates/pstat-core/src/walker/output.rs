/// CSV record sink: serialises stat records in one of two column layouts.
///
/// The header row is written when the sink is constructed, so a sink that
/// exists always has a header. Every field except the path is written bare;
/// the path is always double-quoted with embedded quotes doubled.
use crate::model::StatRecord;
use crate::resolve::{ResolutionCache, FULL_PERMISSION_MASK, UNKNOWN};
use crate::Result;
use csv::{QuoteStyle, WriterBuilder};
use std::fmt::{Display, Write as _};
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::Arc;

pub const RAW_HEADER: [&str; 9] = [
    "INODE", "ACCESSED", "MODIFIED", "USER", "GROUP", "MODE", "SIZE", "DISK", "PATH",
];

pub const HUMAN_HEADER: [&str; 11] = [
    "INODE", "LINKS", "ACCESSED", "MODIFIED", "USER", "GROUP", "PERM", "SIZE", "DISK", "TYPE",
    "PATH",
];

/// Column layout of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Numeric fields exactly as `lstat` reports them.
    #[default]
    Raw,
    /// Dates, names, permission digits, and type labels via the resolution cache.
    Human,
}

impl OutputFormat {
    pub fn from_human(human: bool) -> Self {
        if human {
            Self::Human
        } else {
            Self::Raw
        }
    }

    pub fn header(self) -> &'static [&'static str] {
        match self {
            Self::Raw => &RAW_HEADER,
            Self::Human => &HUMAN_HEADER,
        }
    }
}

/// Writes stat records to any `Write` sink.
pub struct RecordWriter {
    writer: csv::Writer<Box<dyn Write + Send>>,
    format: OutputFormat,
    cache: Arc<ResolutionCache>,
    /// Reused formatting buffer for one field.
    scratch: String,
    /// Reused buffer for the quoted path column.
    path_bytes: Vec<u8>,
    rows: u64,
}

impl RecordWriter {
    /// Wrap `sink` and write the header row for `format`.
    pub fn new<W>(sink: W, format: OutputFormat, cache: Arc<ResolutionCache>) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_writer(Box::new(sink) as Box<dyn Write + Send>);
        writer.write_record(format.header())?;

        Ok(Self {
            writer,
            format,
            cache,
            scratch: String::with_capacity(64),
            path_bytes: Vec::with_capacity(256),
            rows: 0,
        })
    }

    /// Append one data row.
    pub fn write(&mut self, rec: &StatRecord) -> Result<()> {
        self.field(format_args!("{}-{}", rec.device_id, rec.inode))?;

        match self.format {
            OutputFormat::Raw => {
                self.field(rec.access_time)?;
                self.field(rec.modify_time)?;
                self.field(rec.uid)?;
                self.field(rec.gid)?;
                self.field(rec.mode)?;
                self.field(rec.size)?;
                self.field(rec.disk_bytes())?;
            }
            OutputFormat::Human if !rec.stat_ok => {
                // A zeroed record must not read as a root-owned 1970 entry.
                self.field(rec.link_count)?;
                for _ in 0..5 {
                    self.field(UNKNOWN)?;
                }
                self.field(rec.size)?;
                self.field(rec.disk_bytes())?;
                self.field(UNKNOWN)?;
            }
            OutputFormat::Human => {
                let cache = Arc::clone(&self.cache);
                self.field(rec.link_count)?;
                self.field(cache.date_string(rec.access_time))?;
                self.field(cache.date_string(rec.modify_time))?;
                self.field(cache.username(rec.uid))?;
                self.field(cache.groupname(rec.gid))?;
                self.field(cache.permission_string(rec.mode, FULL_PERMISSION_MASK))?;
                self.field(rec.size)?;
                self.field(rec.disk_bytes())?;
                self.field(cache.file_type(rec.mode))?;
            }
        }

        self.quoted_path(&rec.path)?;
        self.writer.write_record(None::<&[u8]>)?;
        self.rows += 1;
        Ok(())
    }

    /// Push buffered rows down to the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Data rows written so far (the header is not counted).
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The path is written as raw bytes, so names that are not UTF-8 survive.
    fn quoted_path(&mut self, path: &Path) -> Result<()> {
        self.path_bytes.clear();
        self.path_bytes.push(b'"');
        for &b in path.as_os_str().as_bytes() {
            if b == b'"' {
                self.path_bytes.push(b'"');
            }
            self.path_bytes.push(b);
        }
        self.path_bytes.push(b'"');
        self.writer.write_field(&self.path_bytes)?;
        Ok(())
    }

    fn field(&mut self, value: impl Display) -> Result<()> {
        self.scratch.clear();
        // Writing into a String cannot fail.
        let _ = write!(self.scratch, "{value}");
        self.writer.write_field(self.scratch.as_bytes())?;
        Ok(())
    }
}
