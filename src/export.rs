/*!
 * CSV export of annotation rows.
 *
 * Columns are `fieldname,start,end,value,filename`. In append mode rows are
 * added to an existing file and no header line is written, so several
 * documents can be exported into one table.
 */

use std::fs::{File, OpenOptions};
use std::path::Path;

use log::debug;

use crate::document::ExportRow;
use crate::errors::AppError;

/// Header line of the export table
pub const COLUMNS: [&str; 5] = ["fieldname", "start", "end", "value", "filename"];

/// Streams export rows into a CSV file.
pub struct CsvExporter {
    writer: csv::Writer<File>,
    rows: usize,
}

impl CsvExporter {
    /// Open the output file, truncating it unless `append` is set
    pub fn create<P: AsRef<Path>>(path: P, append: bool) -> Result<Self, AppError> {
        let path = path.as_ref();
        let file = if append {
            OpenOptions::new().create(true).append(true).open(path)?
        } else {
            File::create(path)?
        };

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if !append {
            writer.write_record(COLUMNS)?;
        }
        debug!("Exporting to {} (append: {})", path.display(), append);
        Ok(Self { writer, rows: 0 })
    }

    /// Append rows, returning how many were written
    pub fn write_rows(&mut self, rows: &[ExportRow]) -> Result<usize, AppError> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.rows += rows.len();
        Ok(rows.len())
    }

    /// Flush and report the total number of rows written
    pub fn finish(mut self) -> Result<usize, AppError> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}
