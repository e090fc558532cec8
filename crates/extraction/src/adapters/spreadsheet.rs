//! Spreadsheet decoding with calamine and csv

use super::{SpreadsheetDecoder, SpreadsheetFormat};
use crate::errors::ExtractionError;
use crate::tabular::CellGrid;
use calamine::{open_workbook_auto_from_rs, Reader};
use std::io::Cursor;
use tracing::debug;

/// Reads the first worksheet of a workbook, or a whole CSV file
#[derive(Debug, Default, Clone, Copy)]
pub struct CalamineDecoder;

impl CalamineDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_workbook(&self, bytes: &[u8]) -> Result<CellGrid, ExtractionError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| decode_error("workbook", e))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| decode_error("workbook", "workbook has no sheets"))?
            .map_err(|e| decode_error("workbook", e))?;

        let grid: CellGrid = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        debug!(rows = grid.len(), "Decoded first worksheet");
        Ok(grid)
    }

    fn decode_csv(&self, bytes: &[u8]) -> Result<CellGrid, ExtractionError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut grid = CellGrid::new();
        for record in reader.records() {
            let record = record.map_err(|e| decode_error("csv", e))?;
            grid.push(record.iter().map(str::to_string).collect());
        }

        debug!(rows = grid.len(), "Decoded CSV");
        Ok(grid)
    }
}

impl SpreadsheetDecoder for CalamineDecoder {
    fn decode(&self, bytes: &[u8], format: SpreadsheetFormat) -> Result<CellGrid, ExtractionError> {
        match format {
            SpreadsheetFormat::Workbook => self.decode_workbook(bytes),
            SpreadsheetFormat::Csv => self.decode_csv(bytes),
        }
    }
}

fn decode_error(format: &str, e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Decode {
        format: format.to_string(),
        message: e.to_string(),
    }
}
