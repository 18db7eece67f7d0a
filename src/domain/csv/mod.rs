// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Core table types shared by parsing, consolidation and search
// No I/O, no async

mod csv_row;
mod output_row;

pub use csv_row::{CsvField, CsvRow, CsvTable};
pub use output_row::OutputRow;

use std::collections::HashMap;
pub type FieldMap = HashMap<String, String>;
