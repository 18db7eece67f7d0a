// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV parsing, encoding detection and output writing

mod csv_parser;
mod csv_writer;

pub use csv_parser::CsvParser;
pub use csv_writer::CsvWriter;
