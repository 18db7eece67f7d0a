pub mod use_cases;

pub use use_cases::action_interpreter::{ActionInterpreter, Interpretation, ResultSummary};
pub use use_cases::csv_processor::{CsvProcessor, HeaderPreview, ProcessedTable, ProcessingReport};
pub use use_cases::table_search::{apply_action, paginate, search_rows, ResultPage, SearchCache};
