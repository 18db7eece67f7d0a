pub mod action_interpreter;
pub mod consolidator;
pub mod csv_processor;
pub mod row_expander;
pub mod table_search;
