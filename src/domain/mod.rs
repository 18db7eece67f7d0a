pub mod error;
pub mod llm_config;
pub mod table_action;

// CSV table and consolidation modules
pub mod consolidation;
pub mod csv;
