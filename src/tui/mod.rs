pub mod footer;
pub mod header;
pub mod render;
pub mod repo_input;
pub mod run_detail;
pub mod run_list;
pub mod spinner;
pub mod startup;
