//! CLI subcommand implementations for the url2pdf binary.

pub mod doctor;
pub mod render_cmd;
