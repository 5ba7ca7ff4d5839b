//! CLI domain: parse, route, output, and presentation only.
//! The route table drives the orchestrator; formatting stays in presentation.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    check_sheets_format, format_config, format_sheets, format_sheets_json, format_sheets_text,
    SheetReport,
};
pub use route::RunContext;
