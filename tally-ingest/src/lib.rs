//! tally-ingest: statement text assembly, layout parsers, and format dispatch.

pub mod decode;
pub mod diagnostics;
pub mod dispatch;
pub mod lines;
pub mod parsers;
pub mod types;

pub use diagnostics::ParseDiagnostics;
pub use dispatch::{ParsedStatement, parse_statement};
pub use lines::assemble_lines;
pub use types::{RawTransaction, StatementFormat, TextFragment};
