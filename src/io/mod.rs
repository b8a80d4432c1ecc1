pub mod archive;
pub mod json_writer;
pub mod summary;
pub mod table;
pub mod tsv_writer;

pub use json_writer::write_json;
pub use table::{NumericTable, TableRow, decode_delimited, parse_delimited};
