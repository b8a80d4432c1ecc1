mod loader;
mod matrix;

pub use loader::{CorrelationSource, load_correlation, load_local, load_remote, validate_payload};
pub use matrix::{
    NamedColumn, build_correlation_matrix, build_from_table, canonicalize, numeric_columns,
    off_diagonal_extrema,
};
