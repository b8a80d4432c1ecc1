pub mod binomial;
pub mod numeric;
pub mod pearson;

pub use binomial::Binomial;
pub use numeric::{Cell, is_null_like, parse_numeric, parse_numeric_str};
pub use pearson::pearson_pairwise;
