//! Missing-value aware numeric coercion shared by every parser.

/// Raw cell as it arrives from a delimited source or a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        parse_numeric(self)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Missing)
    }
}

const NULL_TOKENS: [&str; 5] = ["", "na", "nan", "none", "null"];

pub fn is_null_like(raw: &str) -> bool {
    let trimmed = raw.trim();
    NULL_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

pub fn parse_numeric(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Missing => None,
        Cell::Number(v) => v.is_finite().then_some(*v),
        Cell::Text(s) => parse_numeric_str(s),
    }
}

pub fn parse_numeric_str(raw: &str) -> Option<f64> {
    if is_null_like(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    if is_null_like(raw) {
        return None;
    }
    let trimmed = raw.trim();
    for (token, value) in [("true", true), ("false", false), ("yes", true), ("no", false)] {
        if trimmed.eq_ignore_ascii_case(token) {
            return Some(value);
        }
    }
    parse_numeric_str(trimmed).map(|v| v != 0.0)
}
