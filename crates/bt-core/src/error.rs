use thiserror::Error;

/// Header rejected by strict parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeaderError {
    #[error("header '{header}' has an empty biomarker name")]
    EmptyName { header: String },

    #[error("header '{header}' has an unmatched '{delimiter}' in its name")]
    UnexpectedDelimiter { header: String, delimiter: char },

    #[error("header '{header}' has a non-numeric range bound '{fragment}'")]
    InvalidBound { header: String, fragment: String },
}

/// Date that matched none of the accepted formats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to parse date: '{input}'")]
pub struct DateError {
    pub input: String,
}
