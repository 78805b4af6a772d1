use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("failed to parse input, reason: `{0}`")]
    ParsingFailure(String),
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("record is not an individual contribution (other id `{0}`)")]
    NotIndividual(String),
    #[error("invalid zip code `{0}`")]
    InvalidZip(String),
    #[error("invalid transaction amount `{0}`")]
    InvalidAmount(String),
    #[error("invalid transaction date `{0}`")]
    InvalidDate(String),
    #[error("invalid percentile `{0}`, expected an integer between 1 and 100")]
    InvalidPercentile(String),
    #[error("percentile {percentile} selects no element of a group with {len} contributions")]
    PercentileOutOfRange { percentile: u32, len: usize },
    #[error("i/o failure: {0}")]
    Io(String),
}

impl Error {
    /// Errors raised for a single bad input line. The run skips the line and carries on.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Error::ParsingFailure(_)
                | Error::MissingField(_)
                | Error::NotIndividual(_)
                | Error::InvalidZip(_)
                | Error::InvalidAmount(_)
                | Error::InvalidDate(_)
        )
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            Error::Io(e.to_string())
        } else {
            Error::ParsingFailure(e.to_string())
        }
    }
}
