use nom::Needed;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("A parsing failure occurred: \n{}\ndata: {:?}", .0, .1)]
    Failure(String, Vec<u8>),
    #[error("There wasn't enough data. {}", .0)]
    Incomplete(String),

    /// The captured frame exists but is not a beacon. The raw frame-control
    /// field is passed along for debugging.
    #[error("Not a beacon frame, frame control: {:#06x}", .0)]
    NotABeacon(u16),
    /// A capture container or link layer this crate does not handle.
    #[error("Cannot handle this capture format: {}", .0)]
    UnsupportedCapture(String),
    #[error("FCS mismatch: computed {:#010x}, frame carries {:#010x}", .0, .1)]
    FcsMismatch(u32, u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    /// Manually specify the conversion from a [nom::error::Error] to our own error.
    /// We need this conversion, since we work with slices.
    /// If nom's error is propagated through the program, we get lifetime issues as we can't hold
    /// ownership of that slice and thereby require a 'static.
    fn from(error: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match error {
            nom::Err::Incomplete(needed) => match needed {
                Needed::Size(size) => {
                    Error::Incomplete(format!("At least {size} bytes are missing"))
                }
                Needed::Unknown => Error::Incomplete(String::new()),
            },
            nom::Err::Failure(error) => Error::Failure(
                format!(
                    "An error occured while parsing the data: nom::ErrorKind is {:?}",
                    error.code
                ),
                error.input.to_vec(),
            ),
            nom::Err::Error(error) => Error::Failure(
                format!(
                    "An error occured while parsing the data: nom::ErrorKind is {:?}",
                    error.code
                ),
                error.input.to_vec(),
            ),
        }
    }
}
