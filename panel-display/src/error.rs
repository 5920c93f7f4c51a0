/// Error from setting up or feeding the display link.
#[derive(Debug)]
pub enum DisplayError {
    Io(std::io::Error),
    Encode(rosc::OscError),
}

impl From<std::io::Error> for DisplayError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<rosc::OscError> for DisplayError {
    fn from(e: rosc::OscError) -> Self {
        Self::Encode(e)
    }
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Encode(e) => write!(f, "OSC encode error: {}", e),
        }
    }
}

impl std::error::Error for DisplayError {}
