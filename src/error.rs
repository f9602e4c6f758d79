/// Process-level error: a message plus the exit code the binary should return.
///
/// Exit codes:
/// - `2` usage, configuration, or local file-store failures
/// - `3` remote source failures surfaced as errors (transport, client setup)
/// - `4` decode/render failures (rasterizing, image decoding, PDF writing)
///
/// Expected fetch outcomes ("not published yet", "too small", "stale") are
/// not errors; see `domain::Miss`.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
