use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File I/O Error: {0}")]
    Io(String),

    #[error("Capture Device Error: {0}")]
    Device(String),

    #[error("Frame Capture Error: {0}")]
    Capture(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("Rename conflict: cannot rename '{source_name}' to '{target_name}', target already exists")]
    RenameConflict { source_name: String, target_name: String },

    #[error("Remote execution failed on host {host}: {status}")]
    Remote { host: String, status: String },

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

// Allow conversion from std::io::Error to AppError::Io
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}
