use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Source URL is required")]
    EmptyUrl,

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
