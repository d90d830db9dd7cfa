use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("credential does not match the vaccination certificate schema: {0}")]
    CredentialSchema(String),
    #[error("no credential found")]
    NotFound,
    #[error("registry error: {0}")]
    Registry(#[from] certlocker_registry::RegistryError),
    #[error("registry did not answer within {0:?}")]
    RegistryTimeout(Duration),
    #[error("render error: {0}")]
    Render(#[from] certlocker_render::RenderError),
    #[error("protocol error: {0}")]
    Protocol(#[from] digilocker::DigilockerError),
    #[error("no content could be produced for certificate {certificate_id}")]
    NoContent { certificate_id: String },
    #[error("background task failed: {0}")]
    Task(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
