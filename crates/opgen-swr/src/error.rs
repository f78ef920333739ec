use opgen_core::error::ManagerError;
use opgen_typescript::PrintError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwrError {
    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),

    #[error(transparent)]
    Print(#[from] PrintError),

    #[error("invalid generator options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SwrError {
    /// Whether the error aborts the whole run rather than one operation.
    pub fn is_fatal(&self) -> bool {
        match self {
            SwrError::Manager(err) => err.is_fatal(),
            SwrError::Options(_) | SwrError::ThreadPool(_) => true,
            SwrError::Render(_) | SwrError::Print(_) => false,
        }
    }
}
