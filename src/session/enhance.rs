//! Enhancement request submission

use thiserror::Error;

use crate::api::{ApiError, EnhancerApi, UploadFile};
use crate::session::staging::StagedFile;

#[derive(Debug, Error)]
pub enum EnhancementError {
    #[error("Please select at least one image to enhance")]
    NothingStaged,
    #[error("Models are not ready yet")]
    NotReady,
    #[error("An enhancement is already running")]
    InProgress,
    #[error("Could not read {name}: {source}")]
    ReadFile {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Read staged files into multipart uploads, in staging order
pub async fn read_uploads(files: &[StagedFile]) -> Result<Vec<UploadFile>, EnhancementError> {
    let mut uploads = Vec::with_capacity(files.len());
    for file in files {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|source| EnhancementError::ReadFile {
                name: file.name.clone(),
                source,
            })?;
        uploads.push(UploadFile::new(file.name.clone(), bytes));
    }
    Ok(uploads)
}

/// Send every staged file in one request and return the output names
pub async fn submit(
    api: &dyn EnhancerApi,
    files: &[StagedFile],
) -> Result<Vec<String>, EnhancementError> {
    if files.is_empty() {
        return Err(EnhancementError::NothingStaged);
    }

    let uploads = read_uploads(files).await?;
    let total: usize = uploads.iter().map(|u| u.bytes.len()).sum();
    tracing::info!("Submitting {} image(s) ({} bytes) for enhancement", uploads.len(), total);

    let names = api.enhance(uploads).await?;
    tracing::info!("Server returned {} enhanced image(s)", names.len());
    Ok(names)
}
