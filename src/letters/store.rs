use std::io::ErrorKind;
use std::path::PathBuf;

use uuid::Uuid;

use super::LetterError;

/// The cover-letter template kept as a raw file on disk.
pub struct TemplateFileStore {
    path: PathBuf,
}

impl TemplateFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn read(&self) -> Result<String, LetterError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(LetterError::TemplateMissing(
                self.path.display().to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the template wholesale. Literal `\n` sequences left over from
    /// JSON-encoded uploads are dropped. Each write stages its own temp file,
    /// so overlapping writers never share one and the last rename wins.
    pub async fn write(&self, text: &str) -> Result<(), LetterError> {
        let cleaned = text.replace("\\n", "");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(format!(".{}.tmp", Uuid::now_v7().simple()));
        let tmp = PathBuf::from(tmp);

        let staged = match tokio::fs::write(&tmp, cleaned.as_bytes()).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = staged {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::info!("Cover letter template updated at {}", self.path.display());
        Ok(())
    }
}
