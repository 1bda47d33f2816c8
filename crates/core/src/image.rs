//! Inline image encoding.
//!
//! Uploaded images are not kept in a blob store; they are written into the
//! document itself as a `data:` URI.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("uploaded file {0:?} is empty")]
    Empty(String),
    #[error("uploaded file {file:?} is not an image ({mime})")]
    NotAnImage { file: String, mime: String },
    #[error("image encoding task failed: {0}")]
    Task(String),
    #[error("not an inline base64 image")]
    NotInline,
    #[error("inline image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A file chosen in an edit form, held until the session is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    /// Declared content type; guessed from the file name when absent.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.filter(|c| !c.trim().is_empty()),
            bytes,
        }
    }

    pub fn mime(&self) -> String {
        match &self.content_type {
            Some(declared) => declared
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase(),
            None => mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }

    fn check(&self) -> Result<String, ImageError> {
        if self.bytes.is_empty() {
            return Err(ImageError::Empty(self.file_name.clone()));
        }
        let mime = self.mime();
        if !mime.starts_with("image/") {
            return Err(ImageError::NotAnImage {
                file: self.file_name.clone(),
                mime,
            });
        }
        Ok(mime)
    }
}

/// Encode an upload as a `data:<mime>;base64,<payload>` string.
pub fn encode_data_uri(upload: &ImageUpload) -> Result<String, ImageError> {
    let mime = upload.check()?;
    Ok(format!(
        "{DATA_PREFIX}{mime}{BASE64_MARKER}{}",
        STANDARD.encode(&upload.bytes)
    ))
}

/// Encode an upload on the blocking pool.
pub async fn encode_inline(upload: ImageUpload) -> Result<String, ImageError> {
    tokio::task::spawn_blocking(move || encode_data_uri(&upload))
        .await
        .map_err(|e| ImageError::Task(e.to_string()))?
}

/// Decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    pub fn is_inline(src: &str) -> bool {
        src.starts_with(DATA_PREFIX) && src.contains(BASE64_MARKER)
    }

    pub fn parse(src: &str) -> Result<Self, ImageError> {
        let rest = src.strip_prefix(DATA_PREFIX).ok_or(ImageError::NotInline)?;
        let (mime, payload) = rest.split_once(BASE64_MARKER).ok_or(ImageError::NotInline)?;
        Ok(Self {
            mime: mime.to_string(),
            bytes: STANDARD.decode(payload)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[tokio::test]
    async fn encodes_declared_type_and_decodes_back() {
        let upload = ImageUpload::new("rex.bin", Some("image/png".into()), PNG_MAGIC.to_vec());
        let src = encode_inline(upload).await.unwrap();
        assert!(src.starts_with("data:image/png;base64,"));

        let decoded = InlineImage::parse(&src).unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.bytes, PNG_MAGIC);
    }

    #[test]
    fn guesses_type_from_file_name() {
        let upload = ImageUpload::new("poster.JPG", None, vec![1, 2, 3]);
        assert_eq!(upload.mime(), "image/jpeg");
        assert!(encode_data_uri(&upload).unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn rejects_empty_and_non_image_files() {
        let empty = ImageUpload::new("a.png", None, Vec::new());
        assert!(matches!(encode_data_uri(&empty), Err(ImageError::Empty(_))));

        let text = ImageUpload::new("notes.txt", None, b"hello".to_vec());
        assert!(matches!(
            encode_data_uri(&text),
            Err(ImageError::NotAnImage { .. })
        ));
    }

    #[test]
    fn urls_are_not_inline() {
        assert!(!InlineImage::is_inline("https://example.org/a.png"));
        assert!(matches!(
            InlineImage::parse("https://example.org/a.png"),
            Err(ImageError::NotInline)
        ));
    }
}
