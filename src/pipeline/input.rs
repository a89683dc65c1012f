use std::path::Path;

/// An uploaded image held in memory until it is stored for OCR.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Lowercased extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Everything a caller can submit in one request.
///
/// Blank text or an image with no bytes counts as absent.
#[derive(Debug, Clone, Default)]
pub struct InputBundle {
    image: Option<ImageUpload>,
    text: Option<String>,
}

impl InputBundle {
    pub fn new(image: Option<ImageUpload>, text: Option<String>) -> Self {
        Self::default().with_image_opt(image).with_text_opt(text)
    }

    pub fn with_image(self, image: ImageUpload) -> Self {
        self.with_image_opt(Some(image))
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_text_opt(Some(text.into()))
    }

    fn with_image_opt(mut self, image: Option<ImageUpload>) -> Self {
        self.image = image.filter(|i| !i.bytes.is_empty());
        self
    }

    fn with_text_opt(mut self, text: Option<String>) -> Self {
        self.text = text.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.text.is_none()
    }
}
