use bytes::Bytes;

/// Upload payload: blob bytes plus an optionally declared content type.
///
/// Content is held as [`Bytes`], so handing it to the transport never
/// consumes it: a repeated upload attempt always reads the full content
/// from the start.
#[derive(Debug, Clone)]
pub struct BlobContent {
    bytes: Bytes,
    content_type: Option<String>,
}

impl BlobContent {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Attach an explicitly declared media type. A declared type wins over
    /// extension-based guessing at upload time.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for BlobContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&'static [u8]> for BlobContent {
    fn from(bytes: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(bytes))
    }
}

impl From<Bytes> for BlobContent {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

/// A downloaded blob: the requested name tagged onto the full content.
#[derive(Debug, Clone)]
pub struct Blob {
    pub name: String,
    pub bytes: Bytes,
}

impl Blob {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Directory listing under a queried prefix: subfolder names and blob
/// names, both relative to the query root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

impl Listing {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}
