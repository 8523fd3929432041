use bytes::Bytes;

/// A user-supplied blob: a pasted clipboard item or a picked file.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub data: Bytes,
}

impl Artifact {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: data.len() as u64,
            data,
        }
    }

    /// Lowercased text after the last `.` of the name. A name without a dot
    /// is its own extension, so rejections can still name the file.
    pub fn extension(&self) -> Option<String> {
        let ext = match self.name.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => self.name.as_str(),
        };
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

// Payloads can be hundreds of megabytes; keep them out of debug output.
impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
