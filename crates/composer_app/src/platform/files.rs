use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use composer_core::Artifact;

/// Reads a local file as an upload candidate, guessing its MIME type from
/// the extension.
pub(crate) fn load_artifact(path: &Path) -> Result<Artifact> {
    let data = fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(Artifact::new(name, mime_type, data))
}

pub(crate) fn read_brief(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Could not read brief {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn artifact_carries_name_mime_and_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("chart.png");
        fs::write(&path, [1u8, 2, 3, 4]).unwrap();

        let file = load_artifact(&path).unwrap();

        assert_eq!(file.name, "chart.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.size, 4);
        assert!(file.is_image());
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.zzqx");
        fs::write(&path, b"x").unwrap();

        assert_eq!(
            load_artifact(&path).unwrap().mime_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(load_artifact(&temp.path().join("gone.pdf")).is_err());
    }
}
