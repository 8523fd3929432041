use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    Pending,
    Parsing,
    Parsed,
    Failed,
}

impl ParseStatus {
    /// Pending and parsing files hold up submission.
    pub fn is_settled(self) -> bool {
        matches!(self, ParseStatus::Parsed | ParseStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceFile {
    pub id: String,
    #[serde(alias = "filename")]
    pub name: String,
    pub parse_status: ParseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ReferenceFile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parse_status: ParseStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parse_status,
            error_message: None,
        }
    }
}

/// Ordered reference files of the current composition, keyed by id.
///
/// Removing an entry only drops the local reference; the stored file is
/// untouched. Updates for ids that are no longer present are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceRegistry {
    files: Vec<ReferenceFile>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[ReferenceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.files.iter().map(|f| f.id.clone()).collect()
    }

    pub fn push(&mut self, file: ReferenceFile) {
        self.files.push(file);
    }

    /// Replaces the record with the same id. Returns false if it vanished.
    pub fn replace(&mut self, file: ReferenceFile) -> bool {
        match self.files.iter_mut().find(|f| f.id == file.id) {
            Some(slot) => {
                *slot = file;
                true
            }
            None => false,
        }
    }

    pub fn set_status(&mut self, id: &str, status: ParseStatus) -> bool {
        match self.files.iter_mut().find(|f| f.id == id) {
            Some(slot) => {
                slot.parse_status = status;
                true
            }
            None => false,
        }
    }

    /// Merges files picked from the library: known ids take the fresh
    /// record, unknown ids are appended in selection order.
    pub fn merge(&mut self, selected: Vec<ReferenceFile>) {
        for file in selected {
            if !self.replace(file.clone()) {
                self.files.push(file);
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<ReferenceFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(index))
    }

    /// Files still pending or parsing.
    pub fn blocking_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !f.parse_status.is_settled())
            .count()
    }

    pub fn unsettled_ids(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| !f.parse_status.is_settled())
            .map(|f| f.id.clone())
            .collect()
    }
}
