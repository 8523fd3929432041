use crate::{Artifact, CreationMode, ReferenceFile, TemplateRef, UserTemplate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User typed in the content box.
    ContentEdited { text: String, caret: usize },
    /// Caret moved without an edit.
    CaretMoved(usize),
    /// User switched the creation tab.
    ModeSelected(CreationMode),
    /// Out-of-band parse status update for a reference file.
    FileStatusChanged(ReferenceFile),
    /// Files picked from the reference-file library.
    FilesSelected(Vec<ReferenceFile>),
    /// User removed a reference file from this composition.
    FileRemoved { file_id: String },
    /// User removed an inline image from the preview list.
    ImageRemoved { url: String },
    /// A template image supplied directly, without an id.
    AdHocTemplateChosen(Artifact),
    /// Gallery selection with a known namespace.
    TemplateChosen {
        template: TemplateRef,
        file: Option<Artifact>,
    },
    /// Gallery selection carrying only a raw id.
    TemplateIdChosen { id: String, file: Option<Artifact> },
    /// A template was uploaded to the user's library.
    UserTemplateUploaded(UserTemplate),
    /// Known user templates, used to look up template files by id.
    UserTemplatesLoaded(Vec<UserTemplate>),
    DescriptiveStyleToggled(bool),
    StyleDescriptionChanged(String),
    /// User picked a video in video mode.
    VideoSelected(Artifact),
    VideoRemoved,
}
