use crate::classify::{classify, ArtifactKind};
use crate::Artifact;

/// Work derived synchronously from a paste event, before any upload starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PastePlan {
    pub suppress_default: bool,
    pub image: Option<Artifact>,
    pub documents: Vec<Artifact>,
    /// Extensions of file items that were neither images nor documents.
    pub rejected: Vec<Option<String>>,
}

impl PastePlan {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.documents.is_empty() && self.rejected.is_empty()
    }
}

/// Walks the clipboard file items in order.
///
/// The first image ends the walk; documents before it are kept. Plain-text
/// pastes carry no file items and produce an empty plan that leaves the
/// default behaviour alone.
pub fn plan_paste(items: Vec<Artifact>) -> PastePlan {
    let mut plan = PastePlan::default();
    for item in items {
        let kind = classify(&item);
        plan.suppress_default |= kind.intercepts_paste();
        match kind {
            ArtifactKind::Image => {
                plan.image = Some(item);
                break;
            }
            ArtifactKind::Document => plan.documents.push(item),
            ArtifactKind::Rejected { extension } => plan.rejected.push(extension),
            ArtifactKind::Video => plan.rejected.push(item.extension()),
        }
    }
    plan
}
