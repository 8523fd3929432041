use composer_logging::{composer_debug, composer_info};

use crate::{ComposerSession, Effect, Msg, Notice};

/// Pure update function: applies a message to the session and returns any effects.
pub fn update(mut state: ComposerSession, msg: Msg) -> (ComposerSession, Vec<Effect>) {
    let effects = match msg {
        Msg::ContentEdited { text, caret } => {
            state.edit_content(text, caret);
            Vec::new()
        }
        Msg::CaretMoved(caret) => {
            state.move_caret(caret);
            Vec::new()
        }
        Msg::ModeSelected(mode) => {
            state.switch_mode(mode);
            Vec::new()
        }
        Msg::FileStatusChanged(file) => {
            let file_id = file.id.clone();
            if !state.update_reference_file(file) {
                composer_debug!("Ignoring status update for removed file {}", file_id);
            }
            Vec::new()
        }
        Msg::FilesSelected(selected) => {
            if selected.is_empty() {
                return (state, Vec::new());
            }
            let count = selected.len();
            state.merge_reference_files(selected);
            vec![Effect::Notify(Notice::success(format!(
                "Added {count} reference file(s)"
            )))]
        }
        Msg::FileRemoved { file_id } => {
            state.remove_reference_file(&file_id);
            Vec::new()
        }
        Msg::ImageRemoved { url } => {
            state.remove_image(&url);
            vec![Effect::Notify(Notice::success("Image removed"))]
        }
        Msg::AdHocTemplateChosen(file) => {
            state.template_mut().select_ad_hoc_file(file);
            Vec::new()
        }
        Msg::TemplateChosen { template, file } => {
            state.template_mut().select(template, file);
            Vec::new()
        }
        Msg::TemplateIdChosen { id, file } => {
            state.template_mut().select_by_id(&id, file);
            Vec::new()
        }
        Msg::UserTemplateUploaded(template) => {
            composer_info!("User template {} uploaded", template.template_id);
            state.add_user_template(template);
            vec![Effect::Notify(Notice::success("Template uploaded"))]
        }
        Msg::UserTemplatesLoaded(templates) => {
            state.set_user_templates(templates);
            Vec::new()
        }
        Msg::DescriptiveStyleToggled(on) => {
            state.template_mut().toggle_descriptive_style(on);
            Vec::new()
        }
        Msg::StyleDescriptionChanged(text) => {
            state.template_mut().set_style_description(text);
            Vec::new()
        }
        Msg::VideoSelected(file) => match state.select_video(file) {
            Ok(()) => Vec::new(),
            Err(rejection) => vec![Effect::Notify(Notice::error(rejection.to_string()))],
        },
        Msg::VideoRemoved => {
            state.remove_video();
            Vec::new()
        }
    };

    (state, effects)
}
