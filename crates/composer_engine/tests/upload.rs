mod common;

use composer_core::policy::{oversize_message, MAX_UPLOAD_BYTES};
use composer_core::{plan_paste, Artifact, Msg, ParseStatus, Rejection};
use composer_engine::{ApiError, FailureKind, UploadOutcome};
use pretty_assertions::assert_eq;

use common::{fixture, pdf, png, wait_until};

#[tokio::test]
async fn pending_document_is_registered_and_parse_is_triggered() {
    let fx = fixture();

    let outcome = fx.composer.uploads.upload_document(pdf("brief.pdf")).await;

    let UploadOutcome::Document(file) = outcome else {
        panic!("expected a document, got {outcome:?}");
    };
    assert_eq!(file.id, "file-1");
    assert_eq!(file.parse_status, ParseStatus::Parsing);
    assert_eq!(
        fx.api.calls(),
        vec!["upload_reference_file:brief.pdf", "trigger_file_parse:file-1"]
    );
    let registry = fx.composer.session.with(|s| s.registry().clone());
    assert_eq!(registry.len(), 1);
    assert!(fx.sink.messages().contains(&"File uploaded".to_string()));
    assert!(!fx.composer.uploads.is_busy());
}

#[tokio::test]
async fn already_parsed_document_skips_the_parse_trigger() {
    let fx = fixture();
    fx.api.configure(|b| b.upload_status = ParseStatus::Parsed);

    fx.composer.uploads.upload_document(pdf("brief.pdf")).await;

    assert!(fx.api.calls_named("trigger_file_parse").is_empty());
}

#[tokio::test]
async fn failed_parse_trigger_still_marks_the_file_as_parsing() {
    let fx = fixture();
    fx.api.configure(|b| {
        b.parse_result = Err(ApiError::new(FailureKind::Network, "connection reset"));
    });

    let outcome = fx.composer.uploads.upload_document(pdf("brief.pdf")).await;

    assert!(matches!(
        outcome,
        UploadOutcome::Document(ref file) if file.parse_status == ParseStatus::Parsing
    ));
    let view = fx.composer.session.view();
    assert_eq!(view.blocking_files, 1);
}

#[tokio::test]
async fn second_upload_while_busy_is_a_no_op() {
    let fx = fixture();
    let gate = fx.api.hold_transfers();

    let uploads = fx.composer.uploads.clone();
    let first = tokio::spawn(async move { uploads.upload_document(pdf("a.pdf")).await });
    wait_until(|| !fx.api.calls_named("upload_reference_file").is_empty()).await;
    assert!(fx.composer.uploads.is_busy());

    let second = fx.composer.uploads.upload_document(pdf("b.pdf")).await;
    let image = fx.composer.uploads.upload_image(png("pic.png"), 0).await;
    assert_eq!(second, UploadOutcome::Busy);
    assert_eq!(image, UploadOutcome::Busy);

    gate.notify_one();
    let first = first.await.unwrap();
    assert!(matches!(first, UploadOutcome::Document(_)));
    assert_eq!(fx.api.calls_named("upload_reference_file").len(), 1);
    assert!(fx.api.calls_named("upload_material").is_empty());
    assert_eq!(fx.composer.session.with(|s| s.registry().len()), 1);
    assert!(!fx.composer.uploads.is_busy());
}

#[tokio::test]
async fn unsupported_extension_never_reaches_the_server() {
    let fx = fixture();

    let outcome = fx
        .composer
        .uploads
        .upload_document(Artifact::new("setup.exe", "application/octet-stream", vec![0u8; 4]))
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::Rejected(Rejection::UnsupportedExtension {
            extension: Some("exe".to_string())
        })
    );
    assert!(fx.api.calls().is_empty());
    assert_eq!(fx.sink.messages(), vec!["Unsupported file type: exe"]);
}

#[tokio::test]
async fn oversized_document_is_rejected_before_upload() {
    let fx = fixture();
    let mut file = pdf("huge.pdf");
    file.size = MAX_UPLOAD_BYTES + 1;

    let outcome = fx.composer.uploads.upload_document(file).await;

    assert!(matches!(
        outcome,
        UploadOutcome::Rejected(Rejection::TooLarge { .. })
    ));
    assert!(fx.api.calls().is_empty());
}

#[tokio::test]
async fn server_size_refusal_reads_like_the_local_check() {
    let fx = fixture();
    fx.api.configure(|b| {
        b.upload_error = Some(ApiError::new(FailureKind::PayloadTooLarge, ""));
    });
    let file = pdf("brief.pdf");
    let size = file.size;

    let outcome = fx.composer.uploads.upload_document(file).await;

    assert!(matches!(outcome, UploadOutcome::Failed(_)));
    assert!(fx.sink.messages().contains(&oversize_message(size)));
    assert!(fx.composer.session.with(|s| s.registry().is_empty()));
}

#[tokio::test]
async fn other_upload_failures_carry_the_server_message() {
    let fx = fixture();
    fx.api.configure(|b| {
        b.material_error = Some(ApiError::new(FailureKind::HttpStatus(500), "disk full"));
    });

    fx.composer.uploads.upload_image(png("pic.png"), 0).await;

    assert_eq!(
        fx.sink.messages().last().map(String::as_str),
        Some("Image upload failed: disk full")
    );
    assert_eq!(fx.composer.session.with(|s| s.content().to_string()), "");
}

#[tokio::test]
async fn image_lands_at_the_caret_captured_when_the_user_acted() {
    let fx = fixture();
    fx.composer.session.dispatch(Msg::ContentEdited {
        text: "Hello world".to_string(),
        caret: 5,
    });
    let gate = fx.api.hold_transfers();

    let uploads = fx.composer.uploads.clone();
    let task = tokio::spawn(async move { uploads.upload_image(png("pic.png"), 5).await });
    wait_until(|| !fx.api.calls_named("upload_material").is_empty()).await;

    // The user keeps typing while the upload runs.
    fx.composer.session.dispatch(Msg::ContentEdited {
        text: "Hello world, again".to_string(),
        caret: 18,
    });
    gate.notify_one();
    let outcome = task.await.unwrap();

    let markdown = "![image](https://cdn.test/pic.png)";
    assert_eq!(
        outcome,
        UploadOutcome::Image {
            url: "https://cdn.test/pic.png".to_string(),
            caret: 6 + markdown.len(),
        }
    );
    assert_eq!(
        fx.composer.session.with(|s| s.content().to_string()),
        format!("Hello\n{markdown}\n world, again")
    );
    assert_eq!(
        fx.composer.session.view().image_urls,
        vec!["https://cdn.test/pic.png"]
    );
}

#[tokio::test]
async fn documents_upload_one_after_another() {
    let fx = fixture();

    let outcomes = fx
        .composer
        .uploads
        .upload_documents(vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")])
        .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(
        fx.api.calls(),
        vec![
            "upload_reference_file:a.pdf",
            "trigger_file_parse:file-1",
            "upload_reference_file:b.pdf",
            "trigger_file_parse:file-2",
            "upload_reference_file:c.pdf",
            "trigger_file_parse:file-3",
        ]
    );
    assert_eq!(
        fx.composer.session.with(|s| s.registry().ids()),
        vec!["file-1", "file-2", "file-3"]
    );
}

#[tokio::test]
async fn paste_reports_rejects_then_uploads_documents_then_the_image() {
    let fx = fixture();
    let plan = plan_paste(vec![
        pdf("notes.pdf"),
        Artifact::new("blob.xyz", "application/octet-stream", vec![1u8]),
        png("shot.png"),
        pdf("ignored.pdf"),
    ]);
    assert!(plan.suppress_default);

    let outcomes = fx.composer.uploads.run_paste(plan, 0).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        fx.api.calls(),
        vec![
            "upload_reference_file:notes.pdf",
            "trigger_file_parse:file-1",
            "upload_material:shot.png",
        ]
    );
    assert_eq!(fx.sink.messages()[0], "Unsupported file type: xyz");
    assert_eq!(
        fx.composer.session.with(|s| s.content().to_string()),
        "![image](https://cdn.test/shot.png)"
    );
}
