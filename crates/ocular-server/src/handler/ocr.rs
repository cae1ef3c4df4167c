//! Image text recognition handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use ocular_core::{LivenessProbe, PromptPreset, RecognitionRequest, Recognizer};

use crate::extract::{Json, OcrInput};
use crate::handler::response::{ImageReport, RecognizedText};
use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceState, SourceOrigin, UploadStore};

/// Tracing target for recognition handlers.
const TRACING_TARGET: &str = "ocular_server::handler::ocr";

/// Recognizes the text of an uploaded or linked image.
///
/// Waits for the model backend, writes the image to a temporary file, runs
/// the recognizer and removes the file again whatever the outcome.
#[tracing::instrument(skip_all, fields(origin = %input.source.origin()))]
async fn recognize(
    State(recognizer): State<Recognizer>,
    State(probe): State<LivenessProbe>,
    State(uploads): State<UploadStore>,
    input: OcrInput,
) -> Result<Json<RecognizedText>> {
    if !probe.wait(recognizer.backend().as_ref()).await {
        tracing::warn!(
            target: TRACING_TARGET,
            attempts = probe.attempts(),
            "Model backend not ready"
        );
        return Err(ErrorKind::BackendNotReady.into_error());
    }

    let image = uploads.materialize(input.source).await?;

    let mut request = RecognitionRequest::new(image.path());
    if let Some(model) = input.model {
        request = request.with_model(model);
    }
    if let Some(prompt) = input.prompt {
        request = request.with_system_prompt(PromptPreset::resolve(&prompt));
    }

    let result = recognizer.recognize(&request).await;
    image.cleanup();

    let text = result?;

    tracing::info!(
        target: TRACING_TARGET,
        model = %request.model(),
        text_len = text.len(),
        "Image recognized"
    );

    Ok(Json(RecognizedText { text }))
}

/// Stores the image and reports its size without contacting the backend.
#[tracing::instrument(skip_all, fields(origin = %input.source.origin()))]
async fn test_image(
    State(uploads): State<UploadStore>,
    input: OcrInput,
) -> Result<Json<ImageReport>> {
    let image = uploads.materialize(input.source).await?;

    let message = match image.origin() {
        SourceOrigin::Url => "Image processed successfully",
        SourceOrigin::Upload => "File uploaded successfully",
    };

    let report = ImageReport {
        success: true,
        message: message.to_string(),
        path: image.path().display().to_string(),
        size: image.size(),
    };
    image.cleanup();

    tracing::debug!(
        target: TRACING_TARGET,
        size = report.size,
        "Image source verified"
    );

    Ok(Json(report))
}

/// Returns a [`Router`] with the recognition routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/ocr", post(recognize))
        .route("/test-image", post(test_image))
}
