use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, ValidationFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Captioner,
    Prompt,
}

impl Mode {
    /// What the user sees when the model call fails, whatever the cause.
    pub fn failure_message(self) -> &'static str {
        match self {
            Mode::Captioner => "Failed to generate caption. Check the console for details.",
            Mode::Prompt => "Failed to generate prompt. Check the console for details.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Base64 encoded file contents.
    pub data: String,
    pub display_name: String,
    pub mime_type: String,
}

/// Everything a submission needs, captured when it starts.
#[derive(Debug, Clone)]
pub struct Submission {
    pub ticket: u64,
    pub mode: Mode,
    pub image: UploadedImage,
    pub trigger_word: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub display_name: String,
    pub mime_type: String,
}

/// Serializable view of the shell for the browser.
#[derive(Debug, Clone, Serialize)]
pub struct ShellView {
    pub mode: Mode,
    pub image: Option<ImageInfo>,
    pub trigger_word: String,
    pub output: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
}

/// UI state for one user session.
///
/// Every input change and every new submission bumps `generation`; a finished
/// request only lands if its ticket still matches.
#[derive(Debug, Default)]
pub struct Shell {
    mode: Mode,
    image: Option<UploadedImage>,
    trigger_word: String,
    output: Option<String>,
    error: Option<String>,
    loading: bool,
    generation: u64,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reset();
    }

    pub fn upload_image(&mut self, image: UploadedImage) {
        tracing::info!(name = %image.display_name, mime = %image.mime_type, "📸 Image uploaded");
        self.image = Some(image);
        self.reset();
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.reset();
    }

    /// Editing the trigger word invalidates any request still in flight.
    /// Output and error are left alone.
    pub fn set_trigger_word(&mut self, trigger_word: impl Into<String>) {
        let trigger_word = trigger_word.into();
        if trigger_word.trim() != self.trigger_word.trim() {
            self.loading = false;
            self.generation += 1;
        }
        self.trigger_word = trigger_word;
    }

    /// Validates the inputs and moves to the submitting state.
    ///
    /// On failure the inline error is set and nothing else changes.
    pub fn begin_submit(&mut self) -> Result<Submission, ValidationFailure> {
        match self.validate() {
            Ok(image) => {
                let image = image.clone();
                self.output = None;
                self.error = None;
                self.loading = true;
                self.generation += 1;
                Ok(Submission {
                    ticket: self.generation,
                    mode: self.mode,
                    image,
                    trigger_word: self.trigger_word.trim().to_string(),
                })
            }
            Err(failure) => {
                self.error = Some(failure.to_string());
                Err(failure)
            }
        }
    }

    /// Applies a finished request. Returns `false` if the result was stale and dropped.
    pub fn finish_submit(
        &mut self,
        ticket: u64,
        result: Result<String, GenerationError>,
    ) -> bool {
        if ticket != self.generation {
            tracing::warn!(ticket, current = self.generation, "Dropping stale response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(text) => {
                self.output = Some(text);
                self.error = None;
            }
            Err(e) => {
                self.output = None;
                self.error = Some(e.to_string());
            }
        }
        true
    }

    pub fn snapshot(&self) -> ShellView {
        ShellView {
            mode: self.mode,
            image: self.image.as_ref().map(|img| ImageInfo {
                display_name: img.display_name.clone(),
                mime_type: img.mime_type.clone(),
            }),
            trigger_word: self.trigger_word.clone(),
            output: self.output.clone(),
            error: self.error.clone(),
            loading: self.loading,
        }
    }

    fn validate(&self) -> Result<&UploadedImage, ValidationFailure> {
        let image = self
            .image
            .as_ref()
            .filter(|img| !img.data.is_empty())
            .ok_or(ValidationFailure::MissingImage)?;
        if self.mode == Mode::Captioner && self.trigger_word.trim().is_empty() {
            return Err(ValidationFailure::MissingTriggerWord);
        }
        Ok(image)
    }

    fn reset(&mut self) {
        self.output = None;
        self.error = None;
        self.loading = false;
        self.generation += 1;
    }
}
