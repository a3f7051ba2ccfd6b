use std::sync::Arc;

use crate::error::{GenerationError, Result, ValidationFailure};
use crate::gemini::{ModelBackend, Part};
use crate::prompts::{caption_instructions, IMAGE_PROMPT_INSTRUCTIONS};
use crate::shell::Mode;

/// Builds the image + instruction request for each mode and returns the
/// model's trimmed answer.
#[derive(Clone)]
pub struct Generator {
    backend: Arc<dyn ModelBackend>,
}

impl Generator {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Tag-style training caption starting with `trigger_word`.
    pub async fn generate_caption(
        &self,
        image_base64: &str,
        mime_type: &str,
        trigger_word: &str,
    ) -> Result<String> {
        check_image(image_base64)?;
        let trigger_word = trigger_word.trim();
        if trigger_word.is_empty() {
            return Err(ValidationFailure::MissingTriggerWord.into());
        }

        let parts = vec![
            Part::image(image_base64, mime_type),
            Part::text(caption_instructions(trigger_word)),
        ];
        self.send(Mode::Captioner, parts).await
    }

    /// Descriptive prompt for recreating the image with a generation model.
    pub async fn generate_image_prompt(&self, image_base64: &str, mime_type: &str) -> Result<String> {
        check_image(image_base64)?;

        let parts = vec![
            Part::image(image_base64, mime_type),
            Part::text(IMAGE_PROMPT_INSTRUCTIONS),
        ];
        self.send(Mode::Prompt, parts).await
    }

    pub async fn generate(
        &self,
        mode: Mode,
        image_base64: &str,
        mime_type: &str,
        trigger_word: &str,
    ) -> Result<String> {
        match mode {
            Mode::Captioner => {
                self.generate_caption(image_base64, mime_type, trigger_word)
                    .await
            }
            Mode::Prompt => self.generate_image_prompt(image_base64, mime_type).await,
        }
    }

    async fn send(&self, mode: Mode, parts: Vec<Part>) -> Result<String> {
        match self.backend.generate(parts).await {
            Ok(text) => {
                let text = text.trim().to_string();
                tracing::info!(?mode, "✅ Success! {}", text);
                Ok(text)
            }
            Err(source) => {
                tracing::error!(?mode, error = ?source, "Generation failed");
                Err(GenerationError::Failed { mode, source })
            }
        }
    }
}

fn check_image(image_base64: &str) -> std::result::Result<(), ValidationFailure> {
    if image_base64.trim().is_empty() {
        return Err(ValidationFailure::MissingImage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        reply: std::result::Result<String, String>,
        calls: Mutex<Vec<Vec<Part>>>,
    }

    impl Recorder {
        fn replying(reply: std::result::Result<&str, &str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(String::from).map_err(String::from),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelBackend for Recorder {
        async fn generate(&self, parts: Vec<Part>) -> anyhow::Result<String> {
            self.calls.lock().unwrap().push(parts);
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    #[tokio::test]
    async fn caption_sends_image_then_instructions_and_trims() {
        let backend = Recorder::replying(Ok(
            "  char-groot, a tree-like creature, standing, forest, photorealistic  ",
        ));
        let generator = Generator::new(backend.clone());

        let caption = generator
            .generate_caption("iVBORw0KGgo=", "image/png", "char-groot")
            .await
            .unwrap();
        assert_eq!(
            caption,
            "char-groot, a tree-like creature, standing, forest, photorealistic"
        );

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0], Part::image("iVBORw0KGgo=", "image/png"));
        match &calls[0][1] {
            Part::Text { text } => {
                assert!(text.contains("char-groot"));
                assert!(text.contains("comma-separated"));
            }
            other => panic!("expected text part, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn image_prompt_passes_through_trimmed_text() {
        let backend = Recorder::replying(Ok("a red car, studio lighting, photorealistic"));
        let generator = Generator::new(backend.clone());

        let prompt = generator
            .generate_image_prompt("iVBORw0KGgo=", "image/png")
            .await
            .unwrap();
        assert_eq!(prompt, "a red car, studio lighting, photorealistic");
        assert_eq!(
            backend.calls.lock().unwrap()[0][1],
            Part::text(IMAGE_PROMPT_INSTRUCTIONS)
        );
    }

    #[tokio::test]
    async fn backend_failure_becomes_generic_error() {
        let backend = Recorder::replying(Err("connection reset by peer"));
        let generator = Generator::new(backend);

        for mode in [Mode::Captioner, Mode::Prompt] {
            let err = generator
                .generate(mode, "iVBORw0KGgo=", "image/png", "tok")
                .await
                .unwrap_err();
            assert!(matches!(err, GenerationError::Failed { .. }));
            assert_eq!(err.to_string(), mode.failure_message());
            assert!(!err.to_string().contains("connection reset"));
        }
    }

    #[tokio::test]
    async fn blank_inputs_never_reach_backend() {
        let backend = Recorder::replying(Ok("unused"));
        let generator = Generator::new(backend.clone());

        let err = generator
            .generate_caption("iVBORw0KGgo=", "image/png", "   ")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Validation(ValidationFailure::MissingTriggerWord)
        ));

        let err = generator
            .generate_image_prompt("", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Validation(ValidationFailure::MissingImage)
        ));

        assert!(backend.calls.lock().unwrap().is_empty());
    }
}
