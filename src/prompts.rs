//! Instruction text sent alongside the image.

/// Instructions for a fine-tuning caption that opens with `trigger_word`.
pub fn caption_instructions(trigger_word: &str) -> String {
    format!(
        "You are an expert at writing captions for training image generation models (LoRA fine-tuning). \
Write a single caption for this image as a comma-separated list of short, tag-style phrases. \
The caption must begin with the trigger word \"{trigger_word}\" followed by a comma. \
After the trigger word, describe in this order: the main subject, their action or pose, \
their clothing and attire, the setting or background, the framing and composition, \
the lighting, and the overall artistic or photographic style. \
Be objective and specific. Do not use full sentences. \
Respond with the caption only."
    )
}

/// Instructions for a standalone text-to-image prompt describing the image.
pub const IMAGE_PROMPT_INSTRUCTIONS: &str = "You are an expert prompt engineer for text-to-image models. \
Study this image and write one cohesive, detailed prompt that would let an image generation model recreate it. \
Cover the main subject and its appearance, the pose or action, the composition and camera angle, \
the setting and background, the lighting, the color palette, the artistic style or medium, \
camera and lens details where relevant, and the overall mood or atmosphere. \
Your response must contain only the prompt itself. \
Do not add any preamble, explanation, labels, or quotation marks.";
