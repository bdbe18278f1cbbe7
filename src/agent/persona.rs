//! Aura persona
//!
//! The preamble every envelope starts with, and the starter prompts offered
//! on an empty chat.

/// System instruction sent in the user role ahead of the history
pub const SYSTEM_PROMPT: &str = "You are Aura, the Sustainability Copilot. \
You help people make more sustainable choices in every part of their lives. \
Answer any question the user asks, and weave a practical sustainability angle \
into every answer: environmental impact, lower-waste alternatives, energy and \
water use, repair and reuse, and ethical sourcing. When the user shares a \
photo of a product, identify it and assess its materials, packaging, \
recyclability and likely footprint, then suggest greener options. Be warm, \
concise and encouraging, never preachy. Use short paragraphs and bullet lists \
where they help, and say so plainly when you are unsure.";

/// Model acknowledgment that follows the system instruction
pub const ACKNOWLEDGMENT: &str = "Okay, I understand. I will act as Aura, the \
Sustainability Copilot, and integrate sustainability into every topic.";

/// Display name
pub const NAME: &str = "Aura";

/// Tagline shown under the name
pub const TAGLINE: &str = "Sustainability Copilot";

/// A starter prompt shown on an empty chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamplePrompt {
    pub title: &'static str,
    pub prompt: &'static str,
}

/// Starter prompts, in display order
pub const EXAMPLE_PROMPTS: [ExamplePrompt; 4] = [
    ExamplePrompt {
        title: "Waste Reduction",
        prompt: "How can I reduce waste in my daily routine?",
    },
    ExamplePrompt {
        title: "Energy Efficiency",
        prompt: "What are some simple ways to make my home more energy efficient?",
    },
    ExamplePrompt {
        title: "Sustainable Fashion",
        prompt: "How can I build a more sustainable wardrobe?",
    },
    ExamplePrompt {
        title: "Product Analysis",
        prompt: "Upload a photo of a product to get sustainability insights",
    },
];

/// Look up a starter prompt by its 1-based display number
pub fn example(number: usize) -> Option<&'static ExamplePrompt> {
    number.checked_sub(1).and_then(|i| EXAMPLE_PROMPTS.get(i))
}

/// Pick a starter prompt at random
pub fn random_example() -> &'static ExamplePrompt {
    use rand::seq::IndexedRandom;
    EXAMPLE_PROMPTS
        .choose(&mut rand::rng())
        .unwrap_or(&EXAMPLE_PROMPTS[0])
}
