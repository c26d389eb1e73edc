//! Prompt templates for the intake call and the retrieval chain.

/// System prompt for the retrieval-augmented support chat.
pub const SUPPORT_SYSTEM_PROMPT: &str = "\
You are AntarVaani, a compassionate mental-health support companion. \
Listen carefully, respond with warmth, and keep answers grounded in the \
provided reference material. You are not a substitute for professional \
care; encourage reaching out to a therapist when a concern needs one.";

/// Instruction template for the questionnaire submission call.
///
/// Slots: `{responses}` (Q/A block), `{therapists}` (directory block).
pub const INTAKE_PROMPT_TEMPLATE: &str = "\
1. Greet the user.
2. Analyze their questionnaire responses.
3. Recommend the most suitable therapist.
4. Provide contact information.

User Responses:
{responses}

Available Therapists:
{therapists}
";

/// Context-stuffing template for retrieval-augmented answers.
///
/// Slots: `{context}` (retrieved chunks), `{question}` (user utterance).
pub const RETRIEVAL_PROMPT_TEMPLATE: &str = "\
Use the following pieces of context to answer the question at the end.
If the context does not contain the answer, say so honestly and gently
instead of guessing.

Context:
{context}

Question: {question}

Helpful answer:";

pub fn render_intake_prompt(responses: &str, therapists: &str) -> String {
    INTAKE_PROMPT_TEMPLATE
        .replace("{responses}", responses)
        .replace("{therapists}", therapists)
}

pub fn render_retrieval_prompt(context: &str, question: &str) -> String {
    RETRIEVAL_PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}
