//! Prompt templates for diabetes probability estimation.
//!
//! Builds the fixed two-turn conversation submitted to the model for each
//! medicine. The wording is stable: downstream parsing depends on the model
//! answering with an `Estimated Probability:` line.

use crate::types::Conversation;

/// System instruction sent with every conversation.
pub const SYSTEM_PROMPT: &str =
    "You are a medical language model designed to estimate the probability that a patient has \
     Type II diabetes based on a specific medicine. Your goal is to provide the probability as a \
     clear float. Please keep your reasoning concise and avoid unnecessary explanations. Always \
     output your final answer as a float number on a new line starting with 'Estimated Probability:'.";

/// Build the conversation for one drug.
///
/// With `reasoning` enabled the user message explicitly invites step-by-step
/// thinking before the final line; otherwise it asks for the answer directly.
/// Both variants mandate the same final-line format. The drug name is
/// interpolated verbatim; any string is accepted, including empty.
pub fn build_conversation(drug: &str, reasoning: bool) -> Conversation {
    let user = if reasoning {
        format!(
            "Given that a patient took {drug}, estimate the probability that they have Type II \
             diabetes. You may think aloud and reason step-by-step. You should provide the final \
             answer on a new line in the format: 'Estimated Probability: X', where X is the \
             probability."
        )
    } else {
        format!(
            "Given that a patient took {drug}, estimate the probability that they have Type II \
             diabetes. You should provide the final answer on a new line in the format: \
             'Estimated Probability: X', where X is the probability."
        )
    };

    Conversation::new(SYSTEM_PROMPT.to_string(), user)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
