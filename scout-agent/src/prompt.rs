//! Prompt assembly for Scout.
//!
//! Builds the system instructions and the user message sent to chat
//! completion backends.

use roster::FreelancerRecord;

/// Assembles Scout prompts.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Scout's persona and answering rules.
    pub fn system_instructions() -> String {
        let mut prompt = String::new();

        prompt.push_str("You are Scout, a friendly and helpful AI Agent for CryptoTasks.\n");
        prompt.push_str("Greet the user if they haven't spoken yet.\n\n");

        prompt.push_str("## SCOUTING\n\n");
        prompt.push_str(
            "1. When the user asks for freelancers, analyze their request and select the top 3 best matching freelancers from the provided list\n",
        );
        prompt.push_str(
            "2. If there is no perfect match, suggest the closest freelancers and explain why you chose them\n",
        );
        prompt.push_str(
            "3. Always include the freelancer names exactly as listed, and explain your reasoning\n",
        );
        prompt.push_str(
            "4. If the request is unclear or no one matches, politely ask for clarification or suggest the closest options\n",
        );

        prompt.push_str("\n## CONVERSATION\n\n");
        prompt.push_str("- Reply in a conversational, helpful way, not just with a list\n");
        prompt.push_str("- If the user says thank you, reply warmly and offer further help\n");
        prompt.push_str("- If the user greets you, greet them back and offer to scout freelancers\n");
        prompt.push_str("- Be concise and polite in all responses\n");

        prompt
    }

    /// User message: the prompt followed by the roster as JSON.
    pub fn user_message(
        prompt: &str,
        roster: &[FreelancerRecord],
    ) -> Result<String, serde_json::Error> {
        let freelancers = serde_json::to_string(roster)?;
        Ok(format!(
            "{}\nFreelancers: {}\nRespond as Scout, the friendly AI agent.",
            prompt.trim(),
            freelancers
        ))
    }
}
