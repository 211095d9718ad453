//! Prompts sent to the narrative provider.

use crate::conversation::Message;

/// The user context of the keyword request for the opening beat.
pub(crate) const OPENING_CONTEXT: &str = "Intro";

const STYLE: &str = "Remember to keep it really short and simple as it's \
    for kids, and end the beginning with both some possible things to do \
    next using the format 'A:' and letters like that and ultimately leave \
    with an open ended question.";

/// Asks for the opening beat of a story about `theme`.
pub(crate) fn opening(theme: &str) -> String {
    format!(
        "Start an interactive story beginning based on the following theme. \
         Make the background information really short and simple as it's \
         for kids, and end the beginning with both some possible things to \
         do next using the format 'A:' and letters like that and ultimately \
         leave with an open ended question. Remember to keep it short, \
         sweet, and simple (Less than 20 words). Leave the story open \
         ended. Theme:\n{theme}\n\nAI:"
    )
}

/// Asks for the next beat, given the whole transcript so far.
pub(crate) fn continuation(messages: &[Message]) -> String {
    let mut prompt = format!("Continue the interactive story. {STYLE} ");
    for (idx, msg) in messages.iter().enumerate() {
        if idx > 0 {
            prompt.push('\n');
        }
        prompt.push_str(msg.sender().prompt_prefix());
        prompt.push_str(msg.content());
    }
    prompt.push_str("\nAI:");
    prompt
}

/// Asks for three search keywords describing one exchange.
pub(crate) fn keywords(user_input: &str, assistant_output: &str) -> String {
    format!(
        "Based on this children's story exchange, extract 3 short and \
         relevant keywords for an image that would best illustrate it.\n\
         \n\
         User: {user_input}\n\
         AI: {assistant_output}\n\
         \n\
         Only respond with the 3 keywords, space-separated. Example: \
         \"dragon cave treasure\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Sender, Transcript};

    #[test]
    fn test_opening() {
        let prompt = opening("A lost kitten");
        assert!(prompt.starts_with("Start an interactive story"));
        assert!(prompt.contains("(Less than 20 words)"));
        assert!(prompt.ends_with("Theme:\nA lost kitten\n\nAI:"));
    }

    #[test]
    fn test_continuation() {
        let mut transcript = Transcript::default();
        transcript.push(Sender::Assistant, "Beginning. A: left".to_owned());
        transcript.push(Sender::User, "A".to_owned());
        let prompt = continuation(transcript.messages());
        assert!(prompt.starts_with("Continue the interactive story. "));
        assert!(prompt.ends_with(
            "open ended question. AI: Beginning. A: left\nUser: A\nAI:"
        ));
    }

    #[test]
    fn test_keywords() {
        let prompt = keywords(OPENING_CONTEXT, "A fox hops.");
        assert!(prompt.contains("\n\nUser: Intro\nAI: A fox hops.\n\n"));
        assert!(prompt.ends_with("Example: \"dragon cave treasure\""));
    }
}
