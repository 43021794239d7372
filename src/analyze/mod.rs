// src/analyze/mod.rs
//! Summarization: prompt assembly, the notify gate, and the provider trait.

pub mod cerebras;

use crate::fetch::types::Post;

/// Sentinel the model is instructed to emit when nothing matters; also the
/// local short-circuit answer when there is too little content to analyze.
pub const NO_HIGHLIGHTS: &str = "No major highlights this hour.";

/// Gate matches on the prefix — models occasionally pad the sentinel.
const NO_HIGHLIGHTS_MARKER: &str = "No major highlights";

/// Posts embedded into a single prompt.
pub const PROMPT_POST_CAP: usize = 20;

/// Joined post text below this many characters is not worth an API call.
pub const MIN_ANALYZABLE_CHARS: usize = 100;

/// Summaries at or under this length carry no usable content.
pub const MIN_SUMMARY_CHARS: usize = 50;

#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    /// Digest one batch of posts. `None` means unavailable or failed (no
    /// credential, remote error, malformed payload) — already logged at the
    /// failure site. The sentinel is a *successful* answer and comes back
    /// as `Some`.
    async fn summarize(&self, posts: &[Post]) -> Option<String>;
    fn name(&self) -> &'static str;
}

/// `author: text` blocks, blank-line separated, capped at
/// [`PROMPT_POST_CAP`] posts.
pub fn format_posts(posts: &[Post]) -> String {
    posts
        .iter()
        .take(PROMPT_POST_CAP)
        .map(|p| format!("{}: {}", p.author, p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fixed instructional framing around the joined post block.
pub fn build_prompt(post_block: &str) -> String {
    format!(
        "Analyze these recent crypto/Solana tweets and extract the most important highlights.\n\
         \n\
         Focus on:\n\
         1. New token launches or announcements\n\
         2. Technical updates to protocols (Raydium, Meteora, Pump.fun)\n\
         3. Market-moving news\n\
         4. Notable alpha or trading insights\n\
         5. Partnerships or integrations\n\
         \n\
         Tweets:\n\
         {post_block}\n\
         \n\
         Provide a concise summary (max 5 bullet points) of the most important/actionable information.\n\
         Use emojis for visual appeal. Format for Telegram (markdown).\n\
         If nothing significant, say \"{NO_HIGHLIGHTS}\"\n"
    )
}

/// Whether a summary is worth a notification: non-empty, not the sentinel,
/// and enough substance to read.
pub fn worth_posting(summary: &str) -> bool {
    let s = summary.trim();
    !s.is_empty() && !s.contains(NO_HIGHLIGHTS_MARKER) && s.chars().count() > MIN_SUMMARY_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(author: &str, text: &str) -> Post {
        Post {
            author: author.to_string(),
            text: text.to_string(),
            url: String::new(),
            timestamp: String::new(),
            source_id: None,
        }
    }

    #[test]
    fn prompt_embeds_posts_and_framing() {
        let block = format_posts(&[post("@Raydium", "CLMM fee tiers updated")]);
        let prompt = build_prompt(&block);
        assert!(prompt.contains("@Raydium: CLMM fee tiers updated"));
        assert!(prompt.contains("max 5 bullet points"));
        assert!(prompt.contains(NO_HIGHLIGHTS));
    }

    #[test]
    fn format_posts_caps_the_batch() {
        let posts: Vec<Post> = (0..40)
            .map(|i| post("@a", &format!("post number {i}")))
            .collect();
        let block = format_posts(&posts);
        assert!(block.contains("post number 19"));
        assert!(!block.contains("post number 20"));
    }

    #[test]
    fn gate_rejects_empty_sentinel_and_short() {
        assert!(!worth_posting(""));
        assert!(!worth_posting("   "));
        assert!(!worth_posting(NO_HIGHLIGHTS));
        assert!(!worth_posting("Heads up: No major highlights this hour."));
        assert!(!worth_posting("short"));
    }

    #[test]
    fn gate_accepts_substantive_summaries() {
        let s = "• Raydium shipped CLMM v2 with dynamic fees\n• Jupiter announced a perps integration with Meteora";
        assert!(worth_posting(s));
    }
}
