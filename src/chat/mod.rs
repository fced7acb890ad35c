use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::api::AnalysisService;
use crate::db::models::{Message, Role};
use crate::db::Database;
use crate::report::AnalysisReport;

pub const DEFAULT_TITLE: &str = "New chat";

/// Where assistant replies come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Call the analysis service; fall back to the canned reply on failure.
    Live,
    /// Never call out; always use the canned reply.
    Offline,
}

/// Outcome of one exchange: the stored user message and the assistant reply.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user: Message,
    pub assistant: Message,
    pub fell_back: bool,
}

/// Store the user's message, then store the assistant's reply.
///
/// The reply is the formatted analysis from the service, or a canned message
/// quoting the input when the service cannot be reached. If the user message
/// cannot be stored nothing else happens.
pub fn send_message(
    db: &Database,
    service: &dyn AnalysisService,
    conversation_id: &str,
    input: &str,
    mode: ReplyMode,
) -> Result<Exchange> {
    let text = input.trim();
    if text.is_empty() {
        bail!("Message is empty");
    }

    let user = db
        .insert_message(conversation_id, Role::User, text)
        .context("Failed to send message")?;

    let (reply, fell_back) = match mode {
        ReplyMode::Offline => (fallback_reply(text), true),
        ReplyMode::Live => match service.analyze_text(text) {
            Ok(report) => (format_analysis(&report), false),
            Err(e) => {
                warn!("analysis request failed: {e}");
                (fallback_reply(text), true)
            }
        },
    };

    let assistant = db.insert_message(conversation_id, Role::Assistant, &reply)?;
    Ok(Exchange {
        user,
        assistant,
        fell_back,
    })
}

pub fn fallback_reply(text: &str) -> String {
    format!("⚠️ Analysis service is temporarily unavailable. Your message: \"{text}\"")
}

/// Render an analysis as the templated assistant message.
pub fn format_analysis(report: &AnalysisReport) -> String {
    let stats = &report.statistics;
    let mut out = String::new();
    out.push_str("📊 **Analysis result**\n\n");
    out.push_str(&format!("🔞 **Rating:** {}\n", report.overall_rating));
    out.push_str(&format!("📝 **Summary:** {}\n\n", report.summary));
    out.push_str("📈 **Statistics:**\n");
    out.push_str(&format!("• Total sentences: {}\n", stats.total_sentences));
    out.push_str(&format!("• Problematic: {}\n", stats.problematic_sentences));
    out.push_str(&format!(
        "• Problematic share: {}%\n\n",
        stats.problematic_percentage
    ));
    out.push_str("🚫 **Violations:**\n");
    for (category, count) in stats.violations.iter().filter(|(_, n)| *n > 0) {
        out.push_str(&format!("• {}: {}\n", category.label(), count));
    }
    out.trim().to_string()
}
