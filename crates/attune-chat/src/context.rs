//! System-instruction aggregation from stored user context.

use attune_core::types::{PersonalInfoItem, UploadedDocument};

/// Baseline persona sentence, always first when any context exists.
const BASE_PERSONA: &str = "You are a helpful AI assistant.";

const PERSONAL_INFO_PREAMBLE: &str = "Here is some personal information about the user you are talking to. Use it to personalize your responses when relevant:";

const DOCUMENTS_PREAMBLE: &str = "Additionally, the user has provided the following documents for context. Use information from them to answer questions when relevant:";

/// Delimiter line closing each document block.
const DOCUMENT_FOOTER: &str = "--------------------------";

/// Builds the completion system instruction from the user's stored context.
pub struct ContextAggregator;

impl ContextAggregator {
    /// Compose the system instruction, or `None` when there is no context.
    ///
    /// When `None`, the completion request carries no system instruction at
    /// all; an empty string is never sent. Output order is fixed: persona,
    /// personal-info block, documents block. No truncation or deduplication
    /// is applied; backend payload limits are the caller's concern.
    pub fn build(
        personal_info: &[PersonalInfoItem],
        documents: &[UploadedDocument],
    ) -> Option<String> {
        if personal_info.is_empty() && documents.is_empty() {
            return None;
        }

        let mut sections = vec![BASE_PERSONA.to_string()];

        if !personal_info.is_empty() {
            let lines: Vec<String> = personal_info
                .iter()
                .map(|item| format!("- {}: {}", item.key, item.value))
                .collect();
            sections.push(format!("{}\n{}", PERSONAL_INFO_PREAMBLE, lines.join("\n")));
        }

        if !documents.is_empty() {
            let blocks: Vec<String> = documents
                .iter()
                .map(|doc| {
                    format!(
                        "--- Document: {} ---\n{}\n{}",
                        doc.name, doc.content, DOCUMENT_FOOTER
                    )
                })
                .collect();
            sections.push(format!("{}\n\n{}", DOCUMENTS_PREAMBLE, blocks.join("\n\n")));
        }

        Some(sections.join("\n\n"))
    }
}

// =============================================================================
// Tests
// =============================================================================
