//! LLM style enhancement and metadata extraction.
//!
//! The model rewrites a literal translation into a target register and emits
//! alternatives, grammar commentary, a rationale, and a phonetic
//! transcription. The reply is plain prose with `Label:` line prefixes; a
//! small line-oriented grammar extracts it into a structured record. This
//! whole step is best-effort: LLM failures and unparseable output degrade to
//! "no enhancement", never to an error the caller sees.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{prompt_language_name, Lang, ProviderConfig, Style};
use crate::llm::LlmClient;
use crate::util::log_snippet;

/// Upper bound on extracted alternatives; the prompt asks for 2-3.
const MAX_ALTERNATIVES: usize = 3;

/// Structured output of one enhancement call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementResult {
    /// Style-adapted rewrite; falls back to the literal translation.
    pub enhanced_translation: String,
    /// Alternative phrasings, at most three.
    pub alternatives: Vec<String>,
    /// Word-choice and cultural notes.
    pub explanation: String,
    /// Grammar commentary for language learners.
    pub grammar: String,
    /// Phonetic transcription of the *literal* translation. The enhanced
    /// text's pronunciation is not what a learner needs; the literal form is
    /// canonical.
    pub transcription: String,
}

impl EnhancementResult {
    /// The "no enhancement" result: literal translation, everything else empty.
    pub fn degraded(basic_translation: &str) -> Self {
        Self {
            enhanced_translation: basic_translation.to_string(),
            alternatives: Vec::new(),
            explanation: String::new(),
            grammar: String::new(),
            transcription: String::new(),
        }
    }
}

/// Metadata fields a label line can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Enhanced,
    Alternatives,
    Explanation,
    Grammar,
    Transcription,
}

/// Label table for the line grammar. Matched case-insensitively against
/// `label:` prefixes; adding a metadata kind is a table edit.
const LABELS: &[(&str, Field)] = &[
    ("enhanced", Field::Enhanced),
    ("alternatives", Field::Alternatives),
    ("alternative", Field::Alternatives),
    ("explanation", Field::Explanation),
    ("grammar", Field::Grammar),
    ("transcription", Field::Transcription),
];

/// Invokes the LLM and extracts the structured record from its reply.
pub struct Enhancer {
    llm: Arc<dyn LlmClient>,
}

impl Enhancer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Enhance a literal translation. Never fails: if the LLM key is missing,
    /// the call errors, or the output is unusable, the literal translation is
    /// returned with empty metadata.
    pub async fn enhance(
        &self,
        original_text: &str,
        basic_translation: &str,
        target_lang: &Lang,
        style: Style,
        explain_grammar: bool,
        config: &ProviderConfig,
    ) -> EnhancementResult {
        let Some(api_key) = config.llm_api_key.as_deref() else {
            debug!("Enhancement skipped: no LLM API key configured");
            return EnhancementResult::degraded(basic_translation);
        };

        let system_prompt = build_system_prompt(style);
        let user_prompt = if explain_grammar {
            build_grammar_prompt(original_text, basic_translation, target_lang, style)
        } else {
            build_simple_prompt(original_text, basic_translation, target_lang, style)
        };

        let content = match self.llm.complete(api_key, &system_prompt, &user_prompt).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Enhancement failed: {}, falling back to literal translation", e);
                return EnhancementResult::degraded(basic_translation);
            }
        };

        debug!("Enhancement reply: {}", log_snippet(&content, 80));

        if explain_grammar {
            parse_response(&content, basic_translation)
        } else {
            // Simple mode asks for the rewritten text only, no labels
            let enhanced = content
                .trim()
                .trim_start_matches('"')
                .trim_end_matches('"')
                .trim();
            if enhanced.is_empty() {
                EnhancementResult::degraded(basic_translation)
            } else {
                EnhancementResult {
                    enhanced_translation: enhanced.to_string(),
                    ..EnhancementResult::degraded(basic_translation)
                }
            }
        }
    }
}

fn build_system_prompt(style: Style) -> String {
    format!(
        "You are a professional translator and language expert specializing in \
         accurate, contextual translation enhancement.\n\n\
         CRITICAL RULES:\n\
         1. PRESERVE the original meaning and accuracy of the basic translation\n\
         2. DO NOT change the core message or interpretation\n\
         3. Focus on style adaptation and providing synonyms, NOT reinterpretation\n\
         4. Target style: {}",
        style.prompt_description()
    )
}

/// Grammar mode: labeled reply with the full metadata set. The transcription
/// is requested for the basic translation, not the enhanced output.
fn build_grammar_prompt(
    original_text: &str,
    basic_translation: &str,
    target_lang: &Lang,
    style: Style,
) -> String {
    format!(
        "Original text: {original_text}\n\
         Basic translation ({target}): {basic_translation}\n\n\
         Rewrite the basic translation so it fits a {style} register while \
         preserving its meaning exactly. Reply using exactly these labeled lines:\n\n\
         Enhanced: <the stylistically adapted translation>\n\
         Alternatives:\n\
         - <up to 3 alternative phrasings with the same meaning>\n\
         Explanation: <brief note on word choices and cultural context>\n\
         Grammar: <grammar explanation for language learners>\n\
         Transcription: <phonetic transcription of the basic translation \
         \"{basic_translation}\", NOT of the enhanced version>",
        target = prompt_language_name(target_lang),
        style = style.prompt_description(),
    )
}

/// Simple mode: enhanced translation only, to bound token cost for
/// lower-tier callers.
fn build_simple_prompt(
    original_text: &str,
    basic_translation: &str,
    target_lang: &Lang,
    style: Style,
) -> String {
    format!(
        "Original text: {original_text}\n\
         Basic translation ({target}): {basic_translation}\n\n\
         Rewrite the basic translation so it fits a {style} register while \
         preserving its meaning exactly. Reply with the rewritten translation \
         only, no labels, no alternatives, no commentary.",
        target = prompt_language_name(target_lang),
        style = style.prompt_description(),
    )
}

/// Extract the structured record from a labeled reply.
///
/// Line grammar: a line opening with a known label (case-insensitive,
/// markdown decoration tolerated) assigns the remainder to that field and
/// makes it current; later unlabeled lines continue the current field.
/// Unlabeled *leading* lines are kept as the enhanced translation, but only
/// when at least one label appears somewhere in the reply; a reply with no
/// labels at all is malformed and degrades to the literal translation.
fn parse_response(content: &str, basic_translation: &str) -> EnhancementResult {
    let mut enhanced: Option<String> = None;
    let mut leading = String::new();
    let mut alternatives = Vec::new();
    let mut explanation = String::new();
    let mut grammar = String::new();
    let mut transcription = String::new();

    let mut current: Option<Field> = None;
    let mut any_label_matched = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((field, rest)) = match_label(trimmed) {
            any_label_matched = true;
            current = Some(field);
            let rest = rest.trim();
            if rest.is_empty() {
                continue;
            }
            match field {
                Field::Enhanced => append_sentence(enhanced.get_or_insert_with(String::new), rest),
                Field::Alternatives => push_alternative(&mut alternatives, rest),
                Field::Explanation => append_sentence(&mut explanation, rest),
                Field::Grammar => append_sentence(&mut grammar, rest),
                Field::Transcription => append_sentence(&mut transcription, rest),
            }
            continue;
        }

        match current {
            None => append_sentence(&mut leading, strip_decoration(trimmed)),
            Some(Field::Enhanced) => {
                append_sentence(enhanced.get_or_insert_with(String::new), trimmed);
            }
            Some(Field::Alternatives) => push_alternative(&mut alternatives, trimmed),
            Some(Field::Explanation) => append_sentence(&mut explanation, trimmed),
            Some(Field::Grammar) => append_sentence(&mut grammar, trimmed),
            Some(Field::Transcription) => append_sentence(&mut transcription, trimmed),
        }
    }

    if !any_label_matched {
        return EnhancementResult::degraded(basic_translation);
    }

    // Defensive fallback for models that omit the Enhanced label but still
    // answer in labeled format: leading prose is the enhanced translation.
    let enhanced_translation = enhanced
        .filter(|text| !text.is_empty())
        .or_else(|| (!leading.is_empty()).then_some(leading))
        .unwrap_or_else(|| basic_translation.to_string());

    EnhancementResult {
        enhanced_translation,
        alternatives,
        explanation,
        grammar,
        transcription,
    }
}

/// Match a known `label:` prefix, case-insensitively. Returns the field and
/// the remainder of the line after the colon.
fn match_label(line: &str) -> Option<(Field, &str)> {
    let stripped = strip_decoration(line);

    for (label, field) in LABELS {
        if stripped.len() < label.len() || !stripped.is_char_boundary(label.len()) {
            continue;
        }
        let (head, tail) = stripped.split_at(label.len());
        if !head.eq_ignore_ascii_case(label) {
            continue;
        }
        // The label must be followed by a colon, allowing closing markdown
        // bold in between ("**Grammar:**" and "**Grammar**:" both match)
        let tail = tail.trim_start_matches(['*', '`']);
        if let Some(rest) = tail.strip_prefix(':') {
            return Some((*field, rest.trim_start_matches(['*', '`'])));
        }
    }
    None
}

/// Strip markdown decoration and bullet markers from the start of a line.
fn strip_decoration(line: &str) -> &str {
    line.trim_start_matches(['*', '#', '`', '-', '•', '>'])
        .trim_start()
}

fn append_sentence(buffer: &mut String, text: &str) {
    if buffer.is_empty() {
        buffer.push_str(text);
    } else {
        buffer.push(' ');
        buffer.push_str(text);
    }
}

/// Add one alternative, stripping bullet/number prefixes. Entries past the
/// cap are dropped silently.
fn push_alternative(alternatives: &mut Vec<String>, line: &str) {
    if alternatives.len() >= MAX_ALTERNATIVES {
        return;
    }

    let entry = strip_number_prefix(strip_decoration(line));
    if !entry.is_empty() {
        alternatives.push(entry.to_string());
    }
}

/// Strip numbered-list prefixes like "1. option" or "2) option".
fn strip_number_prefix(entry: &str) -> &str {
    let digits_end = entry
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(entry.len());
    if digits_end > 0 {
        if let Some(rest) = entry[digits_end..].strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    entry
}
