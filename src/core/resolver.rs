//! Entity reference resolution: turns narrative text into literal and
//! entity-reference segments.
//!
//! Two passes, never combined:
//!
//! - **Explicit tags.** `[[entity:id]]` or `[[entity:id|Alias]]`. If the text
//!   holds at least one well-formed tag, tags are authoritative for the whole
//!   text and nothing else is matched.
//! - **Name matching.** Otherwise every roster entity contributes name tokens
//!   (full name, first name, last name, each spelled composed, decomposed
//!   and accent-stripped) and a single longest-first, case-insensitive, whole-word scan
//!   tags the mentions.
//!
//! Resolution is pure: the same text and roster always give the same
//! segments.

use regex::{Regex, RegexBuilder};
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::Range;

use crate::core::config::ResolverConfig;
use crate::core::normalize::{fold_key, is_word_char, strip_accents, to_nfc, to_nfd};
use crate::schema::entity::{EntityId, Roster};
use crate::schema::segment::TextSegment;

const TAG_OPEN: &str = "[[";
const TAG_CLOSE: &str = "]]";
const ALIAS_SEPARATOR: char = '|';

/// A well-formed explicit tag found in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitTag {
    pub span: Range<usize>,
    pub entity_id: EntityId,
    pub alias: Option<String>,
}

/// Resolves entity mentions against a roster.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    config: ResolverConfig,
}

impl EntityResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Split `text` into literal and entity-reference segments.
    pub fn resolve(&self, text: &str, roster: &Roster) -> Vec<TextSegment> {
        if text.is_empty() {
            return Vec::new();
        }

        let tags = self.scan_tags(text);
        if !tags.is_empty() {
            tracing::debug!(tags = tags.len(), "resolving explicit entity tags");
            return resolve_tagged(text, &tags, roster);
        }

        self.matcher(roster).resolve(text)
    }

    /// Prebuild the name matcher for a roster, for resolving many texts
    /// against the same scene.
    pub fn matcher(&self, roster: &Roster) -> RosterMatcher {
        RosterMatcher::build(roster, &self.config)
    }

    /// Find every well-formed tag, left to right.
    ///
    /// An opening marker without a closing `]]`, or with an empty id, is
    /// not a tag and stays literal text.
    pub fn scan_tags(&self, text: &str) -> Vec<ExplicitTag> {
        let open = format!("{}{}", TAG_OPEN, self.config.tag_prefix);
        let mut tags = Vec::new();
        let mut cursor = 0;

        while let Some(found) = text[cursor..].find(&open) {
            let start = cursor + found;
            let body_start = start + open.len();
            let Some(close) = text[body_start..].find(TAG_CLOSE) else {
                break;
            };
            let body_end = body_start + close;
            let body = &text[body_start..body_end];

            match parse_tag_body(body) {
                Some((entity_id, alias)) if !body.contains(TAG_OPEN) => {
                    let end = body_end + TAG_CLOSE.len();
                    tags.push(ExplicitTag {
                        span: start..end,
                        entity_id,
                        alias,
                    });
                    cursor = end;
                }
                // `[` is one byte, so stepping past it stays on a char boundary.
                _ => cursor = start + 1,
            }
        }

        tags
    }
}

fn parse_tag_body(body: &str) -> Option<(EntityId, Option<String>)> {
    let (id, alias) = match body.split_once(ALIAS_SEPARATOR) {
        Some((id, alias)) => (id.trim(), Some(alias.trim())),
        None => (body.trim(), None),
    };
    if id.is_empty() || id.contains('\n') {
        return None;
    }
    let alias = alias.filter(|a| !a.is_empty()).map(str::to_string);
    Some((EntityId::new(id), alias))
}

fn resolve_tagged(text: &str, tags: &[ExplicitTag], roster: &Roster) -> Vec<TextSegment> {
    let mut out = SegmentBuilder::default();
    let mut last = 0;

    for tag in tags {
        out.push_literal(&text[last..tag.span.start], last..tag.span.start);
        match roster.get(&tag.entity_id) {
            Some(entity) => {
                let display = tag.alias.as_deref().unwrap_or(&entity.name);
                out.push_ref(entity.id.clone(), display, tag.span.clone());
            }
            None => {
                tracing::debug!(id = %tag.entity_id, "tag references unknown entity, keeping as text");
                let visible = tag.alias.as_deref().unwrap_or(tag.entity_id.as_str());
                out.push_literal(visible, tag.span.clone());
            }
        }
        last = tag.span.end;
    }
    out.push_literal(&text[last..], last..text.len());
    out.finish()
}

/// A compiled longest-first name matcher for one roster.
#[derive(Debug, Clone)]
pub struct RosterMatcher {
    pattern: Option<Regex>,
    /// Candidate tokens in match priority order (longest first).
    tokens: Vec<(String, EntityId)>,
    /// Folded token -> first roster entity owning it.
    owners: FxHashMap<String, EntityId>,
}

impl RosterMatcher {
    pub fn build(roster: &Roster, config: &ResolverConfig) -> Self {
        let mut tokens: Vec<(String, EntityId)> = Vec::new();
        let mut owners: FxHashMap<String, EntityId> = FxHashMap::default();
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for entity in roster.iter() {
            for token in name_tokens(&entity.name, config) {
                let key = fold_key(&token);
                owners.entry(key).or_insert_with(|| entity.id.clone());
                if seen.insert(token.to_lowercase()) {
                    tokens.push((token, entity.id.clone()));
                }
            }
        }

        // Stable: equal lengths keep roster order.
        tokens.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        let pattern = if tokens.is_empty() {
            None
        } else {
            compile_alternation(&tokens)
        };

        Self {
            pattern,
            tokens,
            owners,
        }
    }

    pub fn tokens(&self) -> &[(String, EntityId)] {
        &self.tokens
    }

    /// Entity a matched mention refers to.
    pub fn owner_of(&self, mention: &str) -> Option<&EntityId> {
        self.owners.get(&fold_key(mention))
    }

    pub fn resolve(&self, text: &str) -> Vec<TextSegment> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut out = SegmentBuilder::default();
        let Some(ref pattern) = self.pattern else {
            out.push_literal(text, 0..text.len());
            return out.finish();
        };

        let mut last = 0;
        for found in pattern.find_iter(text) {
            out.push_literal(&text[last..found.start()], last..found.start());
            match self.owner_of(found.as_str()) {
                Some(id) => out.push_ref(id.clone(), found.as_str(), found.range()),
                None => out.push_literal(found.as_str(), found.range()),
            }
            last = found.end();
        }
        out.push_literal(&text[last..], last..text.len());
        out.finish()
    }
}

/// Candidate tokens for one display name, before priority sorting.
pub fn name_tokens(name: &str, config: &ResolverConfig) -> Vec<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    let Some(&first) = words.first() else {
        return Vec::new();
    };

    let mut raw = vec![words.join(" ")];
    if words.len() > 1 {
        if !is_honorific(first, config) {
            raw.push(first.to_string());
        }
        if let Some(&last) = words.last() {
            raw.push(last.to_string());
        }
    }

    // Dialogue may arrive composed or decomposed; match both spellings.
    let mut tokens = Vec::with_capacity(raw.len() * 3);
    for token in raw {
        let stripped = strip_accents(&token);
        let base_len = stripped.chars().count();
        for candidate in [to_nfc(&token), to_nfd(&token), stripped] {
            if base_len < config.min_token_chars
                || is_honorific(&candidate, config)
                || tokens.contains(&candidate)
            {
                continue;
            }
            tokens.push(candidate);
        }
    }
    tokens
}

fn is_honorific(word: &str, config: &ResolverConfig) -> bool {
    let key = fold_key(word.trim_end_matches('.'));
    config.honorifics.iter().any(|h| fold_key(h) == key)
}

fn compile_alternation(tokens: &[(String, EntityId)]) -> Option<Regex> {
    let alternatives: Vec<String> = tokens
        .iter()
        .map(|(token, _)| {
            let mut alt = String::new();
            if token.chars().next().is_some_and(is_word_char) {
                alt.push_str(r"\b");
            }
            alt.push_str(&regex::escape(token));
            if token.chars().last().is_some_and(is_word_char) {
                alt.push_str(r"\b");
            }
            alt
        })
        .collect();

    let source = format!("(?:{})", alternatives.join("|"));
    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(error = %e, "name pattern failed to compile, mentions stay literal");
            None
        }
    }
}

/// Accumulates segments, merging adjacent literals and skipping empty ones.
#[derive(Debug, Default)]
struct SegmentBuilder {
    segments: Vec<TextSegment>,
}

impl SegmentBuilder {
    fn push_literal(&mut self, text: &str, span: Range<usize>) {
        if span.is_empty() {
            return;
        }
        if let Some(TextSegment::Literal {
            text: prev,
            span: prev_span,
        }) = self.segments.last_mut()
        {
            prev.push_str(text);
            prev_span.end = span.end;
            return;
        }
        self.segments.push(TextSegment::Literal {
            text: text.to_string(),
            span,
        });
    }

    fn push_ref(&mut self, entity_id: EntityId, display: &str, span: Range<usize>) {
        self.segments.push(TextSegment::EntityRef {
            entity_id,
            display_text: display.to_string(),
            span,
        });
    }

    fn finish(self) -> Vec<TextSegment> {
        self.segments
    }
}
