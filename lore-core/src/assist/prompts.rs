//! Prompt templates for field assist.
//!
//! Templates use `{name}`, `{kind}`, `{field}` and `{context}`
//! placeholders. Unknown placeholders are left as written.

use crate::world::{Collection, FieldKind, FieldSpec, Fields};

/// A prompt with placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

/// Values substituted into a [`PromptTemplate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    /// Entity name.
    pub name: String,
    /// Entity kind, singular ("magic system").
    pub kind: String,
    /// Label of the field being generated.
    pub field: String,
    /// Summary of the draft's other filled-in fields.
    pub context: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The built-in template for one field of a collection.
    pub fn for_field(collection: Collection, spec: &FieldSpec) -> Self {
        let mut text = String::from(
            "Write the {field} of the {kind} \"{name}\" for a light-novel setting.",
        );
        if let Some(hint) = field_hint(collection, spec.key) {
            text.push(' ');
            text.push_str(hint);
        }
        match spec.kind {
            FieldKind::Number => text.push_str(" Reply with a single whole number."),
            FieldKind::Text => text.push_str(" Keep it to one or two short paragraphs."),
        }
        text.push_str("\n\nWhat is known so far:\n{context}");
        Self { text }
    }

    /// Substitute placeholders.
    pub fn render(&self, values: &PromptContext) -> String {
        self.text
            .replace("{name}", &values.name)
            .replace("{kind}", &values.kind)
            .replace("{field}", &values.field)
            .replace("{context}", &values.context)
    }
}

impl PromptContext {
    /// Gather values from a draft record, skipping `field_key`.
    pub fn from_draft(collection: Collection, draft: &dyn Fields, field_key: &str) -> Self {
        let field = draft
            .spec(field_key)
            .map(|s| s.label.to_lowercase())
            .unwrap_or_else(|| field_key.to_string());

        Self {
            name: draft.name().trim().to_string(),
            kind: collection.singular().to_string(),
            field,
            context: summarize(draft, field_key),
        }
    }
}

/// One `- Label: value` line per filled-in field other than `skip`.
pub fn summarize(draft: &dyn Fields, skip: &str) -> String {
    let lines: Vec<String> = draft
        .specs()
        .iter()
        .filter(|spec| spec.key != skip && spec.key != "name")
        .filter_map(|spec| {
            let value = draft.field(spec.key)?;
            if value.is_empty() {
                return None;
            }
            Some(format!("- {}: {}", spec.label, value.as_text().trim()))
        })
        .collect();

    if lines.is_empty() {
        "(nothing yet)".to_string()
    } else {
        lines.join("\n")
    }
}

fn field_hint(collection: Collection, key: &str) -> Option<&'static str> {
    use Collection::*;
    let hint = match (collection, key) {
        (_, "description") => "Give a vivid overview a reader would remember.",
        (Locations | Regions, "climate") => "Describe seasons, weather and how they shape daily life.",
        (Locations, "notableFeatures") => "List a few distinctive sights or places.",
        (Regions, "terrain") => "Describe the land: relief, waters and vegetation.",
        (Landmarks, "history") | (Traditions, "origin") => "Tell how it came to be, with one concrete past event.",
        (Landmarks | Traditions, "significance") => "Explain what it means to the people around it.",
        (Resources, "uses") => "Name practical and unusual uses.",
        (Peoples, "appearance") => "Describe typical looks, dress and adornment.",
        (Peoples, "culture") => "Cover values, customs and what outsiders notice first.",
        (Religions, "deities") => "Name the deities and their domains.",
        (Religions, "beliefs") => "State the core tenets and what the faithful hope for.",
        (Religions, "practices") => "Describe rites, holy days and taboos.",
        (Languages, "samplePhrases") => "Give three short phrases with translations.",
        (Languages, "grammar") => "Note a few grammatical quirks.",
        (MagicSystems, "source") => "Explain where the power comes from.",
        (MagicSystems, "rules") => "State clear rules a story can rely on.",
        (MagicSystems, "limitations") => "Give hard limits that create tension.",
        (MagicSystems, "cost") => "Describe what using magic takes from the user.",
        (Technologies, "impact") => "Describe how it changed society.",
        (Governments, "structure") => "Describe who holds power and how it passes on.",
        (Governments, "laws") => "Name a few notable laws and their punishments.",
        (Economies, "mainExports") => "Name the main goods traded abroad.",
        (Events, "consequences") => "Describe what changed afterwards.",
        (Events, "participants") => "Name the main people and factions involved.",
        _ => return None,
    };
    Some(hint)
}
