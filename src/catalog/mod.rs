//! Prompt catalog: sections of project-management prompt templates
//!
//! The catalog is built once at startup from the compiled-in data and is never
//! mutated afterwards. Searching produces a [`FilteredView`] that borrows from
//! the catalog instead of copying it.

mod data;
mod export;
mod filter;

pub use export::*;
pub use filter::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category a section belongs to, used to group the navigation sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Waterfall,
    Agile,
    #[serde(rename = "SAFe")]
    Safe,
    Roles,
    Jira,
    General,
    Inspiration,
    Documentation,
}

impl Category {
    /// Label shown in navigation headers
    pub fn label(&self) -> &'static str {
        match self {
            Category::Waterfall => "Waterfall",
            Category::Agile => "Agile & Scrum",
            Category::Safe => "SAFe",
            Category::Roles => "Team Roles",
            Category::Jira => "Jira Toolkit",
            Category::General => "General",
            Category::Documentation => "Docs & Reports",
            Category::Inspiration => "Wisdom & Drive",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Waterfall => "Waterfall",
            Category::Agile => "Agile",
            Category::Safe => "SAFe",
            Category::Roles => "Roles",
            Category::Jira => "Jira",
            Category::General => "General",
            Category::Inspiration => "Inspiration",
            Category::Documentation => "Documentation",
        };
        f.write_str(name)
    }
}

/// Source code attached to a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub language: String,
    pub code: String,
}

/// A single prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The prompt body sent to the model
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<CodeSnippet>,
}

impl PromptItem {
    pub fn new(id: &str, title: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            text: text.to_string(),
            tags: Vec::new(),
            code_snippet: None,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_code(mut self, language: &str, code: &str) -> Self {
        self.code_snippet = Some(CodeSnippet {
            language: language.to_string(),
            code: code.to_string(),
        });
        self
    }

    /// Case-insensitive containment on title, body and tags.
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.text.to_lowercase().contains(needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// An ordered group of prompts under one heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub description: String,
    pub items: Vec<PromptItem>,
}

impl Section {
    pub fn new(id: &str, title: &str, category: Category, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            category,
            description: description.to_string(),
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<PromptItem>) -> Self {
        self.items = items;
        self
    }
}

/// The full, ordered collection of sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    sections: Vec<Section>,
}

impl Catalog {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// The prompt collection compiled into the binary
    pub fn builtin() -> Self {
        Self::new(data::builtin_sections())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// The section shown when nothing else has been chosen
    pub fn default_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    /// Look up an item anywhere in the catalog, with its parent section
    pub fn find_item(&self, item_id: &str) -> Option<(&Section, &PromptItem)> {
        self.sections.iter().find_map(|section| {
            section
                .items
                .iter()
                .find(|item| item.id == item_id)
                .map(|item| (section, item))
        })
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Sections grouped by category, categories in first-appearance order
    pub fn grouped(&self) -> Vec<(Category, Vec<&Section>)> {
        let mut groups: Vec<(Category, Vec<&Section>)> = Vec::new();
        for section in &self.sections {
            match groups.iter_mut().find(|(cat, _)| *cat == section.category) {
                Some((_, list)) => list.push(section),
                None => groups.push((section.category, vec![section])),
            }
        }
        groups
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
