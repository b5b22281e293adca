//! Search filtering over the catalog

use super::{Catalog, PromptItem, Section};

/// A section as it appears after filtering
#[derive(Debug, Clone)]
pub struct FilteredSection<'a> {
    pub section: &'a Section,
    pub items: Vec<&'a PromptItem>,
    /// The section title itself matched, so every item was kept
    pub title_matched: bool,
}

impl<'a> FilteredSection<'a> {
    pub fn id(&self) -> &'a str {
        &self.section.id
    }

    pub fn title(&self) -> &'a str {
        &self.section.title
    }

    #[cfg(test)]
    fn into_owned(self) -> Section {
        Section {
            items: self.items.into_iter().cloned().collect(),
            ..self.section.clone()
        }
    }
}

/// The catalog narrowed by a search term. Never stored; rebuild it whenever
/// the term changes.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    term: String,
    sections: Vec<FilteredSection<'a>>,
}

impl<'a> FilteredView<'a> {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn sections(&self) -> &[FilteredSection<'a>] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// The section with `active_id` if it survived filtering, otherwise the
    /// first remaining section
    pub fn active_section(&self, active_id: Option<&str>) -> Option<&FilteredSection<'a>> {
        active_id
            .and_then(|id| self.sections.iter().find(|s| s.id() == id))
            .or_else(|| self.sections.first())
    }

    /// Screen-reader style summary of the result for the active section
    pub fn summary(&self, active_id: Option<&str>) -> Option<String> {
        if self.term.is_empty() {
            return None;
        }
        let count = self.active_section(active_id).map_or(0, |s| s.items.len());
        Some(format!("Found {} prompts for \"{}\"", count, self.term))
    }

    /// Materialize the view as a standalone catalog
    #[cfg(test)]
    pub fn to_catalog(&self) -> Catalog {
        Catalog::new(self.sections.iter().cloned().map(FilteredSection::into_owned).collect())
    }
}

/// Narrow `catalog` to the sections and items matching `term`.
///
/// Matching is case-insensitive substring containment. A section whose title
/// matches keeps all of its items; otherwise only matching items are kept and
/// sections left without items are dropped. Catalog order is preserved.
pub fn filter<'a>(catalog: &'a Catalog, term: &str) -> FilteredView<'a> {
    if term.is_empty() {
        return FilteredView {
            term: String::new(),
            sections: catalog
                .sections()
                .iter()
                .map(|section| FilteredSection {
                    section,
                    items: section.items.iter().collect(),
                    title_matched: false,
                })
                .collect(),
        };
    }

    let needle = term.to_lowercase();
    let sections = catalog
        .sections()
        .iter()
        .filter_map(|section| {
            let title_matched = section.title.to_lowercase().contains(&needle);
            let items: Vec<&PromptItem> = if title_matched {
                section.items.iter().collect()
            } else {
                section.items.iter().filter(|item| item.matches(&needle)).collect()
            };

            if title_matched || !items.is_empty() {
                Some(FilteredSection { section, items, title_matched })
            } else {
                None
            }
        })
        .collect();

    FilteredView {
        term: term.to_string(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    fn small_catalog() -> Catalog {
        Catalog::new(vec![
            Section::new("plan", "Waterfall: Planning", Category::Waterfall, "planning")
                .with_items(vec![
                    PromptItem::new("wf-1", "Full WBS Generation", "Generate a WBS.")
                        .with_tags(&["Planning", "WBS"]),
                    PromptItem::new("wf-2", "Scope Statement", "Create a scope statement.")
                        .with_tags(&["Scope"]),
                ]),
            Section::new("risk", "Risk Corner", Category::Roles, "risks").with_items(vec![
                PromptItem::new("r-1", "RAID Log", "Risks, assumptions, issues, dependencies.")
                    .with_tags(&["Risk"]),
                PromptItem::new("r-2", "Morale", "Boost the team.").with_tags(&["Leadership"]),
            ]),
        ])
    }

    #[test]
    fn test_empty_term_is_identity() {
        let catalog = Catalog::builtin();
        let view = filter(&catalog, "");
        assert_eq!(view.to_catalog(), catalog);
        assert_eq!(view.total_items(), catalog.item_count());
        assert!(view.summary(None).is_none());
    }

    #[test]
    fn test_wbs_scenario() {
        let catalog = Catalog::builtin();
        let view = filter(&catalog, "WBS");

        let planning = view
            .sections()
            .iter()
            .find(|s| s.title() == "Waterfall: Planning")
            .expect("planning section kept");
        assert!(planning.items.iter().any(|i| i.title == "Full WBS Generation"));

        assert!(filter(&catalog, "zzz-no-match").is_empty());
    }

    #[test]
    fn test_every_result_item_matches() {
        let catalog = Catalog::builtin();
        for term in ["risk", "JQL", "python", "Sprint", "a", "→"] {
            let needle = term.to_lowercase();
            let view = filter(&catalog, term);
            for section in view.sections() {
                let title_hit = section.title().to_lowercase().contains(&needle);
                assert_eq!(title_hit, section.title_matched);
                for item in &section.items {
                    assert!(title_hit || item.matches(&needle), "{} leaked for {}", item.id, term);
                }
            }
        }
    }

    #[test]
    fn test_section_title_match_keeps_all_items() {
        let catalog = small_catalog();
        let view = filter(&catalog, "risk corner");
        assert_eq!(view.sections().len(), 1);
        assert_eq!(view.sections()[0].items.len(), 2);
        assert!(view.sections()[0].title_matched);
    }

    #[test]
    fn test_item_match_keeps_only_matching_items() {
        let catalog = small_catalog();
        let view = filter(&catalog, "scope");
        assert_eq!(view.sections().len(), 1);
        let ids: Vec<&str> = view.sections()[0].items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["wf-2"]);
    }

    #[test]
    fn test_order_preserved() {
        let catalog = small_catalog();
        let view = filter(&catalog, "e");
        let ids: Vec<&str> = view.sections().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["plan", "risk"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let catalog = Catalog::builtin();
        for term in ["WBS", "risk", "Planning", "dashboard", "zzz"] {
            let once = filter(&catalog, term).to_catalog();
            let twice = filter(&once, term).to_catalog();
            assert_eq!(once, twice, "not idempotent for {}", term);
        }
    }

    #[test]
    fn test_active_section_falls_back_to_first() {
        let catalog = small_catalog();
        let view = filter(&catalog, "risk");
        assert_eq!(view.active_section(Some("plan")).unwrap().id(), "risk");
        assert_eq!(view.active_section(Some("risk")).unwrap().id(), "risk");
        assert_eq!(
            view.summary(Some("plan")).unwrap(),
            "Found 2 prompts for \"risk\""
        );

        let empty = filter(&catalog, "nothing here");
        assert!(empty.active_section(Some("plan")).is_none());
    }
}
