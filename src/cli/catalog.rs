//! Catalog browsing commands: list, search and show

use anyhow::{anyhow, Result};
use clap::Args;
use std::fmt::Write;

use crate::{
    catalog::{filter, Catalog, FilteredView, PromptItem, Section},
    utils::{clipboard, text::{format, string}},
};

const TITLE_WIDTH: usize = 34;
const SUMMARY_WIDTH: usize = 60;

/// List catalog sections and prompts
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only list this section
    #[arg(short = 's', long = "section", value_name = "ID")]
    pub section: Option<String>,

    /// Print section headings only
    #[arg(long = "sections-only")]
    pub sections_only: bool,
}

impl ListCommand {
    pub fn execute(&self) -> Result<()> {
        let catalog = Catalog::builtin();
        print!("{}", self.render(&catalog)?);
        Ok(())
    }

    fn render(&self, catalog: &Catalog) -> Result<String> {
        let mut out = String::new();
        if let Some(id) = &self.section {
            let section = catalog
                .section(id)
                .ok_or_else(|| anyhow!("No section with id '{}'", id))?;
            write_section(&mut out, section, section.items.iter(), self.sections_only)?;
            return Ok(out);
        }

        for (category, sections) in catalog.grouped() {
            writeln!(out, "== {} ==", category.label())?;
            for section in sections {
                write_section(&mut out, section, section.items.iter(), self.sections_only)?;
            }
            writeln!(out)?;
        }
        writeln!(
            out,
            "{} prompts in {} sections",
            catalog.item_count(),
            catalog.sections().len()
        )?;
        Ok(out)
    }
}

/// Search the catalog by title, body or tag
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Case-insensitive search term
    pub term: String,
}

impl SearchCommand {
    pub fn execute(&self) -> Result<()> {
        let catalog = Catalog::builtin();
        print!("{}", render_search(&filter(&catalog, &self.term))?);
        Ok(())
    }
}

fn render_search(view: &FilteredView<'_>) -> Result<String> {
    let mut out = String::new();
    if view.is_empty() {
        writeln!(out, "No prompts found for \"{}\"", view.term())?;
        return Ok(out);
    }

    writeln!(
        out,
        "Found {} prompts in {} sections for \"{}\"",
        view.total_items(),
        view.sections().len(),
        view.term()
    )?;
    writeln!(out)?;
    for section in view.sections() {
        write_section(&mut out, section.section, section.items.iter().copied(), false)?;
        if section.title_matched {
            writeln!(out, "  (section title matches; all prompts shown)")?;
        }
    }
    Ok(out)
}

fn write_section<'a>(
    out: &mut String,
    section: &Section,
    items: impl Iterator<Item = &'a PromptItem>,
    heading_only: bool,
) -> Result<()> {
    writeln!(out, "{} [{}]", section.title, section.id)?;
    if heading_only {
        writeln!(out, "{}", format::indent(&section.description, 2))?;
        return Ok(());
    }
    for item in items {
        writeln!(
            out,
            "  {} {}  {}",
            format::pad_right(&item.id, 11),
            format::pad_right(&string::truncate(&item.title, TITLE_WIDTH), TITLE_WIDTH),
            string::truncate(&string::normalize_whitespace(&item.text), SUMMARY_WIDTH)
        )?;
    }
    Ok(())
}

/// Show one prompt
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Prompt id, e.g. wf-1
    pub id: String,

    /// Print only the code sample
    #[arg(long = "code")]
    pub code: bool,

    /// Also copy the text (or code sample) to the clipboard
    #[arg(long = "copy")]
    pub copy: bool,
}

impl ShowCommand {
    pub fn execute(&self) -> Result<()> {
        let catalog = Catalog::builtin();
        let (section, item) = catalog
            .find_item(&self.id)
            .ok_or_else(|| anyhow!("No prompt with id '{}'", self.id))?;

        let payload = if self.code {
            item.code_snippet
                .as_ref()
                .map(|snippet| snippet.code.clone())
                .ok_or_else(|| anyhow!("Prompt '{}' has no code sample", self.id))?
        } else {
            item.text.clone()
        };

        if self.code {
            println!("{}", payload);
        } else {
            print!("{}", render_item(section, item)?);
        }

        if self.copy {
            clipboard::copy_to_clipboard(&payload)?;
            eprintln!("Copied to clipboard.");
        }
        Ok(())
    }
}

fn render_item(section: &Section, item: &PromptItem) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", item.title)?;
    writeln!(out, "{} / {}", section.category.label(), section.title)?;
    if let Some(description) = &item.description {
        writeln!(out, "{}", description)?;
    }
    if !item.tags.is_empty() {
        writeln!(out, "Tags: {}", item.tags.join(", "))?;
    }
    writeln!(out)?;
    for line in string::word_wrap(&item.text, 80) {
        writeln!(out, "{}", line)?;
    }
    if let Some(snippet) = &item.code_snippet {
        writeln!(out)?;
        writeln!(out, "```{}", snippet.language)?;
        writeln!(out, "{}", snippet.code.trim_end())?;
        writeln!(out, "```")?;
    }
    Ok(out)
}
