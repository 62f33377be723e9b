//! The templates command

use colored::Colorize;

use mcpset_core::{Error, Settings, TemplateCatalog};

use crate::error::Result;

pub fn run_templates(settings: &Settings, show: Option<&str>) -> Result<()> {
    let catalog = TemplateCatalog::load(settings)?;

    if let Some(name) = show {
        let template = catalog.get(name).ok_or_else(|| Error::TemplateNotFound {
            name: name.to_string(),
        })?;
        println!("{}", serde_json::to_string_pretty(template)?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("{} No templates defined.", "=>".blue().bold());
        println!("Add templates to {}.", settings.templates_file.as_str().cyan());
        return Ok(());
    }

    println!("{} Templates:", "=>".blue().bold());
    for (name, template) in catalog.iter() {
        let description = template.description.as_deref().unwrap_or("");
        println!("   {} {}", name.cyan(), description.dimmed());
        let placeholders = template.placeholders();
        if !placeholders.is_empty() {
            println!("      {} {}", "vars".dimmed(), placeholders.join(", "));
        }
    }
    Ok(())
}
