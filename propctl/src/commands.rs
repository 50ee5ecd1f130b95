//! Command implementations.
//!
//! Each command loads the page model, performs one editor operation and
//! writes the page back when the operation changed it. Outcomes are printed
//! the way the editor would show them next to the triggering control.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use proptree::{
    Dialogs, SaveOutcome,
    collect::collect,
    data::{Node, Page, PropertyTree, StatusKind, StatusMessage},
    hydrate::hydrate,
    items::{AddOutcome, DeleteOutcome},
    path::{AddressingMode, PathResolver},
};

use crate::ctx::AppContext;

/// Handler for the property editing commands.
pub struct CommandHandler;

impl CommandHandler {
    /// Prints every group, item and control of the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be loaded.
    pub fn show(ctx: &AppContext) -> Result<()> {
        let page = ctx.load_page()?;
        print!("{}", render_page(&page));
        Ok(())
    }

    /// Prints the tree a save of `group` would send.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is unknown or validation fails.
    pub fn collect(ctx: &AppContext, group: &str, check_required: bool) -> Result<()> {
        let page = ctx.load_page()?;
        let group = page
            .group(group)
            .ok_or_else(|| anyhow!("no control group `{group}`"))?;
        let tree = collect(group, check_required)?;
        println!("{}", serde_json::to_string_pretty(&tree)?);
        Ok(())
    }

    /// Saves `group` to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the server call fails.
    pub async fn save(ctx: &AppContext, group: &str, dialogs: impl Dialogs) -> Result<()> {
        let editor = ctx.editor(dialogs)?;
        let outcome = editor.save(group).await?;
        ctx.store_page(&editor.page())?;
        match outcome {
            SaveOutcome::Saved => {
                print_status(&StatusMessage::success(proptree::sync::SAVED_MESSAGE));
                Ok(())
            }
            SaveOutcome::Busy => bail!("a save of `{group}` is already in progress"),
            SaveOutcome::Invalid(e) => bail!(e),
            SaveOutcome::Failed(e) => {
                print_status(&StatusMessage::error(&e));
                Err(e).context(format!("saving `{group}` failed"))
            }
        }
    }

    /// Adds a new item to the container at `container`.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is unknown or the name is rejected.
    pub fn add_item(ctx: &AppContext, container: &str, dialogs: impl Dialogs) -> Result<()> {
        let editor = ctx.editor(dialogs)?;
        match editor.add_item(container)? {
            AddOutcome::Added(prefix) => {
                ctx.store_page(&editor.page())?;
                println!("{} {}", "added".green(), prefix);
            }
            AddOutcome::Cancelled => println!("cancelled"),
        }
        Ok(())
    }

    /// Deletes the item at `item`, locally or on the server per its container.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is unknown or the server call fails.
    pub async fn delete_item(ctx: &AppContext, item: &str, dialogs: impl Dialogs) -> Result<()> {
        let editor = ctx.editor(dialogs)?;
        let outcome = editor.delete_item(item).await?;
        match outcome {
            DeleteOutcome::Removed => {
                ctx.store_page(&editor.page())?;
                println!("{} {}", "deleted".green(), item);
                Ok(())
            }
            DeleteOutcome::Cancelled => {
                println!("cancelled");
                Ok(())
            }
            DeleteOutcome::Busy => bail!("a delete of `{item}` is already in progress"),
            DeleteOutcome::Failed(e) => {
                ctx.store_page(&editor.page())?;
                print_status(&StatusMessage::error(&e));
                bail!("deleting `{item}` failed: {e}")
            }
        }
    }

    /// Expands or collapses the item at `item`.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is unknown.
    pub fn toggle(ctx: &AppContext, item: &str) -> Result<()> {
        let mut page = ctx.load_page()?;
        let expanded = proptree::items::toggle_item(&mut page, item)?;
        ctx.store_page(&page)?;
        println!("{item} {}", if expanded { "expanded" } else { "collapsed" });
        Ok(())
    }

    /// Sets the value of the control resolving to `key`.
    ///
    /// `value` is read per control type: checkboxes take `true`/`false`,
    /// other controls keep the text as given.
    ///
    /// # Errors
    ///
    /// Returns an error if no control resolves to `key`.
    pub fn set(ctx: &AppContext, key: &str, value: &str, dialogs: impl Dialogs) -> Result<()> {
        let editor = ctx.editor(dialogs)?;
        if editor.set_value(key, value) == 0 {
            bail!("no control resolves to `{key}`");
        }
        ctx.store_page(&editor.page())?;
        Ok(())
    }

    /// Loads stored properties from a JSON file into the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn hydrate(ctx: &AppContext, properties: &Path) -> Result<()> {
        let content = std::fs::read_to_string(properties)
            .with_context(|| format!("failed to read {}", properties.display()))?;
        let tree: PropertyTree = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a JSON object", properties.display()))?;
        let mut page = ctx.load_page()?;
        let updated = hydrate(&mut page, &tree);
        ctx.store_page(&page)?;
        println!("{updated} controls loaded");
        Ok(())
    }
}

fn print_status(status: &StatusMessage) {
    match status.kind {
        StatusKind::Success => println!("{}", status.text.green()),
        StatusKind::Error => println!("{}", status.text.red()),
    }
}

/// Renders the page as an indented outline.
pub fn render_page(page: &Page) -> String {
    let mut out = String::new();
    out += &format!("project: {}\n", page.project.bold());
    if page.dirty {
        out += &format!("{}\n", "unsaved changes".yellow());
    }
    for group in &page.groups {
        render_group(&mut out, group, 0);
    }
    out
}

fn render_group(out: &mut String, group: &proptree::data::ControlGroup, depth: usize) {
    let indent = "  ".repeat(depth);
    let mode = match group.mode {
        AddressingMode::Nested => "nested",
        AddressingMode::Flat => "flat",
    };
    out.push_str(&format!(
        "{indent}[{}] ({mode}) <{}>\n",
        group.id.cyan(),
        group.save_button.label
    ));
    if let Some(status) = &group.status {
        out.push_str(&format!("{indent}  {}\n", status.text));
    }
    render_nodes(
        out,
        &group.nodes,
        PathResolver::new(group.mode),
        &group.prefix,
        depth + 1,
    );
}

fn render_nodes(
    out: &mut String,
    nodes: &[Node],
    resolver: PathResolver,
    prefix: &str,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            Node::Control(c) => {
                let key = resolver.resolve(&c.path, prefix);
                let value = match c.coerce() {
                    Ok(v) => v.to_string(),
                    Err(_) => format!("{:?}", c.raw.as_text()).red().to_string(),
                };
                let required = if c.required { "*" } else { "" };
                out.push_str(&format!("{indent}{key}{required} = {value}\n"));
            }
            Node::Container(container) => {
                out.push_str(&format!(
                    "{indent}{} {}\n",
                    container.prefix.magenta(),
                    format!("({} items)", container.items.len()).dimmed()
                ));
                for item in &container.items {
                    let marker = if item.expanded { "-" } else { "+" };
                    out.push_str(&format!(
                        "{indent}  {marker} {} <{}>\n",
                        item.name.bold(),
                        item.delete_button.label
                    ));
                    if let Some(status) = &item.status {
                        out.push_str(&format!("{indent}    {}\n", status.text));
                    }
                    if item.expanded {
                        render_nodes(out, &item.nodes, resolver, &item.path_prefix, depth + 2);
                    }
                }
            }
            Node::Group(group) => render_group(out, group, depth),
        }
    }
}
