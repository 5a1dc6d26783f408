//! Rendering of kiln reports: headings, fields, compiler blocks

use super::context::UiContext;
use console::style;
use std::path::Path;

/// Width of the key column in plain output
const KEY_WIDTH: usize = 11;

/// Result of a one-line action report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action took effect
    Done,
    /// Nothing was changed
    Skipped,
}

/// What `kiln info` shows for one configured compiler
#[derive(Debug)]
pub struct CompilerSummary<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub extensions: &'a [String],
    pub output_extension: &'a str,
    pub identity: &'a str,
    pub directory: &'a Path,
    pub command: &'a str,
    pub command_found: bool,
}

/// Report title
pub fn title(ctx: &UiContext, text: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(text).cyan().bold()).ok();
    } else {
        println!("{}", text);
    }
}

/// Section heading, preceded by a blank line
pub fn section(ctx: &UiContext, text: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(text).bold()).ok();
    } else {
        println!("[{}]", text);
    }
}

/// Aligned `key: value` line
pub fn field(ctx: &UiContext, key: &str, value: &str) {
    println!("{}", field_line(ctx, key, value));
}

fn field_line(ctx: &UiContext, key: &str, value: &str) -> String {
    let key = format!("{:<width$}", format!("{}:", key), width = KEY_WIDTH + 1);
    if ctx.use_fancy_output() {
        format!("  {} {}", style(key).dim(), value)
    } else {
        format!("  {} {}", key, value)
    }
}

/// One compiler: name line followed by its fields
pub fn compiler_block(ctx: &UiContext, summary: &CompilerSummary<'_>) {
    let heading = format!("{} {}", summary.name, summary.version);
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::step(style(heading).bold()).ok();
    } else {
        println!("  {}", heading);
    }

    let extensions = summary
        .extensions
        .iter()
        .map(|e| format!(".{}", e))
        .collect::<Vec<_>>()
        .join(" ");
    field(ctx, "Extensions", &extensions);
    field(ctx, "Output", &format!(".{}", summary.output_extension));
    field(ctx, "Identity", summary.identity);
    field(ctx, "Directory", &summary.directory.display().to_string());
    field(ctx, "Command", &command_status(ctx, summary.command, summary.command_found));
}

fn command_status(ctx: &UiContext, command: &str, found: bool) -> String {
    match (ctx.use_fancy_output(), found) {
        (true, true) => style(command).green().to_string(),
        (true, false) => format!("{} {}", style(command).yellow(), style("(not on PATH)").dim()),
        (false, true) => command.to_string(),
        (false, false) => format!("{} (not on PATH)", command),
    }
}

/// Report the outcome of an action, with a detail such as a path or a hint
pub fn outcome(ctx: &UiContext, outcome: Outcome, message: &str, detail: &str) {
    match (ctx.use_fancy_output(), outcome) {
        (true, Outcome::Done) => {
            cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
        }
        (true, Outcome::Skipped) => {
            cliclack::log::warning(format!("{} - {}", message, style(detail).dim())).ok();
        }
        (false, Outcome::Done) => println!("{} ({})", message, detail),
        (false, Outcome::Skipped) => println!("{} - {}", message, detail),
    }
}
