use crate::plan::RenamePlan;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use nu_ansi_term::Color as Ansi;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preview {
    /// `"source"  => "destination"`, one pair per line
    #[default]
    Pairs,
    Table,
}

/// Determine whether to color `stream` based on explicit preference or terminal detection
pub fn should_use_color(use_color: Option<bool>, stream: &impl IsTerminal) -> bool {
    match use_color {
        Some(explicit_color) => explicit_color,
        None => stream.is_terminal(),
    }
}

/// Render the plan in the specified format
pub fn render_plan(plan: &RenamePlan, format: Preview, use_color: bool) -> String {
    match format {
        Preview::Pairs => render_pairs(plan, use_color),
        Preview::Table => render_table(plan, use_color),
    }
}

/// Directory creations first, then every pair with sources padded to a common width.
pub fn render_pairs(plan: &RenamePlan, use_color: bool) -> String {
    let mut output = String::new();

    for directory in plan.directories() {
        let line = format!("mkdir: \"{}\"", directory.display());
        if use_color {
            writeln!(output, "{}", Ansi::Cyan.paint(line)).unwrap();
        } else {
            writeln!(output, "{}", line).unwrap();
        }
    }

    let width = plan
        .pairs()
        .iter()
        .map(|pair| pair.source.chars().count())
        .max()
        .unwrap_or(0)
        + 2;

    for pair in plan.pairs() {
        let source = format!("\"{}\"", pair.source);
        let destination = format!("\"{}\"", pair.destination);
        if use_color {
            writeln!(
                output,
                "{:<width$} => {}",
                source,
                Ansi::Green.paint(destination),
                width = width
            )
            .unwrap();
        } else {
            writeln!(output, "{:<width$} => {}", source, destination, width = width).unwrap();
        }
    }

    output
}

pub fn render_table(plan: &RenamePlan, use_color: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Disabled);

    if use_color {
        table.enforce_styling();
        table.set_header(vec![
            Cell::new("Source").fg(Color::Cyan),
            Cell::new("Destination").fg(Color::Cyan),
        ]);
    } else {
        table.set_header(vec!["Source", "Destination"]);
    }

    for pair in plan.pairs() {
        let destination = Cell::new(&pair.destination);
        let destination = if use_color {
            destination.fg(Color::Green)
        } else {
            destination
        };
        table.add_row(vec![Cell::new(&pair.source), destination]);
    }

    let mut output = String::new();
    for directory in plan.directories() {
        writeln!(output, "mkdir: \"{}\"", directory.display()).unwrap();
    }
    writeln!(output, "{table}").unwrap();
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_color_choice_wins() {
        let file = tempfile::tempfile().unwrap();
        assert!(should_use_color(Some(true), &file));
        assert!(!should_use_color(Some(false), &std::io::stderr()));
    }

    #[test]
    fn test_redirected_stream_is_not_colored() {
        let file = tempfile::tempfile().unwrap();
        assert!(!should_use_color(None, &file));
    }
}
