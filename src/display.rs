use crate::utils::text::{display_width, pad_to_width, wrap_text};
use console::style;
use termimad::MadSkin;

/// Usable box width for the current terminal.
fn box_width(max: usize) -> usize {
    let columns = console::Term::stdout().size().1 as usize;
    columns.saturating_sub(4).min(max).max(40)
}

/// The generated AutoLISP in a framed block.
pub fn display_script(code: &str) {
    let width = box_width(100);
    let inner = width - 4;
    let header = "┌─ AutoLISP ".to_string() + &"─".repeat(width.saturating_sub(13)) + "┐";
    let footer = "└".to_string() + &"─".repeat(width - 2) + "┘";

    println!("\n{}", style("📐 生成されたコード").bold().magenta());
    println!("{}", style(&header).dim().green());
    for line in wrap_text(code, inner) {
        println!(
            "│ {} │",
            style(pad_to_width(&line, inner)).bold().white()
        );
    }
    println!("{}", style(&footer).dim().green());
}

/// A plain bot reply: greeting, apology or a reply without markup.
pub fn display_response(response: &str) {
    let max_width = box_width(100);
    let lines = wrap_text(response, max_width - 4);
    let content = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
    let width = (content + 4).min(max_width);
    let inner = width - 4;

    let top = "┌".to_string() + &"─".repeat(width - 2) + "┐";
    let bottom = "└".to_string() + &"─".repeat(width - 2) + "┘";

    println!("\n{}", style("🤖 アシスタント").bold().blue());
    println!("{}", style(&top).dim().blue());
    for line in lines {
        println!("│ {} │", pad_to_width(&line, inner));
    }
    println!("{}", style(&bottom).dim().blue());
}

/// Explanation text, rendered as markdown when it contains any.
pub fn display_explanation(text: &str) {
    if text.contains("```") || text.contains('*') || text.contains('`') || text.contains('#') {
        display_markdown(text);
    } else {
        display_response(text);
    }
}

pub fn display_markdown(text: &str) {
    let skin = MadSkin::default();
    println!("\n{}", style("🤖 アシスタント").bold().blue());
    skin.print_text(text);
}

/// The character caption shown while a turn runs.
pub fn display_caption(caption: &str) {
    println!("{} {}", style("💬").bold(), style(caption).italic().cyan());
}

pub fn display_info(message: &str) {
    println!("{} {}", style("ℹ").bold().cyan(), message);
}

pub fn display_alert(message: &str) {
    println!("{} {}", style("⚠").bold().yellow(), style(message).bold().yellow());
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✖").bold().red(), style(message).red());
}
