use std::fmt::Display;

use console::style;

pub fn success(message: impl Display) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn info(message: impl Display) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

pub fn warn(message: impl Display) {
    eprintln!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

pub fn failure(message: impl Display) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// `label: value` with the value highlighted
pub fn field(label: &str, value: impl Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), style(value).cyan());
}
