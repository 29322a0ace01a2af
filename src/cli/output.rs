//! Colored output helpers for CLI
//!
//! Every message has a colored rendering and a plain one (for `--no-color`
//! and non-terminal output).

use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    fn emit(&self, colored: impl FnOnce() -> String, plain: impl FnOnce() -> String) {
        if self.colored {
            println!("{}", colored());
        } else {
            println!("{}", plain());
        }
    }

    /// Print the trainlog banner
    pub fn banner(&self) {
        const ART: [&str; 5] = [
            " _             _       _             ",
            "| |_ _ __ __ _(_)_ __ | | ___   __ _ ",
            "| __| '__/ _` | | '_ \\| |/ _ \\ / _` |",
            "| |_| | | (_| | | | | | | (_) | (_| |",
            " \\__|_|  \\__,_|_|_| |_|_|\\___/ \\__, |",
        ];
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));

        println!();
        for (i, line) in ART.iter().enumerate() {
            if !self.colored {
                println!("   {}", line);
            } else if i < 2 {
                println!("   {}", line.bright_green().bold());
            } else {
                println!("   {}", line.green().bold());
            }
        }
        self.emit(
            || {
                format!(
                    "   {}{}\n\n   {} {}\n",
                    " ".repeat(33),
                    "|___/".green().bold(),
                    "Training log server".bright_white().bold(),
                    version.dimmed()
                )
            },
            || format!("   {}|___/\n\n   Training log server {}\n", " ".repeat(33), version),
        );
    }

    pub fn success(&self, message: &str) {
        self.emit(
            || format!("  {} {}", "✓".green().bold(), message.green()),
            || format!("  [OK] {}", message),
        );
    }

    pub fn info(&self, message: &str) {
        self.emit(
            || format!("  {} {}", "•".blue(), message),
            || format!("  [INFO] {}", message),
        );
    }

    pub fn warning(&self, message: &str) {
        self.emit(
            || format!("  {} {}", "⚠".yellow().bold(), message.yellow()),
            || format!("  [WARN] {}", message),
        );
    }

    /// Errors go to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Progress line for multi-step operations
    pub fn step(&self, step: u32, total: u32, message: &str) {
        let counter = format!("[{}/{}]", step, total);
        self.emit(
            || format!("  {} {}", counter.dimmed(), message.bright_white()),
            || format!("  {} {}", counter, message),
        );
    }

    /// A file written by `init`
    pub fn created(&self, kind: &str, path: &str) {
        self.emit(
            || format!("  {} {} {}", "✓".green().bold(), kind.dimmed(), path.bright_white()),
            || format!("  [CREATED] {} {}", kind, path),
        );
    }

    pub fn created_dir(&self, path: &str) {
        self.created("directory", path);
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        let reason = format!("({})", reason);
        self.emit(
            || format!("  {} {} {}", "○".yellow(), path.dimmed(), reason.yellow()),
            || format!("  [SKIPPED] {} {}", path, reason),
        );
    }

    pub fn header(&self, title: &str) {
        self.emit(
            || format!("\n  {}", title.bright_white().bold().underline()),
            || format!("\n  === {} ===", title),
        );
    }

    pub fn subheader(&self, title: &str) {
        self.emit(
            || format!("\n  {}", title.cyan().bold()),
            || format!("\n  --- {} ---", title),
        );
    }

    pub fn kv(&self, key: &str, value: &str) {
        self.emit(
            || format!("    {}: {}", key.dimmed(), value.bright_white()),
            || format!("    {}: {}", key, value),
        );
    }

    pub fn hint(&self, message: &str) {
        self.emit(
            || format!("\n  {} {}", "💡".dimmed(), message.dimmed().italic()),
            || format!("\n  [TIP] {}", message),
        );
    }

    /// A shell command the user can copy
    pub fn command(&self, cmd: &str) {
        let line = format!("$ {}", cmd);
        self.emit(
            || format!("     {}", line.bright_cyan()),
            || format!("     {}", line),
        );
    }

    pub fn complete(&self, message: &str) {
        self.emit(
            || format!("\n  {} {}", "✔".green(), message.bright_green().bold()),
            || format!("\n  [DONE] {}", message),
        );
    }

    /// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
    pub fn confirm(&self, message: &str) -> bool {
        if self.colored {
            print!("  {} {} [y/N]: ", "?".bright_yellow().bold(), message.bright_white());
        } else {
            print!("  [?] {} [y/N]: ", message);
        }
        io::stdout().flush().ok();

        let mut input = String::new();
        io::stdin().read_line(&mut input).is_ok()
            && matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
    }

    pub fn table_header(&self, columns: &[&str]) {
        let header = pad_columns(columns);
        let rule_width = columns.len() * 16;
        self.emit(
            || format!("    {}\n    {}", header.bright_white().bold(), "─".repeat(rule_width).dimmed()),
            || format!("    {}\n    {}", header, "-".repeat(rule_width)),
        );
    }

    pub fn table_row(&self, values: &[&str]) {
        println!("    {}", pad_columns(values));
    }

    pub fn newline(&self) {
        println!();
    }
}

fn pad_columns(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("{:<15}", v))
        .collect::<Vec<_>>()
        .join(" ")
}
