//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use gitscope_git::{ObjectId, Ref, RefKind};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
///
/// Use for results that should be available for piping, like commit ids.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Abbreviated, colored commit id.
#[must_use]
pub fn short_id(id: &ObjectId) -> String {
    id.short().yellow().to_string()
}

/// Ref name as a user would type it, colored by kind, with a marker for HEAD.
#[must_use]
pub fn ref_label(reference: &Ref, is_head: bool) -> String {
    let name = reference.display_name();
    let colored = match reference.kind() {
        RefKind::Branch => name.green(),
        RefKind::TrackingBranch => name.red(),
        RefKind::Tag => name.yellow().bold(),
        RefKind::Stash => name.magenta(),
    };
    if is_head {
        format!("{} {}", "▶".cyan(), colored.bold())
    } else {
        format!("  {colored}")
    }
}

/// Compact ahead/behind indicator, e.g. `2↑ 1↓`.
#[must_use]
pub fn divergence(ahead: usize, behind: usize) -> String {
    match (ahead, behind) {
        (0, 0) => "in sync".green().to_string(),
        (a, 0) => format!("{a}↑").dimmed().to_string(),
        (0, b) => format!("{b}↓").yellow().to_string(),
        (a, b) => format!("{a}↑ {b}↓").yellow().to_string(),
    }
}

/// Colored `git status`-style letter.
#[must_use]
pub fn status_letter(letter: char) -> String {
    let text = letter.to_string();
    match letter {
        'A' => text.green().to_string(),
        'D' | 'U' => text.red().to_string(),
        '?' => text.dimmed().to_string(),
        _ => text.yellow().to_string(),
    }
}
