//! Terminal output for the CLI: status lines, record listings and the
//! row-count table. Colors are used only when stdout is a terminal.

use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

pub mod records;
pub mod table;

pub use records::{print_collection, record_line, Describe};
pub use table::stats_table;

static PALETTE: OnceLock<Palette> = OnceLock::new();

/// Styles for the handful of things campusdb prints
#[derive(Debug, Clone)]
pub struct Palette {
    pub title: Style,
    pub id: Style,
    pub ok: Style,
    pub muted: Style,
}

impl Palette {
    fn for_stdout() -> Self {
        if !console::Term::stdout().is_term() {
            return Self {
                title: Style::new(),
                id: Style::new(),
                ok: Style::new(),
                muted: Style::new(),
            };
        }
        Self {
            title: Style::new().cyan().bold(),
            id: Style::new().yellow(),
            ok: Style::new().green().bold(),
            muted: Style::new().bright_black(),
        }
    }
}

pub fn palette() -> &'static Palette {
    PALETTE.get_or_init(Palette::for_stdout)
}

/// Heading for a command's output
pub fn banner(text: &str) {
    println!("🎓 {}", text.style(palette().title.clone()));
}

pub fn done(text: &str) {
    println!("✅ {}", text.style(palette().ok.clone()));
}

/// `label: value` line with a muted label
pub fn detail(label: &str, value: &str) {
    println!("   {}: {}", label.style(palette().muted.clone()), value);
}
