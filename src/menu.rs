use std::io::{self, Write};
use std::str::FromStr;

use colored::Colorize;

/// One selectable menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Start,
    Stop,
    Logs,
    AddDatabase,
    AddUser,
    Info,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 7] = [
        MenuChoice::Start,
        MenuChoice::Stop,
        MenuChoice::Logs,
        MenuChoice::AddDatabase,
        MenuChoice::AddUser,
        MenuChoice::Info,
        MenuChoice::Exit,
    ];

    pub fn key(self) -> char {
        match self {
            MenuChoice::Start => '1',
            MenuChoice::Stop => '2',
            MenuChoice::Logs => '3',
            MenuChoice::AddDatabase => '4',
            MenuChoice::AddUser => '5',
            MenuChoice::Info => '6',
            MenuChoice::Exit => '7',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Start => "Start MongoDB Container",
            MenuChoice::Stop => "Stop MongoDB Container",
            MenuChoice::Logs => "View Live Logs",
            MenuChoice::AddDatabase => "Add New Database",
            MenuChoice::AddUser => "Add New User",
            MenuChoice::Info => "Get Database Info",
            MenuChoice::Exit => "Exit",
        }
    }
}

/// Input that does not name a menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice(pub String);

impl FromStr for MenuChoice {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => MenuChoice::ALL
                .into_iter()
                .find(|choice| choice.key() == c)
                .ok_or_else(|| UnknownChoice(s.to_string())),
            _ => Err(UnknownChoice(s.to_string())),
        }
    }
}

const TITLE: &str = "MongoDB Docker Manager";

/// Title followed by the boxed list of choices.
pub fn render(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", format!("  ◆ {} ◆", TITLE).cyan().bold())?;
    writeln!(out)?;

    writeln!(out, "{}", "┌───────────────────────────────────────────┐".yellow())?;
    writeln!(out, "{}", "│ Please choose an option:                  │".yellow())?;
    writeln!(out, "{}", "├───────────────────────────────────────────┤".yellow())?;
    for choice in MenuChoice::ALL {
        let key = choice.key().to_string();
        let key = if choice == MenuChoice::Exit {
            key.red()
        } else {
            key.green()
        };
        writeln!(out, "│ [{}] {:<37} │", key, choice.label())?;
    }
    writeln!(out, "{}", "└───────────────────────────────────────────┘".yellow())?;
    out.flush()
}
