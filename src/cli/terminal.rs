//! Terminal implementations of the view collaborators.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::token::TokenKind;
use crate::view::{Dialogs, Markup, RowId, SectionVisibility, Transition, ViewSurface};

#[derive(Debug, Default)]
struct TerminalState {
    title: Markup,
    rows: Vec<(TokenKind, RowId, Markup)>,
    sections: HashMap<TokenKind, SectionVisibility>,
}

/// Buffers the table and prints it on demand.
///
/// Token values stay masked; the terminal never shows a revealed value.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    state: Mutex<TerminalState>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let state = self.state();
        writeln!(out, "{}", state.title)?;
        for kind in TokenKind::ALL {
            let heading = match kind {
                TokenKind::Access => "Access tokens",
                TokenKind::Refresh => "Refresh tokens",
            };
            writeln!(out, "\n{heading}")?;
            let visibility = state
                .sections
                .get(&kind)
                .copied()
                .unwrap_or(SectionVisibility::for_len(0));
            if visibility.placeholder {
                writeln!(out, "  There are no active {kind} tokens.")?;
            }
            if visibility.table {
                for (_, _, markup) in state.rows.iter().filter(|(k, _, _)| *k == kind) {
                    writeln!(out, "  {markup}")?;
                }
            }
        }
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ViewSurface for TerminalSurface {
    fn mount_shell(&self, shell: Markup) {
        let mut state = self.state();
        state.title = shell;
        state.rows.clear();
    }

    fn attach_row(&self, kind: TokenKind, row: RowId, markup: Markup) {
        self.state().rows.push((kind, row, markup));
    }

    fn replace_row(&self, row: RowId, markup: Markup) {
        if let Some(entry) = self.state().rows.iter_mut().find(|(_, id, _)| *id == row) {
            entry.2 = markup;
        }
    }

    fn show_full_value(&self, _row: RowId, _revealed: bool) {}

    async fn transition(&self, _row: RowId, _transition: Transition) {}

    fn detach_row(&self, row: RowId) {
        self.state().rows.retain(|(_, id, _)| *id != row);
    }

    fn set_section_visibility(&self, kind: TokenKind, visibility: SectionVisibility) {
        self.state().sections.insert(kind, visibility);
    }
}

/// Prompts on stderr, answers from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinDialogs {
    assume_yes: bool,
}

impl StdinDialogs {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Dialogs for StdinDialogs {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn alert(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}
