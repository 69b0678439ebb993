//! Collaborators the presenters read from or write into.
//!
//! Everything here is a seam: the page surface, dialogs, templating, the
//! client directory and the clock are owned elsewhere. The presenters only
//! depend on these traits.

pub mod clients;
pub mod render;
pub mod scope;

pub use clients::{ClientDirectory, ClientSummary, StaticClientDirectory};
pub use render::{Markup, PlainTextRenderer, RowPayload, TokenAttributes, TokenRenderer};
pub use scope::{ScopeCatalog, ScopeListing, SystemScope};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};

use crate::token::TokenKind;

/// Handle for one rendered row on a [`ViewSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u64);

/// Visual phases of removing a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Fade,
    Collapse,
}

/// Which half of a token section is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionVisibility {
    pub table: bool,
    pub placeholder: bool,
}

impl SectionVisibility {
    /// Table for non-empty registries, placeholder otherwise.
    pub fn for_len(len: usize) -> Self {
        Self {
            table: len > 0,
            placeholder: len == 0,
        }
    }
}

/// The UI tree the presenters render into.
///
/// Any call naming a row that is no longer attached must be a silent no-op.
#[async_trait]
pub trait ViewSurface: Send + Sync {
    /// Rebuild the table structure, discarding every attached row.
    fn mount_shell(&self, shell: Markup);

    fn attach_row(&self, kind: TokenKind, row: RowId, markup: Markup);

    fn replace_row(&self, row: RowId, markup: Markup);

    /// Toggle between the masked substring and the full value.
    fn show_full_value(&self, row: RowId, revealed: bool);

    /// Play one removal transition to completion.
    async fn transition(&self, row: RowId, transition: Transition);

    fn detach_row(&self, row: RowId);

    fn set_section_visibility(&self, kind: TokenKind, visibility: SectionVisibility);
}

/// Blocking modal prompts.
pub trait Dialogs: Send + Sync {
    /// Yes/no question; `true` means the user confirmed.
    fn confirm(&self, prompt: &str) -> bool;

    fn alert(&self, message: &str);
}

/// Source of "now" for calendar formatting.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
