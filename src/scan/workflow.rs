//! Scan state machine.
//!
//! ```text
//! Scanning --barcode/manual ISBN--> LookingUp --miss--> Scanning
//!                                       |
//!                                       +--hit, ISBN already shelved--> DuplicateConfirm --skip--> Scanning
//!                                       |                                     |
//!                                       |                                  add copy
//!                                       |                                     v
//!                                       +--hit----------------------------> Preview --refocus--> Scanning
//! ```

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::lookup::{BookLookup, BookPreview};
use crate::client::CatalogStore;

/// Barcode formats that carry an ISBN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Ean13,
    Ean8,
    UpcA,
    UpcE,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unsupported barcode type: {0}")]
pub struct UnsupportedSymbology(pub String);

impl FromStr for Symbology {
    type Err = UnsupportedSymbology;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ean13" => Ok(Symbology::Ean13),
            "ean8" => Ok(Symbology::Ean8),
            "upc_a" => Ok(Symbology::UpcA),
            "upc_e" => Ok(Symbology::UpcE),
            other => Err(UnsupportedSymbology(other.to_string())),
        }
    }
}

/// Raw decode result as reported by the camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barcode {
    pub symbology: String,
    pub data: String,
}

/// Haptic feedback the view should play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Scanning,
    LookingUp { isbn: String },
    DuplicateConfirm { preview: BookPreview },
    Preview { preview: BookPreview },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Input dropped: wrong symbology, blank entry, or not currently scanning
    Ignored,
    /// Nothing found; scanning is re-enabled
    LookupFailed,
    /// ISBN already in the catalogue; waiting for skip or add-copy
    DuplicateFound(BookPreview),
    /// Navigate to the preview screen with this metadata
    Preview(BookPreview),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub outcome: Outcome,
    pub cues: Vec<Cue>,
}

impl Step {
    fn ignored() -> Self {
        Self {
            outcome: Outcome::Ignored,
            cues: Vec::new(),
        }
    }
}

/// Answers whether an ISBN is already catalogued
pub trait DuplicateCheck: Send + Sync {
    fn has_isbn(&self, isbn: &str) -> bool;
}

impl DuplicateCheck for CatalogStore {
    fn has_isbn(&self, isbn: &str) -> bool {
        CatalogStore::has_isbn(self, isbn)
    }
}

pub struct ScanWorkflow {
    lookup: Arc<dyn BookLookup>,
    catalog: Arc<dyn DuplicateCheck>,
    state: ScanState,
}

impl ScanWorkflow {
    pub fn new(lookup: Arc<dyn BookLookup>, catalog: Arc<dyn DuplicateCheck>) -> Self {
        Self {
            lookup,
            catalog,
            state: ScanState::Scanning,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Camera decode. Only acted on while scanning, and only for ISBN-bearing formats.
    pub async fn on_barcode(&mut self, barcode: &Barcode) -> Step {
        self.recover_abandoned_lookup();
        if self.state != ScanState::Scanning {
            return Step::ignored();
        }
        if let Err(e) = barcode.symbology.parse::<Symbology>() {
            tracing::debug!("{}", e);
            return Step::ignored();
        }
        self.process(barcode.data.clone()).await
    }

    /// Typed-in ISBN, bypassing the camera
    pub async fn submit_manual(&mut self, input: &str) -> Step {
        self.recover_abandoned_lookup();
        let isbn = input.trim();
        if isbn.is_empty() || self.state != ScanState::Scanning {
            return Step::ignored();
        }
        self.process(isbn.to_string()).await
    }

    /// `process` holds `&mut self` until the lookup settles, so a `LookingUp`
    /// state seen from any other call means that future was dropped mid-lookup.
    fn recover_abandoned_lookup(&mut self) {
        if let ScanState::LookingUp { isbn } = &self.state {
            tracing::debug!(%isbn, "Lookup was cancelled, resuming scan");
            self.state = ScanState::Scanning;
        }
    }

    async fn process(&mut self, isbn: String) -> Step {
        self.state = ScanState::LookingUp { isbn: isbn.clone() };
        let mut cues = vec![Cue::Success];

        let outcome = match self.lookup.lookup(&isbn).await {
            Some(preview) if self.catalog.has_isbn(&isbn) => {
                tracing::info!(%isbn, "Scanned ISBN is already in the library");
                self.state = ScanState::DuplicateConfirm {
                    preview: preview.clone(),
                };
                Outcome::DuplicateFound(preview)
            }
            Some(preview) => {
                self.state = ScanState::Preview {
                    preview: preview.clone(),
                };
                Outcome::Preview(preview)
            }
            None => {
                tracing::debug!(%isbn, "Lookup failed, resuming scan");
                cues.push(Cue::Failure);
                self.state = ScanState::Scanning;
                Outcome::LookupFailed
            }
        };

        Step { outcome, cues }
    }

    /// "Add copy" on the duplicate warning
    pub fn confirm_duplicate(&mut self) -> Option<BookPreview> {
        match std::mem::replace(&mut self.state, ScanState::Scanning) {
            ScanState::DuplicateConfirm { preview } => {
                self.state = ScanState::Preview {
                    preview: preview.clone(),
                };
                Some(preview)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// "Skip" on the duplicate warning
    pub fn skip_duplicate(&mut self) {
        if matches!(self.state, ScanState::DuplicateConfirm { .. }) {
            self.state = ScanState::Scanning;
        }
    }

    /// The scan screen regained focus
    pub fn refocus(&mut self) {
        self.recover_abandoned_lookup();
        self.state = ScanState::Scanning;
    }
}
