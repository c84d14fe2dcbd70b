//! Barcode-to-catalogue workflow: decode, look the ISBN up, warn about
//! duplicates, then hand a pre-filled preview to the confirmation screen.

pub mod lookup;
pub mod workflow;

pub use lookup::{BookLookup, BookPreview, GoogleBooksLookup};
pub use workflow::{Barcode, Cue, DuplicateCheck, Outcome, ScanState, ScanWorkflow, Step, Symbology};
