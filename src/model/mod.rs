//! Typed results of an analyzer run
//!
//! These structures mirror the analyzer's JSON output and can be
//! serialized back to it unchanged.

mod key;
mod result;

pub use key::{Mode, MusicalKey, UNKNOWN_CAMELOT, UNKNOWN_KEY_LABEL};
pub use result::{AnalysisResult, Tags};
