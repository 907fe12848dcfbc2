// ============================================================
// Layer 3 — Dataset Split
// ============================================================
// Every dataset is tagged with the split it came from. The
// evaluation loop only cares about one question: is this the
// held-out test sequence? Test windows are cut from a single
// continuous recording, so their predictions are re-aligned
// with the raw sequence afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The partition a dataset was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// The tag used in file names and report rows
    pub fn prefix(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val   => "val",
            Split::Test  => "test",
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Split::Test)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
