use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens to the children of a company, branch or emissions source
/// when the parent row is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Children stay in place with their parent reference cleared.
    #[default]
    Orphan,
    /// Children and all of their descendants are deleted with the parent.
    Cascade,
    /// The delete is refused while any direct child exists.
    Restrict,
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeletePolicy::Orphan => "orphan",
            DeletePolicy::Cascade => "cascade",
            DeletePolicy::Restrict => "restrict",
        };
        f.write_str(name)
    }
}
