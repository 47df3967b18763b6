//! Prunable-parameter selection
//!
//! A parameter is prunable iff the selector is `__ALL__` or its name
//! matches the configured regular expression. Matching is a search, not a
//! full match: the pattern `"weight"` selects `"layer.weight"`.

use crate::error::Result;
use crate::prune::config::ALL_PARAMS;
use regex::Regex;

/// Compiled selector for prunable parameter names.
#[derive(Debug, Clone)]
pub enum ParamSelector {
    /// Every parameter is prunable.
    All,
    /// Parameters whose name matches the pattern are prunable.
    Pattern(Regex),
}

impl ParamSelector {
    /// Compile a selector from its config string.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::PruneError::InvalidPattern`] when the
    /// string is neither `__ALL__` nor a valid regex.
    pub fn compile(source: &str) -> Result<Self> {
        if source == ALL_PARAMS {
            Ok(ParamSelector::All)
        } else {
            Ok(ParamSelector::Pattern(Regex::new(source)?))
        }
    }

    /// Whether a parameter name is selected.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ParamSelector::All => true,
            ParamSelector::Pattern(re) => re.is_match(name),
        }
    }
}
