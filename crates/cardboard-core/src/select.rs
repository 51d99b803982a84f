//! Selecting which configured linters to run.

use tracing::debug;

use crate::config::ConfigError;
use crate::linter::LinterBox;

/// A linter paired with the user options it was configured with.
pub struct LinterEntry {
    /// The linter implementation.
    pub linter: LinterBox,
    /// User options, merged over the linter defaults at run time.
    pub options: toml::Table,
}

impl LinterEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(linter: LinterBox, options: toml::Table) -> Self {
        Self { linter, options }
    }

    /// Returns the linter name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.linter.name()
    }
}

impl std::fmt::Debug for LinterEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinterEntry")
            .field("linter", &self.linter.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Parses a part selector `N/M` into a zero-based offset and a step.
///
/// An empty selector means "everything": `(0, 1)`.
///
/// # Errors
///
/// Returns an error unless the selector holds exactly one `/` between two
/// integers with `1 <= N <= M`.
pub fn parse_part(part: &str) -> Result<(usize, usize), ConfigError> {
    if part.is_empty() {
        return Ok((0, 1));
    }
    let invalid = |message: String| ConfigError::InvalidPart {
        part: part.to_string(),
        message,
    };

    let (offset, step) = part
        .split_once('/')
        .filter(|(_, rest)| !rest.contains('/'))
        .ok_or_else(|| invalid("it should contain exactly one '/'".to_string()))?;
    let offset: usize = offset
        .trim()
        .parse()
        .map_err(|e| invalid(format!("bad offset: {e}")))?;
    let step: usize = step
        .trim()
        .parse()
        .map_err(|e| invalid(format!("bad step: {e}")))?;

    if offset < 1 || offset > step {
        return Err(invalid(format!("the first integer should be in the range [1, {step}]")));
    }
    Ok((offset - 1, step))
}

/// Tests a linter's flags against a list of flag requirements.
///
/// Each requirement names a flag that must be set, or `not <flag>` for a flag
/// that must be unset. Unknown flag names never match.
fn flags_match(entry: &LinterEntry, required: &[String]) -> bool {
    let flags = entry.linter.flags();
    required.iter().all(|req| {
        let req = req.trim();
        match req.strip_prefix("not ") {
            Some(name) => flags.get(name.trim()) == Some(false),
            None => flags.get(req) == Some(true),
        }
    })
}

/// Reduces the configured linters to the ones that should run.
///
/// 1. Keeps linters named in `selection` (all of them when it is empty).
/// 2. Keeps linters whose flags satisfy every entry of `required_flags`.
/// 3. Keeps part `N/M` of what remains: every `M`-th linter starting at `N`.
///
/// # Errors
///
/// Returns an error if `part` is malformed.
pub fn select_linters(
    entries: Vec<LinterEntry>,
    selection: &[String],
    required_flags: &[String],
    part: &str,
) -> Result<Vec<LinterEntry>, ConfigError> {
    let (offset, step) = parse_part(part)?;

    let selected: Vec<LinterEntry> = entries
        .into_iter()
        .filter(|e| selection.is_empty() || selection.iter().any(|s| s == e.name()))
        .filter(|e| flags_match(e, required_flags))
        .skip(offset)
        .step_by(step)
        .collect();

    debug!(
        "Selected linters: {:?}",
        selected.iter().map(LinterEntry::name).collect::<Vec<_>>()
    );
    Ok(selected)
}
