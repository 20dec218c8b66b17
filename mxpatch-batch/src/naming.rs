//! Output naming for a batch: ordinal templates, auto names, run state.
//!
//! With a template such as `V1000_006`, created outputs are named
//! `V1000_006`, `V1000_007`, … with no gaps: only a `Created` item moves the
//! counter. Without a template each item gets an auto name.

use serde::Serialize;

use mxpatch_core::{EnvironmentName, WorkItem};

use crate::error::BatchError;

/// Suffix of the inverse diff's output name.
pub const UNDO_SUFFIX: &str = "-undo";

/// `<resource>-<SRC>to<DST>`
pub fn screen_auto_name(resource: &str, source: &EnvironmentName, dest: &EnvironmentName) -> String {
    format!("{resource}-{source}to{dest}")
}

pub fn undo_name(name: &str) -> String {
    format!("{name}{UNDO_SUFFIX}")
}

// ---------------------------------------------------------------------------
// OrdinalTemplate
// ---------------------------------------------------------------------------

/// A base name plus zero-padded ordinal, split at the last `_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalTemplate {
    pub base: String,
    pub start: u64,
    pub width: usize,
}

impl OrdinalTemplate {
    pub fn parse(template: &str) -> Result<Self, BatchError> {
        let invalid = |reason: &str| BatchError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };
        let (head, digits) = template
            .rsplit_once('_')
            .ok_or_else(|| invalid("expected <base>_<ordinal>"))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("ordinal segment is not numeric"));
        }
        let start = digits
            .parse::<u64>()
            .map_err(|_| invalid("ordinal segment is out of range"))?;
        Ok(Self {
            base: format!("{head}_"),
            start,
            width: digits.len(),
        })
    }

    /// Name for `ordinal`; wider ordinals are not truncated.
    pub fn format(&self, ordinal: u64) -> String {
        format!("{}{:0width$}", self.base, ordinal, width = self.width)
    }
}

// ---------------------------------------------------------------------------
// NameScheme / BatchRunState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameScheme {
    Ordinal(OrdinalTemplate),
    Auto,
}

impl NameScheme {
    /// `Ordinal` when a template is given, else `Auto`.
    pub fn from_start(start: Option<&str>) -> Result<Self, BatchError> {
        match start {
            Some(t) => Ok(NameScheme::Ordinal(OrdinalTemplate::parse(t)?)),
            None => Ok(NameScheme::Auto),
        }
    }
}

/// How an item's output name was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NameSource {
    Ordinal,
    Auto,
    Explicit,
}

/// Counter and skip list for one run, owned by the orchestrator loop.
#[derive(Debug, Clone)]
pub struct BatchRunState {
    scheme: NameScheme,
    next: u64,
    skipped: Vec<String>,
}

impl BatchRunState {
    pub fn new(scheme: NameScheme) -> Self {
        let next = match &scheme {
            NameScheme::Ordinal(t) => t.start,
            NameScheme::Auto => 0,
        };
        Self {
            scheme,
            next,
            skipped: Vec::new(),
        }
    }

    /// Output name for `item`. An explicit name on the item wins.
    pub fn name_for(&self, item: &WorkItem, auto: impl FnOnce() -> String) -> (String, NameSource) {
        if let Some(explicit) = &item.output {
            return (explicit.clone(), NameSource::Explicit);
        }
        match &self.scheme {
            NameScheme::Ordinal(t) => (t.format(self.next), NameSource::Ordinal),
            NameScheme::Auto => (auto(), NameSource::Auto),
        }
    }

    /// Record a created output; only ordinal names consume an ordinal.
    pub fn advance(&mut self, source: &NameSource) {
        if *source == NameSource::Ordinal {
            self.next += 1;
        }
    }

    pub fn record_skip(&mut self, resource: &str) {
        self.skipped.push(resource.to_string());
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("V1000_006", "V1000_", 6, 3)]
    #[case("V7501_00", "V7501_", 0, 2)]
    #[case("A_B_12", "A_B_", 12, 2)]
    #[case("_1", "_", 1, 1)]
    fn parse_valid(
        #[case] input: &str,
        #[case] base: &str,
        #[case] start: u64,
        #[case] width: usize,
    ) {
        let t = OrdinalTemplate::parse(input).unwrap();
        assert_eq!(t.base, base);
        assert_eq!(t.start, start);
        assert_eq!(t.width, width);
    }

    #[rstest]
    #[case("V1000")]
    #[case("V1000_")]
    #[case("V1000_00a")]
    #[case("V1000_-1")]
    #[case("V1000_99999999999999999999999")]
    fn parse_invalid(#[case] input: &str) {
        let err = OrdinalTemplate::parse(input).unwrap_err();
        assert!(matches!(err, BatchError::InvalidTemplate { .. }));
        assert!(err.to_string().contains(input));
    }

    #[test]
    fn format_pads_and_overflows_width() {
        let t = OrdinalTemplate::parse("V1000_098").unwrap();
        assert_eq!(t.format(98), "V1000_098");
        assert_eq!(t.format(1000), "V1000_1000");
    }

    #[test]
    fn auto_screen_name() {
        assert_eq!(
            screen_auto_name(
                "Inventory",
                &EnvironmentName::from("DEV"),
                &EnvironmentName::from("TEST")
            ),
            "Inventory-DEVtoTEST"
        );
        assert_eq!(undo_name("Inventory-DEVtoTEST"), "Inventory-DEVtoTEST-undo");
    }

    #[test]
    fn only_ordinal_names_advance() {
        let mut state =
            BatchRunState::new(NameScheme::from_start(Some("V1000_006")).unwrap());
        let plain = WorkItem::named("ASSET");
        let named = WorkItem::named("ITEM").with_output(Some("ITEM-fix".to_string()));

        let (n, src) = state.name_for(&plain, || unreachable!());
        assert_eq!(n, "V1000_006");
        state.advance(&src);

        let (n, src) = state.name_for(&named, || unreachable!());
        assert_eq!((n.as_str(), &src), ("ITEM-fix", &NameSource::Explicit));
        state.advance(&src);

        assert_eq!(state.name_for(&plain, || unreachable!()).0, "V1000_007");
    }

    #[test]
    fn auto_scheme_uses_callback() {
        let state = BatchRunState::new(NameScheme::Auto);
        let (n, src) = state.name_for(&WorkItem::named("ASSET"), || "ASSET".to_string());
        assert_eq!(n, "ASSET");
        assert_eq!(src, NameSource::Auto);
    }
}
