//! Moving-average break test: close above all (or any) configured MAs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whether the target close must stand above every MA or at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaBreakMode {
    All,
    Any,
}

/// Test the target close against a set of MA values keyed by integer period.
///
/// Callers must only pass defined values; the pipeline's completeness stage
/// rejects instruments with an undefined MA before this runs, classifying
/// them as an insufficient window rather than a false break.
pub fn ma_break(target_close: f64, ma_values: &BTreeMap<usize, f64>, mode: MaBreakMode) -> bool {
    match mode {
        MaBreakMode::All => ma_values.values().all(|&ma| target_close > ma),
        MaBreakMode::Any => ma_values.values().any(|&ma| target_close > ma),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ma_set(values: &[(usize, f64)]) -> BTreeMap<usize, f64> {
        values.iter().copied().collect()
    }

    #[test]
    fn all_mode_requires_every_ma_below_close() {
        let mas = ma_set(&[(5, 10.02), (10, 10.01), (20, 10.00)]);
        assert!(ma_break(10.10, &mas, MaBreakMode::All));
        assert!(!ma_break(10.01, &mas, MaBreakMode::All));
    }

    #[test]
    fn any_mode_requires_one_ma_below_close() {
        let mas = ma_set(&[(5, 10.20), (10, 10.05), (20, 9.90)]);
        assert!(ma_break(10.00, &mas, MaBreakMode::Any));
        assert!(!ma_break(9.80, &mas, MaBreakMode::Any));
    }

    #[test]
    fn close_equal_to_ma_does_not_break() {
        let mas = ma_set(&[(5, 10.00)]);
        assert!(!ma_break(10.00, &mas, MaBreakMode::All));
        assert!(!ma_break(10.00, &mas, MaBreakMode::Any));
    }

    #[test]
    fn empty_ma_set_all_is_vacuous_any_is_false() {
        let mas = ma_set(&[]);
        // Config validation rejects an empty period list; this documents the
        // underlying predicate semantics all the same.
        assert!(ma_break(10.0, &mas, MaBreakMode::All));
        assert!(!ma_break(10.0, &mas, MaBreakMode::Any));
    }

    #[test]
    fn mode_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&MaBreakMode::All).unwrap(), "\"all\"");
        let mode: MaBreakMode = serde_json::from_str("\"any\"").unwrap();
        assert_eq!(mode, MaBreakMode::Any);
    }
}
