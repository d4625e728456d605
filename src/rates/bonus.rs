//! Classification bonus rules shared by every rate source
//!
//! Whatever supplies the per-classification bonus (a rate matrix or the
//! standard table), the same policy applies: duplicates are dropped keeping
//! first occurrence, at most two classifications count, the sum is capped at
//! 2.00 percentage points and rounded half-up to 2 decimals.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Ceiling on the summed additional rate, in percentage points
pub const MAX_ADDITIONAL_RATE: Decimal = Decimal::from_parts(200, 0, 0, false, 2);

/// Number of distinct classifications considered per deposit
pub const MAX_CLASSIFICATIONS: usize = 2;

/// Deduplicate preserving first occurrence, then keep the first two
pub fn select_classifications<S: AsRef<str>>(classifications: &[S]) -> Vec<&str> {
    let mut selected: Vec<&str> = Vec::with_capacity(MAX_CLASSIFICATIONS);
    for label in classifications.iter().map(AsRef::as_ref) {
        if selected.len() == MAX_CLASSIFICATIONS {
            break;
        }
        if !selected.contains(&label) {
            selected.push(label);
        }
    }
    selected
}

/// Clamp a summed bonus to the cap and round to 2 decimals
pub fn capped_additional_rate(total: Decimal) -> Decimal {
    let capped = if total > MAX_ADDITIONAL_RATE {
        log::info!(
            "Total additional rate {}% exceeds {}% cap, applying cap",
            total,
            MAX_ADDITIONAL_RATE
        );
        MAX_ADDITIONAL_RATE
    } else {
        total
    };
    capped.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed classification-to-bonus table used for manually rated deposits
///
/// Lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct ClassificationBonusTable {
    bonuses: HashMap<String, Decimal>,
}

impl ClassificationBonusTable {
    /// The bank-wide customer category and loyalty tier bonuses
    pub fn standard() -> Self {
        let mut bonuses = HashMap::new();
        bonuses.insert("SENIOR_CITIZEN".to_string(), dec!(1.00));
        bonuses.insert("EMPLOYEE".to_string(), dec!(1.50));
        bonuses.insert("SILVER".to_string(), dec!(0.50));
        bonuses.insert("GOLD".to_string(), dec!(1.00));
        bonuses.insert("PLATINUM".to_string(), dec!(1.50));
        bonuses.insert("PREMIUM".to_string(), dec!(0.75));
        Self { bonuses }
    }

    /// Build a table from explicit entries
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let bonuses = entries
            .into_iter()
            .map(|(label, rate)| (label.as_ref().to_ascii_uppercase(), rate))
            .collect();
        Self { bonuses }
    }

    pub fn bonus_for(&self, classification: &str) -> Option<Decimal> {
        self.bonuses.get(&classification.trim().to_ascii_uppercase()).copied()
    }

    /// Labels that count towards the bonus, normalized to upper case
    pub fn applied_classifications<S: AsRef<str>>(&self, classifications: &[S]) -> Vec<String> {
        let normalized: Vec<String> = classifications
            .iter()
            .map(|c| c.as_ref().trim().to_ascii_uppercase())
            .collect();
        select_classifications(&normalized)
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Capped, rounded bonus for a customer's classification list
    pub fn additional_rate<S: AsRef<str>>(&self, classifications: &[S]) -> Decimal {
        let mut total = Decimal::ZERO;
        for label in self.applied_classifications(classifications) {
            match self.bonus_for(&label) {
                Some(rate) => {
                    log::debug!("Added {}% for classification: {}", rate, label);
                    total += rate;
                }
                None => log::warn!("Unknown classification: {}", label),
            }
        }
        capped_additional_rate(total)
    }
}

impl Default for ClassificationBonusTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_dedupes_then_truncates() {
        assert_eq!(select_classifications(&["GOLD", "GOLD", "SILVER"]), vec!["GOLD", "SILVER"]);
        assert_eq!(
            select_classifications(&["A", "B", "C", "A"]),
            vec!["A", "B"]
        );
        assert!(select_classifications::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_cap_and_rounding() {
        assert_eq!(capped_additional_rate(dec!(2.50)), dec!(2.00));
        assert_eq!(capped_additional_rate(dec!(2.00)), dec!(2.00));
        assert_eq!(capped_additional_rate(dec!(1.005)), dec!(1.01));
        assert_eq!(capped_additional_rate(dec!(0.125)), dec!(0.13));
        assert_eq!(capped_additional_rate(Decimal::ZERO), dec!(0.00));
    }

    #[test]
    fn test_standard_table() {
        let table = ClassificationBonusTable::standard();
        assert_eq!(table.bonus_for("senior_citizen"), Some(dec!(1.00)));
        assert_eq!(table.bonus_for("PREMIUM"), Some(dec!(0.75)));
        assert_eq!(table.bonus_for("DIAMOND"), None);

        assert_eq!(table.additional_rate(&["GOLD", "SILVER"]), dec!(1.50));
        // EMPLOYEE + PLATINUM = 3.00, capped
        assert_eq!(table.additional_rate(&["EMPLOYEE", "PLATINUM"]), dec!(2.00));
        // third classification ignored
        assert_eq!(table.additional_rate(&["SILVER", "PREMIUM", "EMPLOYEE"]), dec!(1.25));
        // unknown contributes zero
        assert_eq!(table.additional_rate(&["DIAMOND", "GOLD"]), dec!(1.00));
    }

    #[test]
    fn test_duplicates_never_double_count() {
        let table = ClassificationBonusTable::standard();
        assert_eq!(table.additional_rate(&["GOLD", "GOLD"]), dec!(1.00));
        assert_eq!(table.additional_rate(&["GOLD", "GOLD", "SILVER"]), dec!(1.50));
        // case variants are the same classification
        assert_eq!(table.additional_rate(&["gold", "GOLD", " Gold "]), dec!(1.00));
        assert_eq!(
            table.applied_classifications(&["gold", "GOLD", "silver"]),
            vec!["GOLD".to_string(), "SILVER".to_string()]
        );
    }

    #[test]
    fn test_cap_holds_for_every_pair() {
        let table = ClassificationBonusTable::standard();
        let labels = ["SENIOR_CITIZEN", "EMPLOYEE", "SILVER", "GOLD", "PLATINUM", "PREMIUM"];
        for a in labels {
            for b in labels {
                assert!(table.additional_rate(&[a, b]) <= MAX_ADDITIONAL_RATE);
            }
        }
    }
}
