//! 利益冲突声明扫描服务 - 业务能力层
//!
//! 只读取资助与利益冲突两个章节，用固定的正则判断声明属于哪一类，
//! 供编排层与综合记录中的 `has_conflict_of_interest` 对照。扫描结果只产生提示，不修改记录。

use regex::Regex;
use tracing::error;

use crate::models::advisory::DisclosureSignal;
use crate::models::section::SectionSet;

/// 明确披露资助或利益关联的表述
const TIE_PATTERNS: &[&str] = &[
    r"(?i)\b(funded|sponsored|supported)\s+(in\s+part\s+)?by\b",
    r"(?i)\b(consultant|consultancy|consulting fees|advisory board|speakers?\s+bureau|honorari(a|um))\b",
    r"(?i)\b(employee|employed)\s+(of|by)\b",
    r"(?i)\b(received|receives|receiving)\s+(research\s+)?(grants?|fees|funding|honorari(a|um)|support)\b",
    r"(?i)\b(owns?|holds?)\s+(stock|shares)\b",
];

/// 明确声明无冲突的表述
const NONE_PATTERNS: &[&str] = &[
    r"(?i)\b(no|none|nothing)\b[^.]{0,40}\b(conflicts?|competing|to disclose|financial)\b",
    r"(?i)\b(conflicts? of interest|competing interests?|disclosures?)\s*:?\s*(none|nil|n/a)\b",
    r"(?i)\bnot\s+(have\s+)?(any\s+)?(conflicts?|competing)\b",
    r"(?i)\breceived\s+no\s+(specific\s+|external\s+)?(funding|grant)\b",
];

/// 利益冲突声明扫描器
pub struct DisclosureScanner {
    ties: Vec<Regex>,
    none: Vec<Regex>,
}

impl DisclosureScanner {
    pub fn new() -> Self {
        Self {
            ties: compile_all(TIE_PATTERNS),
            none: compile_all(NONE_PATTERNS),
        }
    }

    /// 扫描章节集合
    ///
    /// 同时出现利益关联和"无冲突"声明时，以利益关联为准。
    pub fn scan(&self, sections: &SectionSet) -> DisclosureSignal {
        let statements: Vec<&str> = [
            sections.funding.as_deref(),
            sections.conflicts_of_interest.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if statements.is_empty() {
            return DisclosureSignal::NotReported;
        }

        let any_match = |patterns: &[Regex]| {
            statements
                .iter()
                .any(|text| patterns.iter().any(|re| re.is_match(text)))
        };

        if any_match(self.ties.as_slice()) {
            DisclosureSignal::IndustryTies
        } else if any_match(self.none.as_slice()) {
            DisclosureSignal::NoConflicts
        } else {
            DisclosureSignal::Ambiguous
        }
    }
}

impl Default for DisclosureScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                error!("披露模式 '{}' 无法编译: {}", p, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(funding: Option<&str>, coi: Option<&str>) -> DisclosureSignal {
        let sections = SectionSet {
            funding: funding.map(str::to_string),
            conflicts_of_interest: coi.map(str::to_string),
            ..Default::default()
        };
        DisclosureScanner::new().scan(&sections)
    }

    #[test]
    fn test_patterns_compile() {
        let scanner = DisclosureScanner::new();
        assert_eq!(scanner.ties.len(), TIE_PATTERNS.len());
        assert_eq!(scanner.none.len(), NONE_PATTERNS.len());
    }

    #[test]
    fn test_industry_funding_is_tie() {
        assert_eq!(
            scan(Some("Funding: This study was funded by the Egg Nutrition Center."), None),
            DisclosureSignal::IndustryTies
        );
        assert_eq!(
            scan(None, Some("Conflict of interest: J.D. is a consultant for Acme Foods.")),
            DisclosureSignal::IndustryTies
        );
    }

    #[test]
    fn test_explicit_none() {
        assert_eq!(
            scan(None, Some("Conflict of interest: none.")),
            DisclosureSignal::NoConflicts
        );
        assert_eq!(
            scan(None, Some("Competing interests The authors declare no competing interests.")),
            DisclosureSignal::NoConflicts
        );
    }

    #[test]
    fn test_negated_funding_is_not_a_tie() {
        assert_eq!(
            scan(Some("Funding: this research received no specific funding."), None),
            DisclosureSignal::NoConflicts
        );
    }

    #[test]
    fn test_ties_win_over_none() {
        assert_eq!(
            scan(
                Some("Funding: supported by the Dairy Council."),
                Some("Disclosure: the authors declare no conflicts of interest.")
            ),
            DisclosureSignal::IndustryTies
        );
    }

    #[test]
    fn test_absent_and_ambiguous() {
        assert_eq!(scan(None, None), DisclosureSignal::NotReported);
        assert_eq!(
            scan(Some("Funding details are available on request."), None),
            DisclosureSignal::Ambiguous
        );
    }

    #[test]
    fn test_contradicts() {
        assert!(DisclosureSignal::IndustryTies.contradicts(Some(false)));
        assert!(DisclosureSignal::IndustryTies.contradicts(None));
        assert!(!DisclosureSignal::IndustryTies.contradicts(Some(true)));
        assert!(DisclosureSignal::NoConflicts.contradicts(Some(true)));
        assert!(DisclosureSignal::NotReported.contradicts(Some(false)));
        assert!(!DisclosureSignal::NotReported.contradicts(None));
        assert!(!DisclosureSignal::Ambiguous.contradicts(Some(true)));
    }
}
