use crate::models::{CaseRecord, CaseStats, CaseStatus, StatusFilter};

pub fn visible_cases(cases: &[CaseRecord], query: &str, status: StatusFilter) -> Vec<CaseRecord> {
    let needle = query.to_lowercase();
    cases
        .iter()
        .filter(|case| matches_query(case, &needle) && status.matches(case.status))
        .cloned()
        .collect()
}

fn matches_query(case: &CaseRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    case.title.to_lowercase().contains(needle) || case.description.to_lowercase().contains(needle)
}

// Counts run over the unfiltered collection; Closed is tracked in the data
// model but has no summary card.
pub fn case_stats(cases: &[CaseRecord]) -> CaseStats {
    let count = |status: CaseStatus| cases.iter().filter(|case| case.status == status).count();
    CaseStats {
        total: cases.len(),
        pending: count(CaseStatus::Pending),
        processing: count(CaseStatus::Processing),
        completed: count(CaseStatus::Completed),
    }
}

#[cfg(test)]
mod tests {
    use super::{case_stats, visible_cases};
    use crate::models::{CaseRecord, CaseStatus, StatusFilter};
    use chrono::Utc;

    fn case(title: &str, description: &str, status: CaseStatus) -> CaseRecord {
        let now = Utc::now();
        CaseRecord {
            id: format!("case-{}", title),
            title: title.to_string(),
            description: description.to_string(),
            status,
            start_date: None,
            end_date: None,
            remark: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_collection() -> Vec<CaseRecord> {
        vec![
            case("Invoice #42", "missing payment", CaseStatus::Pending),
            case("Contract Review", "quarterly renewal", CaseStatus::Processing),
            case("Site Audit", "completed walkthrough", CaseStatus::Completed),
        ]
    }

    #[test]
    fn empty_query_and_all_filter_pass_everything_through() {
        let cases = sample_collection();
        let visible = visible_cases(&cases, "", StatusFilter::All);
        assert_eq!(visible, cases);
    }

    #[test]
    fn query_matches_title_or_description_case_insensitively() {
        let cases = sample_collection();

        let by_title = visible_cases(&cases, "invoice", StatusFilter::All);
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Invoice #42");

        let by_description = visible_cases(&cases, "RENEWAL", StatusFilter::All);
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].title, "Contract Review");

        assert!(visible_cases(&cases, "invoice", StatusFilter::All)
            .iter()
            .all(|case| case.title != "Contract Review"));
    }

    #[test]
    fn status_filter_combines_with_query_by_and() {
        let cases = sample_collection();

        let processing = visible_cases(&cases, "", StatusFilter::Only(CaseStatus::Processing));
        assert_eq!(processing.len(), 1);
        assert_eq!(processing[0].title, "Contract Review");

        let none = visible_cases(
            &cases,
            "invoice",
            StatusFilter::Only(CaseStatus::Processing),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn stats_count_per_status_over_the_full_collection() {
        let cases = sample_collection();
        let stats = case_stats(&cases);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.processing, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn closed_cases_count_toward_total_only() {
        let mut cases = sample_collection();
        cases.push(case("Old Matter", "wrapped up", CaseStatus::Closed));

        let stats = case_stats(&cases);
        assert_eq!(stats.total, 4);
        assert!(stats.pending + stats.processing + stats.completed < stats.total);
    }
}
