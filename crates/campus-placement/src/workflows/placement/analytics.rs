use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::application::{ApplicationRecord, ApplicationSummaryView};
use super::domain::{Company, CompanyId, CompanyStatus, StudentRecord};
use super::selection::OverallStatus;

const RECENT_APPLICATIONS: usize = 10;
const UPCOMING_VISITS: usize = 5;

/// Offered salary spread for one overall status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub status: OverallStatus,
    pub count: usize,
    pub avg_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub min_salary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryBreakdown {
    pub industry: String,
    pub companies: usize,
    pub total_offers: usize,
    pub avg_package: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementStats {
    pub total_students: usize,
    pub placed_students: usize,
    pub placement_percentage: f64,
    pub application_stats: Vec<StatusBreakdown>,
    pub company_stats: Vec<IndustryBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingVisit {
    pub company_id: CompanyId,
    pub name: String,
    pub industry: String,
    pub visit_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementDashboard {
    pub total_companies: usize,
    pub active_companies: usize,
    pub total_applications: usize,
    pub selected_applications: usize,
    pub total_students: usize,
    pub placement_percentage: f64,
    pub recent_applications: Vec<ApplicationSummaryView>,
    pub upcoming_visits: Vec<UpcomingVisit>,
}

pub(crate) fn placement_stats(
    companies: &[Company],
    applications: &[ApplicationRecord],
    students: &[StudentRecord],
) -> PlacementStats {
    let placed = placed_count(applications);

    let application_stats = OverallStatus::ordered()
        .into_iter()
        .filter_map(|status| {
            let matching: Vec<&ApplicationRecord> = applications
                .iter()
                .filter(|record| record.overall_status == status)
                .collect();
            if matching.is_empty() {
                return None;
            }
            let salaries: Vec<f64> = matching
                .iter()
                .filter_map(|record| record.offer.as_ref().map(|offer| offer.salary.total))
                .collect();
            Some(StatusBreakdown {
                status,
                count: matching.len(),
                avg_salary: average(&salaries),
                max_salary: salaries.iter().copied().reduce(f64::max),
                min_salary: salaries.iter().copied().reduce(f64::min),
            })
        })
        .collect();

    let mut offers_by_company: HashMap<&CompanyId, Vec<f64>> = HashMap::new();
    for record in applications {
        if let Some(offer) = &record.offer {
            offers_by_company
                .entry(&record.company_id)
                .or_default()
                .push(offer.salary.total);
        }
    }

    let mut industries: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
    for company in companies.iter().filter(|company| company.is_active) {
        let entry = industries.entry(company.industry.as_str()).or_default();
        entry.0 += 1;
        if let Some(offers) = offers_by_company.get(&company.id) {
            entry.1.extend(offers);
        }
    }
    let company_stats = industries
        .into_iter()
        .map(|(industry, (companies, offers))| IndustryBreakdown {
            industry: industry.to_string(),
            companies,
            total_offers: offers.len(),
            avg_package: average(&offers),
        })
        .collect();

    PlacementStats {
        total_students: students.len(),
        placed_students: placed,
        placement_percentage: placement_percentage(placed, students.len()),
        application_stats,
        company_stats,
    }
}

pub(crate) fn placement_dashboard(
    companies: &[Company],
    applications: &[ApplicationRecord],
    students: &[StudentRecord],
    today: NaiveDate,
) -> PlacementDashboard {
    let mut recent: Vec<&ApplicationRecord> = applications.iter().collect();
    recent.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.cmp(&a.id)));

    let mut upcoming: Vec<UpcomingVisit> = companies
        .iter()
        .filter(|company| company.is_active && company.status == CompanyStatus::Active)
        .filter_map(|company| {
            let visit_date = company.visit.visit_date.filter(|date| *date >= today)?;
            Some(UpcomingVisit {
                company_id: company.id.clone(),
                name: company.name.clone(),
                industry: company.industry.clone(),
                visit_date,
            })
        })
        .collect();
    upcoming.sort_by(|a, b| a.visit_date.cmp(&b.visit_date).then(a.name.cmp(&b.name)));
    upcoming.truncate(UPCOMING_VISITS);

    let placed = placed_count(applications);

    PlacementDashboard {
        total_companies: companies.iter().filter(|company| company.is_active).count(),
        active_companies: companies
            .iter()
            .filter(|company| company.accepts_applications())
            .count(),
        total_applications: applications.len(),
        selected_applications: applications
            .iter()
            .filter(|record| record.overall_status == OverallStatus::Selected)
            .count(),
        total_students: students.len(),
        placement_percentage: placement_percentage(placed, students.len()),
        recent_applications: recent
            .into_iter()
            .take(RECENT_APPLICATIONS)
            .map(ApplicationRecord::summary_view)
            .collect(),
        upcoming_visits: upcoming,
    }
}

fn placed_count(applications: &[ApplicationRecord]) -> usize {
    applications
        .iter()
        .filter(|record| record.is_placed())
        .count()
}

/// Percentage rounded to two decimals; zero when there are no students.
pub fn placement_percentage(placed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = placed as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}
