use crate::cli::parse_tenant;
use crate::infra::{load_store, parse_date};
use campus_placement::config::PlacementConfig;
use campus_placement::error::AppError;
use campus_placement::workflows::placement::{
    ApplicationRequest, Company, ContactDetails, CourseId, EligibilityCriteria,
    InMemoryPlacementStore, NewCompany, NewJobRole, OfferTerms, PlacementService, RoundStatus,
    RoundType, RoundUpdate, SalaryInput, StudentDetailsInput, StudentDirectory, StudentId,
    StudentRecord, TenantScope, VisitDetails,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

type DemoService = PlacementService<InMemoryPlacementStore, InMemoryPlacementStore>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Student roster CSV. Defaults to a built-in sample cohort.
    #[arg(long)]
    pub(crate) students: Option<PathBuf>,
    /// Tenant used for every record in the demo.
    #[arg(long, value_parser = parse_tenant)]
    pub(crate) tenant: Option<TenantScope>,
    /// Reporting date for the dashboard (defaults to today).
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Apply department and graduation-year rules at submission time.
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        students,
        tenant,
        today,
        strict,
    } = args;

    // Deadlines and joining dates are checked against the clock, not the reporting date.
    let now = Local::now().date_naive();
    let today = today.unwrap_or(now);
    let scope = match tenant {
        Some(scope) => scope,
        None => TenantScope::new("demo-campus").map_err(|err| {
            AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, err))
        })?,
    };

    let store = match students.as_deref() {
        Some(path) => load_store(Some((path, &scope)))?,
        None => {
            let store = load_store(None)?;
            store.seed_students(&scope, sample_cohort())?;
            store
        }
    };
    let mut roster = store.active_students(&scope)?;
    roster.sort_by(|a, b| a.id.cmp(&b.id));

    let service = Arc::new(PlacementService::new(
        store.clone(),
        store,
        PlacementConfig {
            strict_eligibility: strict,
            ..PlacementConfig::default()
        },
    ));

    println!("Campus placement demo");
    println!(
        "Tenant {} | {} active students | evaluated {}",
        scope.tenant(),
        roster.len(),
        today
    );

    let company = match service.create_company(&scope, demo_company(now)) {
        Ok(company) => company,
        Err(err) => {
            println!("  Company registration failed: {}", err);
            return Ok(());
        }
    };
    println!(
        "\nRegistered {} ({}) with cap {}",
        company.name,
        company.industry,
        company
            .visit
            .max_applications
            .map_or_else(|| "none".to_string(), |max| max.to_string())
    );

    println!("\nSubmissions");
    let mut accepted = Vec::new();
    for student in &roster {
        match service.apply(&scope, &student.id, demo_request(&company)) {
            Ok(record) => {
                println!(
                    "- {} (GPA {:.1}) -> {} as {}",
                    student.name,
                    student.gpa,
                    record.overall_status.label(),
                    record.id.0
                );
                accepted.push(record);
            }
            Err(err) => println!("- {} (GPA {:.1}) refused: {}", student.name, student.gpa, err),
        }
    }

    let Some(first) = accepted.first() else {
        println!("\nNo applications accepted; nothing further to demonstrate");
        return Ok(());
    };

    run_selection(&service, &scope, &company, first.student_id.clone(), &first.id, now);

    if let Some(second) = accepted.get(1) {
        let rejected = service.record_round(
            &scope,
            &second.id,
            RoundUpdate::new("Aptitude", RoundStatus::Rejected),
        );
        if let Ok(record) = rejected {
            println!(
                "\n{} rejected in Aptitude -> {}",
                record.student.name,
                record.overall_status.label()
            );
        }
    }

    render_dashboard(&service, &scope, today);
    Ok(())
}

fn run_selection(
    service: &DemoService,
    scope: &TenantScope,
    company: &Company,
    student_id: StudentId,
    application_id: &campus_placement::workflows::placement::ApplicationId,
    today: NaiveDate,
) {
    println!("\nSelection rounds for {}", application_id.0);
    for (name, round_type) in [
        ("Aptitude", RoundType::Aptitude),
        ("Technical", RoundType::Technical),
        ("HR", RoundType::Hr),
    ] {
        let mut update = RoundUpdate::new(name, RoundStatus::Cleared);
        update.round_type = Some(round_type);
        update.score = Some(80.0);
        match service.record_round(scope, application_id, update) {
            Ok(record) => println!(
                "- {} cleared -> overall {}",
                name,
                record.overall_status.label()
            ),
            Err(err) => {
                println!("- {} could not be recorded: {}", name, err);
                return;
            }
        }
    }

    let package = company
        .job_roles
        .first()
        .and_then(|role| role.package)
        .unwrap_or(900_000.0);
    let terms = OfferTerms {
        salary: SalaryInput::Breakdown {
            base: package,
            variable: package / 10.0,
        },
        joining_date: today + Duration::days(75),
        location: Some("Hyderabad".to_string()),
        designation: "Associate Software Engineer".to_string(),
    };
    match service.create_offer(scope, application_id, terms) {
        Ok(record) => {
            if let Some(offer) = &record.offer {
                println!(
                    "\nOffer issued: {} | total {} | joining {}",
                    offer.designation, offer.salary.total, offer.joining_date
                );
            }
        }
        Err(err) => {
            println!("\nOffer could not be issued: {}", err);
            return;
        }
    }

    match service.accept_offer(scope, application_id, &student_id) {
        Ok(record) => println!(
            "Offer accepted by {} -> placed: {}",
            record.student.name,
            record.is_placed()
        ),
        Err(err) => println!("Offer acceptance failed: {}", err),
    }
}

fn render_dashboard(service: &DemoService, scope: &TenantScope, today: NaiveDate) {
    let dashboard = match service.dashboard(scope, today) {
        Ok(dashboard) => dashboard,
        Err(err) => {
            println!("\nDashboard unavailable: {}", err);
            return;
        }
    };

    println!("\nDashboard");
    println!(
        "- {} companies ({} accepting) | {} applications | {} selected",
        dashboard.total_companies,
        dashboard.active_companies,
        dashboard.total_applications,
        dashboard.selected_applications
    );
    println!(
        "- {} students | placement rate {:.2}%",
        dashboard.total_students, dashboard.placement_percentage
    );
    for visit in &dashboard.upcoming_visits {
        println!("- Upcoming visit: {} on {}", visit.name, visit.visit_date);
    }

    match serde_json::to_string_pretty(&dashboard.recent_applications) {
        Ok(json) => println!("\nRecent applications payload:\n{}", json),
        Err(err) => println!("\nRecent applications payload unavailable: {}", err),
    }
}

fn demo_company(today: NaiveDate) -> NewCompany {
    NewCompany {
        name: "Helios Software".to_string(),
        company_type: "Product".to_string(),
        industry: "Software".to_string(),
        company_size: Some("500-1000".to_string()),
        contact: ContactDetails {
            hr_name: Some("Campus Relations".to_string()),
            hr_email: "campus@helios.example".to_string(),
            phone: None,
        },
        job_roles: vec![NewJobRole {
            title: "Associate Software Engineer".to_string(),
            description: Some("Platform and tooling teams".to_string()),
            openings: Some(3),
            package: Some(1_100_000.0),
        }],
        eligibility: EligibilityCriteria {
            minimum_gpa: Some(7.0),
            max_backlogs: Some(0),
            allowed_courses: [CourseId("btech".to_string())].into_iter().collect(),
            ..EligibilityCriteria::default()
        },
        visit: VisitDetails {
            visit_date: Some(today + Duration::days(10)),
            registration_deadline: Some(today + Duration::days(5)),
            rounds: vec![
                "Aptitude".to_string(),
                "Technical".to_string(),
                "HR".to_string(),
            ],
            max_applications: Some(3),
            current_applications: 0,
        },
    }
}

fn demo_request(company: &Company) -> ApplicationRequest {
    ApplicationRequest {
        company_id: company.id.0.clone(),
        job_role_id: company
            .job_roles
            .first()
            .map(|role| role.id.0.clone())
            .unwrap_or_default(),
        student_details: StudentDetailsInput {
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            resume: Some("resume.pdf".to_string()),
            portfolio_url: None,
        },
    }
}

fn sample_cohort() -> Vec<StudentRecord> {
    [
        ("stu-001", "Ananya Rao", "cse", 8.7, 0),
        ("stu-002", "Dev Malhotra", "ece", 7.4, 0),
        ("stu-003", "Farah Khan", "cse", 6.8, 0),
        ("stu-004", "Ishaan Gupta", "mech", 8.1, 1),
        ("stu-005", "Nisha Verma", "cse", 9.2, 0),
    ]
    .into_iter()
    .map(|(id, name, department, gpa, backlogs)| StudentRecord {
        id: StudentId(id.to_string()),
        name: name.to_string(),
        email: format!("{id}@campus.example"),
        phone: None,
        course_id: CourseId("btech".to_string()),
        department_id: campus_placement::workflows::placement::DepartmentId(
            department.to_string(),
        ),
        current_semester: Some(8),
        graduation_year: Some(2026),
        gpa,
        backlogs: (0..backlogs).map(|n| format!("Backlog {}", n + 1)).collect(),
        is_active: true,
    })
    .collect()
}
