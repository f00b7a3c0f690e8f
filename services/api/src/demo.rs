use crate::infra::{parse_date, Backend, InMemoryNotificationPublisher};
use chrono::{NaiveDate, Utc};
use clap::Args;
use std::sync::Arc;
use talent_ats::error::AppError;
use talent_ats::workflows::intake::{
    ApplicationRequest, ApplicationService, ApplicationWizard, EducationEntry, EntryId,
    ExperienceEntry, PersonalDetails, RefereeEntry, ShortCourseEntry, StepData, StepErrors,
    StepId,
};
use talent_ats::workflows::jobs::{Job, JobFilter, JobRepository};
use talent_ats::workflows::report::DashboardService;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Apply to the first open job whose title contains this text (defaults to a featured job)
    #[arg(long)]
    pub(crate) job: Option<String>,
    /// Reference date for the experience total and dashboard (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the stored application status as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// Stop after the intake steps without submitting
    #[arg(long)]
    pub(crate) skip_submit: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        job,
        today,
        json,
        skip_submit,
    } = args;

    let now = Utc::now();
    let today = today.unwrap_or_else(|| now.date_naive());
    let backend = Backend::in_memory(true, now);
    let notifications = Arc::new(InMemoryNotificationPublisher::default());
    let service = ApplicationService::new(
        backend.applications.clone(),
        backend.jobs.clone(),
        notifications.clone(),
    );

    println!("Recruitment intake demo");
    let filter = JobFilter {
        search: job.clone(),
        open_on: Some(now.date_naive()),
        ..JobFilter::default()
    };
    let candidates = backend.jobs.list(&filter).await?;
    let Some(target) = pick_job(candidates, job.is_some()) else {
        println!("  No open job matches {:?}", job.unwrap_or_default());
        return Ok(());
    };
    println!(
        "- Applying for {} at {} ({}, {})",
        target.title,
        target.company,
        target.location,
        target.job_type.label()
    );

    let mut wizard = ApplicationWizard::new(Some(target.id.clone()));
    let incomplete = PersonalDetails {
        email: String::new(),
        ..sample_personal()
    };
    if let Err(errors) = wizard.complete_step(StepData::Personal(incomplete)) {
        println!("\nFirst attempt at the personal step was rejected:");
        render_errors(&errors);
    }

    println!("\nCompleting the form:");
    for data in sample_steps() {
        let step = data.step();
        let position = StepId::ordered()
            .iter()
            .position(|candidate| *candidate == step)
            .map_or(0, |index| index + 1);
        let declined = is_declined_section(&data);
        wizard.go_to(step);
        match wizard.complete_step(data) {
            Ok(_) if step.is_last() => {
                println!("  [{position}/7] {}: completed (ready to submit)", step.label());
            }
            Ok(next) => println!(
                "  [{position}/7] {}: {} -> {}",
                step.label(),
                if declined { "none" } else { "completed" },
                next.label()
            ),
            Err(errors) => {
                println!("  [{position}/7] {}: rejected", step.label());
                render_errors(&errors);
                return Ok(());
            }
        }
    }

    println!(
        "- Total experience as of {today}: {}",
        wizard.total_experience(today)
    );

    if skip_submit {
        return Ok(());
    }

    let request = ApplicationRequest {
        payload: wizard.draft().to_payload(),
        terms_accepted: true,
    };
    let record = match service.submit(request, now).await {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    let view = record.status_view();
    println!(
        "\n- Received application {} -> {}",
        view.application_id, view.status_label
    );
    if json {
        match serde_json::to_string_pretty(&view) {
            Ok(body) => println!("  Status payload:\n{body}"),
            Err(err) => println!("  Status payload unavailable: {err}"),
        }
    }

    let events = notifications.events();
    if events.is_empty() {
        println!("  Notifications: none sent");
    } else {
        println!("  Notifications:");
        for event in events {
            println!(
                "    - {} to {}: {}",
                event.template,
                event.recipients.join(", "),
                event.subject
            );
        }
    }

    let dashboard = DashboardService::new(backend.jobs.clone(), backend.applications.clone());
    let summary = dashboard.summary(today).await?;
    println!("\nDashboard snapshot");
    println!(
        "- {} jobs ({} open, {} featured) | {} applications",
        summary.jobs.total, summary.jobs.open, summary.jobs.featured, summary.total_applications
    );
    for entry in summary.pipeline.iter().filter(|entry| entry.count > 0) {
        println!("  - {}: {}", entry.status_label, entry.count);
    }
    println!(
        "- Average candidate experience: {}",
        summary.average_experience_label
    );

    Ok(())
}

fn pick_job(mut jobs: Vec<Job>, searched: bool) -> Option<Job> {
    if searched {
        return jobs.into_iter().next();
    }
    let featured = jobs.iter().position(|job| job.featured);
    match featured {
        Some(index) => Some(jobs.swap_remove(index)),
        None => jobs.into_iter().next(),
    }
}

fn is_declined_section(data: &StepData) -> bool {
    match data {
        StepData::ProfessionalBodies(entries) => entries.is_empty(),
        StepData::Publications(entries) => entries.is_empty(),
        _ => false,
    }
}

fn render_errors(errors: &StepErrors) {
    for (scope, fields) in errors.iter() {
        for (field, message) in fields.iter() {
            println!("    - {scope}.{field}: {message}");
        }
    }
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn sample_personal() -> PersonalDetails {
    PersonalDetails {
        first_name: "Achieng".to_string(),
        middle_name: None,
        last_name: "Odhiambo".to_string(),
        address: "P.O. Box 190-40100, Kisumu".to_string(),
        gender: "female".to_string(),
        email: "achieng.odhiambo@example.com".to_string(),
        phone: "+254722000111".to_string(),
        date_of_birth: date(1993, 4, 9),
        ethnicity: "Luo".to_string(),
        home_country: "Kenya".to_string(),
        disability: "no".to_string(),
    }
}

fn sample_steps() -> Vec<StepData> {
    vec![
        StepData::Personal(sample_personal()),
        StepData::Education(vec![EducationEntry {
            id: EntryId::default(),
            level: "Bachelor's Degree".to_string(),
            institution: "Maseno University".to_string(),
            field_of_study: Some("Computer Science".to_string()),
            graduation_date: date(2015, 11, 27),
            certificate_ref: None,
        }]),
        StepData::Experience(vec![
            ExperienceEntry {
                id: EntryId::default(),
                organization: "Kisumu County Government".to_string(),
                designation: "ICT Officer".to_string(),
                job_group: "J".to_string(),
                start_date: date(2016, 2, 1),
                end_date: date(2020, 6, 30),
            },
            ExperienceEntry {
                id: EntryId::default(),
                organization: "Equity Bank".to_string(),
                designation: "Software Engineer".to_string(),
                job_group: "L".to_string(),
                start_date: date(2020, 8, 1),
                end_date: None,
            },
        ]),
        StepData::ShortCourses(vec![ShortCourseEntry {
            id: EntryId::default(),
            course_name: "Cloud Practitioner".to_string(),
            completion_date: date(2022, 3, 18),
            certificate_ref: None,
        }]),
        StepData::ProfessionalBodies(Vec::new()),
        StepData::Publications(Vec::new()),
        StepData::Referees(vec![
            RefereeEntry {
                id: EntryId::default(),
                name: "Dr. Otieno Were".to_string(),
                designation: "Senior Lecturer".to_string(),
                organization: "Maseno University".to_string(),
                mobile: "+254733000222".to_string(),
                email: "o.were@example.ac.ke".to_string(),
            },
            RefereeEntry {
                id: EntryId::default(),
                name: "Grace Mutua".to_string(),
                designation: "Head of Engineering".to_string(),
                organization: "Equity Bank".to_string(),
                mobile: "+254711000333".to_string(),
                email: "grace.mutua@example.com".to_string(),
            },
        ]),
    ]
}
