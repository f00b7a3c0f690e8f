use std::collections::HashMap;

use chrono::NaiveDate;

use super::views::{DashboardSummary, JobApplicationsEntry, JobCounts, PipelineEntry};
use crate::workflows::intake::{ApplicationRecord, ApplicationStatus, TotalExperience};
use crate::workflows::jobs::{Job, JobId};

const RECENT_LIMIT: usize = 5;

/// Dashboard statistics over one snapshot of jobs and applications.
#[derive(Debug, Default)]
pub struct DashboardReport {
    jobs: JobCounts,
    pipeline: HashMap<ApplicationStatus, usize>,
    per_job: HashMap<JobId, usize>,
    titles: HashMap<JobId, String>,
    unassigned: usize,
    total_applications: usize,
    experience_months: u64,
    recent: Vec<ApplicationRecord>,
}

impl DashboardReport {
    pub fn build(jobs: &[Job], applications: &[ApplicationRecord], today: NaiveDate) -> Self {
        let mut report = Self {
            jobs: JobCounts {
                total: jobs.len(),
                open: jobs.iter().filter(|job| job.is_open_on(today)).count(),
                featured: jobs.iter().filter(|job| job.featured).count(),
            },
            titles: jobs
                .iter()
                .map(|job| (job.id.clone(), job.title.clone()))
                .collect(),
            total_applications: applications.len(),
            ..Self::default()
        };

        for record in applications {
            *report.pipeline.entry(record.status).or_default() += 1;
            match &record.job_id {
                Some(job_id) => *report.per_job.entry(job_id.clone()).or_default() += 1,
                None => report.unassigned += 1,
            }
            report.experience_months += u64::from(record.total_experience.total_months());
        }

        let mut recent = applications.to_vec();
        recent.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        recent.truncate(RECENT_LIMIT);
        report.recent = recent;
        report
    }

    pub fn average_experience(&self) -> TotalExperience {
        if self.total_applications == 0 {
            return TotalExperience::default();
        }
        let average = self.experience_months / self.total_applications as u64;
        TotalExperience::from_months(u32::try_from(average).unwrap_or(u32::MAX))
    }

    pub fn summary(&self) -> DashboardSummary {
        let pipeline = ApplicationStatus::ordered()
            .into_iter()
            .map(|status| PipelineEntry {
                status,
                status_label: status.label(),
                count: self.pipeline.get(&status).copied().unwrap_or_default(),
            })
            .collect();

        let mut applications_per_job: Vec<_> = self
            .per_job
            .iter()
            .map(|(job_id, count)| JobApplicationsEntry {
                job_id: job_id.clone(),
                title: self
                    .titles
                    .get(job_id)
                    .cloned()
                    .unwrap_or_else(|| "Removed job".to_string()),
                applications: *count,
            })
            .collect();
        applications_per_job.sort_by(|a, b| {
            b.applications
                .cmp(&a.applications)
                .then_with(|| a.title.cmp(&b.title))
        });

        let average_experience = self.average_experience();
        DashboardSummary {
            jobs: self.jobs.clone(),
            total_applications: self.total_applications,
            pipeline,
            applications_per_job,
            unassigned_applications: self.unassigned,
            recent_applications: self
                .recent
                .iter()
                .map(ApplicationRecord::status_view)
                .collect(),
            average_experience,
            average_experience_label: average_experience.to_string(),
        }
    }
}
