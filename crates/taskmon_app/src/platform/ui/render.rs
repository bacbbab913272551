use chrono::{DateTime, TimeZone};
use taskmon_core::{AppViewModel, JobStatus, JobView};

/// Console lines for a view model: location, job progress and gate state.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let mut location = format!("Location: {}", view.location);
    if !view.search_query.is_empty() {
        location.push_str(&format!(" | search: {}", view.search_query));
    }
    location.push_str(&format!(
        " | sort: {} | images: {}",
        view.sort_by, view.loaded_images
    ));
    lines.push(location);

    let job_line = match &view.job {
        Some(job) => format!("Job {}: {}", job.job_id, progress_text(job)),
        None if view.negotiating => "Checking for pending metadata...".to_string(),
        None => "No metadata generation running".to_string(),
    };
    lines.push(job_line);

    lines.push(if view.gate_engaged {
        format!(
            "Navigation locked ({} controls disabled)",
            view.disabled_controls.len()
        )
    } else {
        "Navigation open".to_string()
    });

    lines
}

/// `processed / total (pct%) message [status]`
pub fn progress_text(job: &JobView) -> String {
    let mut text = format!(
        "{} / {} ({:.1}%)",
        job.processed, job.total, job.percentage
    );
    if let Some(message) = &job.message {
        text.push(' ');
        text.push_str(message);
    }
    let status = match job.status {
        JobStatus::Pending => "pending",
        JobStatus::Running => "running",
        JobStatus::Completed => "completed",
        JobStatus::Error => "error",
    };
    text.push_str(&format!(" [{status}"));
    if job.abandoned {
        text.push_str(", abandoned");
    } else if job.settling {
        text.push_str(", settling");
    }
    text.push(']');
    text
}

pub fn notice_line<Tz>(at: &DateTime<Tz>, text: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("[{}] {}", at.format("%H:%M:%S"), text)
}
