use chrono::Local;
use taskmon_core::{BulkAction, Control, ControlChange, Effect};
use taskmon_logging::{taskmon_debug, taskmon_info};

use super::render::notice_line;

/// Stand-in for the browser page: prints notices and logs the page-side
/// effects (history, controls, folder tree) it would perform.
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    pub fn show_notice(&self, text: &str) {
        println!("{}", notice_line(&Local::now(), text));
    }

    pub fn apply(&self, effect: &Effect) {
        match describe(effect) {
            Some(text) => taskmon_info!("Page: {text}"),
            None => taskmon_debug!("Page ignores {effect:?}"),
        }
    }
}

/// Text for a page-side effect; `None` for effects the page does not own.
pub fn describe(effect: &Effect) -> Option<String> {
    let text = match effect {
        Effect::SetControls(changes) => format!("set controls {}", describe_changes(changes)),
        Effect::PushHistory(location) => format!("push history {location}"),
        Effect::RestoreHistory(location) => format!("restore history to {location}"),
        Effect::RestoreSearch(query) => format!("restore search input to {query:?}"),
        Effect::RestoreSort(sort_by) => format!("restore sort control to {sort_by}"),
        Effect::ToggleFolder { path } => format!("toggle folder {path}"),
        Effect::RunBulkAction(action) => format!("run {}", bulk_action_name(*action)),
        Effect::LoadFolderTree => "load folder tree".to_string(),
        Effect::ShowNotice(text) => format!("notice {text:?}"),
        Effect::Negotiate { .. }
        | Effect::Subscribe { .. }
        | Effect::CloseChannel
        | Effect::ScheduleTeardown { .. }
        | Effect::LoadGallery(_) => return None,
    };
    Some(text)
}

fn describe_changes(changes: &[ControlChange]) -> String {
    changes
        .iter()
        .map(|change| {
            let sign = if change.enabled { '+' } else { '-' };
            format!("{sign}{}", control_name(change.control))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn control_name(control: Control) -> &'static str {
    match control {
        Control::FolderLinks => "folder-links",
        Control::SearchInput => "search",
        Control::SortControl => "sort",
        Control::UncheckAll => "uncheck-all",
        Control::DeleteChecked => "delete-checked",
        Control::DeleteMetadata => "delete-metadata",
    }
}

fn bulk_action_name(action: BulkAction) -> &'static str {
    match action {
        BulkAction::UncheckAll => "uncheck-all",
        BulkAction::DeleteChecked => "delete-checked",
        BulkAction::DeleteMetadata => "delete-metadata",
    }
}
