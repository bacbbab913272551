use std::collections::BTreeSet;

/// Notice shown whenever the gate turns an interaction away.
pub const GATE_NOTICE: &str = "Wait for metadata generation to finish";

/// UI controls locked while a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Control {
    FolderLinks,
    SearchInput,
    SortControl,
    UncheckAll,
    DeleteChecked,
    DeleteMetadata,
}

pub const GATED_CONTROLS: [Control; 6] = [
    Control::FolderLinks,
    Control::SearchInput,
    Control::SortControl,
    Control::UncheckAll,
    Control::DeleteChecked,
    Control::DeleteMetadata,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    pub control: Control,
    pub enabled: bool,
}

/// Destructive bulk actions guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    UncheckAll,
    DeleteChecked,
    DeleteMetadata,
}

impl BulkAction {
    pub fn control(self) -> Control {
        match self {
            Self::UncheckAll => Control::UncheckAll,
            Self::DeleteChecked => Control::DeleteChecked,
            Self::DeleteMetadata => Control::DeleteMetadata,
        }
    }
}

/// Binary interaction lock mirroring job activity.
///
/// `release` re-enables exactly the set recorded by the matching `engage`,
/// so a release never touches controls the gate did not disable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationGate {
    disabled: Option<BTreeSet<Control>>,
}

impl NavigationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        self.disabled.is_some()
    }

    /// Controls currently held disabled by the gate, in stable order.
    pub fn disabled_controls(&self) -> Vec<Control> {
        self.disabled
            .as_ref()
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Locks the gated controls. No changes when already engaged.
    pub fn engage(&mut self) -> Vec<ControlChange> {
        if self.is_engaged() {
            return Vec::new();
        }
        let set: BTreeSet<Control> = GATED_CONTROLS.iter().copied().collect();
        let changes = set
            .iter()
            .map(|&control| ControlChange {
                control,
                enabled: false,
            })
            .collect();
        self.disabled = Some(set);
        changes
    }

    /// Undoes the last `engage`. No changes when not engaged.
    pub fn release(&mut self) -> Vec<ControlChange> {
        match self.disabled.take() {
            Some(set) => set
                .into_iter()
                .map(|control| ControlChange {
                    control,
                    enabled: true,
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether an interaction through `control` may proceed.
    pub fn admits(&self, control: Control) -> bool {
        self.disabled
            .as_ref()
            .map_or(true, |set| !set.contains(&control))
    }
}
