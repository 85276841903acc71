use crate::api::StatusSnapshot;

pub const LAST_RUN_PLACEHOLDER: &str = "Never";
pub const NEXT_RUN_PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEmphasis {
    Danger,
    Success,
}

/// Display-ready projection of a status snapshot. Owns no network or
/// storage access; derived entirely from the snapshot passed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub indicator_label: &'static str,
    pub button_label: &'static str,
    pub button_emphasis: ButtonEmphasis,
    pub last_run_display: String,
    pub next_run_display: String,
    pub interval_selection: u32,
}

/// Pure and total: deterministic output for every snapshot.
pub fn project(snapshot: &StatusSnapshot) -> ViewState {
    let (indicator_label, button_label, button_emphasis) = if snapshot.active {
        ("RUNNING", "Stop Agent", ButtonEmphasis::Danger)
    } else {
        ("STOPPED", "Start Agent", ButtonEmphasis::Success)
    };

    ViewState {
        indicator_label,
        button_label,
        button_emphasis,
        last_run_display: snapshot.last_run.map_or_else(
            || LAST_RUN_PLACEHOLDER.to_string(),
            |last_run| last_run.format("%H:%M:%S").to_string(),
        ),
        next_run_display: snapshot
            .next_run
            .clone()
            .unwrap_or_else(|| NEXT_RUN_PLACEHOLDER.to_string()),
        interval_selection: snapshot.interval,
    }
}
