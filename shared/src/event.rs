use serde::{Deserialize, Serialize};

use crate::capabilities::TimerOutput;
use crate::profile::{Profile, RequestGeneration};
use crate::records::RecordsSeed;

/// What a profile GET or PUT resolves to.
pub type ProfileResponse = crux_http::Result<crux_http::Response<Profile>>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Event {
    // Lifecycle
    AppStarted,
    Configure {
        base_url: String,
        request_timeout_ms: u64,
    },

    // Profile
    LoadProfile {
        user_id: String,
    },
    RetryLoadProfile,
    BeginEditProfile,
    DraftNameChanged(String),
    DraftEmailChanged(String),
    SaveProfile,
    CancelEditProfile,

    // Records
    SeedRecords(RecordsSeed),
    CancelRecord {
        record_id: String,
        reason: String,
    },
    RescheduleRecord {
        record_id: String,
        date: Option<String>,
        time: Option<String>,
    },

    // Record dialogs
    OpenCancelDialog {
        record_id: String,
    },
    CancelReasonChanged(String),
    ConfirmCancel,
    OpenRescheduleDialog {
        record_id: String,
    },
    RescheduleDateSelected(String),
    RescheduleTimeSelected(String),
    ConfirmReschedule,
    DismissDialog,

    // UI
    DismissError,
    DismissToast,

    // Capability responses (boxed to keep enum size small)
    #[serde(skip)]
    ProfileFetched {
        generation: RequestGeneration,
        result: Box<ProfileResponse>,
    },
    #[serde(skip)]
    ProfileFetchTimerFired {
        generation: RequestGeneration,
        output: TimerOutput,
    },
    #[serde(skip)]
    ProfileSaved {
        generation: RequestGeneration,
        result: Box<ProfileResponse>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::AppStarted => "app_started",
            Event::Configure { .. } => "configure",
            Event::LoadProfile { .. } => "load_profile",
            Event::RetryLoadProfile => "retry_load_profile",
            Event::BeginEditProfile => "begin_edit_profile",
            Event::DraftNameChanged(_) => "draft_name_changed",
            Event::DraftEmailChanged(_) => "draft_email_changed",
            Event::SaveProfile => "save_profile",
            Event::CancelEditProfile => "cancel_edit_profile",
            Event::SeedRecords(_) => "seed_records",
            Event::CancelRecord { .. } => "cancel_record",
            Event::RescheduleRecord { .. } => "reschedule_record",
            Event::OpenCancelDialog { .. } => "open_cancel_dialog",
            Event::CancelReasonChanged(_) => "cancel_reason_changed",
            Event::ConfirmCancel => "confirm_cancel",
            Event::OpenRescheduleDialog { .. } => "open_reschedule_dialog",
            Event::RescheduleDateSelected(_) => "reschedule_date_selected",
            Event::RescheduleTimeSelected(_) => "reschedule_time_selected",
            Event::ConfirmReschedule => "confirm_reschedule",
            Event::DismissDialog => "dismiss_dialog",
            Event::DismissError => "dismiss_error",
            Event::DismissToast => "dismiss_toast",
            Event::ProfileFetched { .. } => "profile_fetched",
            Event::ProfileFetchTimerFired { .. } => "profile_fetch_timer_fired",
            Event::ProfileSaved { .. } => "profile_saved",
        }
    }

    /// Events the shell sends on behalf of the user, as opposed to
    /// capability completions.
    pub fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Event::ProfileFetched { .. }
                | Event::ProfileFetchTimerFired { .. }
                | Event::ProfileSaved { .. }
        )
    }
}
