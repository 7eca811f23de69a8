use tracing::{debug, info, warn};

use crate::account::AccountSummary;
use crate::capabilities::{Capabilities, TimerId, TimerOutput};
use crate::config::ApiConfig;
use crate::event::{Event, ProfileResponse};
use crate::model::{Model, RecordId, ToastMessage, UserId};
use crate::profile::{
    Completion, LoadStart, Profile, ProfileError, RequestGeneration, SaveCompletion,
};
use crate::records::{parse_date, RecordDialog, RecordsError, RecordsSeed, TimeSlot};
use crate::view::ViewModel;
use crate::{AppError, AppResult, ErrorKind};

#[derive(Default)]
pub struct App;

impl App {
    fn timer_id(generation: RequestGeneration) -> TimerId {
        TimerId(generation.0)
    }

    /// Success bodies become a [`Profile`]; everything else an [`AppError`].
    fn decode_profile(result: ProfileResponse) -> AppResult<Profile> {
        let mut response = result?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_http_status(u16::from(status), None));
        }
        response.take_body().ok_or_else(|| {
            AppError::new(ErrorKind::Deserialization, "profile response had no body")
        })
    }

    fn request_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn start_profile_load(model: &mut Model, caps: &Capabilities, user_id: UserId) {
        if user_id.as_str().trim().is_empty() {
            model.set_error(AppError::new(ErrorKind::Validation, "A user id is required"));
            return;
        }

        let generation = match model.profile.load(user_id.clone()) {
            LoadStart::Started {
                generation,
                superseded,
            } => {
                if let Some(previous) = superseded {
                    debug!(generation = previous.0, "superseding profile fetch");
                    caps.timer.cancel(Self::timer_id(previous));
                }
                generation
            }
            LoadStart::AlreadyInFlight => {
                debug!(user_id = %user_id, "profile fetch already in flight");
                return;
            }
        };

        let url = match model.config.user_url(user_id.as_str()) {
            Ok(url) => url,
            Err(error) => {
                warn!(user_id = %user_id, %error, "could not build profile request");
                model.profile.complete_load(generation, Err(error.into()));
                return;
            }
        };

        let request_id = Self::request_id();
        debug!(
            user_id = %user_id,
            generation = generation.0,
            request_id = %request_id,
            "fetching profile"
        );

        caps.http
            .get(url.as_str())
            .header("Accept", "application/json")
            .header("X-Request-Id", request_id.as_str())
            .expect_json::<Profile>()
            .send(move |result| Event::ProfileFetched {
                generation,
                result: Box::new(result),
            });
        caps.timer.start(
            Self::timer_id(generation),
            model.config.request_timeout_ms(),
            move |output| Event::ProfileFetchTimerFired { generation, output },
        );
    }

    fn on_profile_fetched(
        model: &mut Model,
        caps: &Capabilities,
        generation: RequestGeneration,
        result: ProfileResponse,
    ) {
        let outcome = Self::decode_profile(result);
        let loaded_name = outcome.as_ref().ok().map(|p| p.name.clone());
        if let Err(error) = &outcome {
            warn!(generation = generation.0, %error, "profile fetch failed");
        }

        match model.profile.complete_load(generation, outcome) {
            Completion::Stale => {
                debug!(generation = generation.0, "dropping stale profile response");
            }
            Completion::Applied => {
                caps.timer.cancel(Self::timer_id(generation));
                if let (Some(name), Some(account)) = (loaded_name, model.account.as_mut()) {
                    account.rename(&name);
                }
            }
        }
    }

    fn on_profile_fetch_timer(
        model: &mut Model,
        generation: RequestGeneration,
        output: TimerOutput,
    ) {
        match output {
            TimerOutput::Elapsed { .. } if model.profile.in_flight_load() == Some(generation) => {
                let timeout_ms = model.config.request_timeout_ms();
                warn!(generation = generation.0, timeout_ms, "profile fetch timed out");
                model.profile.complete_load(
                    generation,
                    Err(AppError::new(
                        ErrorKind::Timeout,
                        format!("profile request timed out after {timeout_ms}ms"),
                    )),
                );
            }
            TimerOutput::Elapsed { .. } | TimerOutput::Cancelled { .. } => {}
        }
    }

    fn save_profile(model: &mut Model, caps: &Capabilities) {
        let Some(draft) = model.profile.draft().cloned() else {
            model.set_error(ProfileError::NotEditing.into());
            return;
        };

        let ticket = match model.profile.save(draft) {
            Ok(ticket) => ticket,
            Err(ProfileError::SaveInProgress) => {
                debug!("save already in progress");
                return;
            }
            Err(e @ (ProfileError::EmptyName | ProfileError::EmptyEmail)) => {
                debug!(error = %e, "profile draft rejected");
                return;
            }
            Err(e) => {
                model.set_error(e.into());
                return;
            }
        };

        let generation = ticket.generation;
        let request = model
            .config
            .user_url(ticket.user_id.as_str())
            .map_err(AppError::from)
            .and_then(|url| {
                caps.http
                    .put(url.as_str())
                    .body_json(&ticket.update)
                    .map_err(AppError::from)
            });

        match request {
            Ok(request) => {
                let request_id = Self::request_id();
                debug!(
                    user_id = %ticket.user_id,
                    generation = generation.0,
                    request_id = %request_id,
                    "saving profile"
                );
                request
                    .header("Accept", "application/json")
                    .header("X-Request-Id", request_id.as_str())
                    .expect_json::<Profile>()
                    .send(move |result| Event::ProfileSaved {
                        generation,
                        result: Box::new(result),
                    });
            }
            Err(error) => {
                warn!(generation = generation.0, %error, "could not build save request");
                model.profile.complete_save(generation, Err(error));
            }
        }
    }

    fn on_profile_saved(
        model: &mut Model,
        caps: &Capabilities,
        generation: RequestGeneration,
        result: ProfileResponse,
    ) {
        match model.profile.complete_save(generation, Self::decode_profile(result)) {
            SaveCompletion::Saved(profile) => {
                let user_id = model
                    .profile
                    .user_id()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                info!(user_id = %user_id, "profile saved");

                if let Some(account) = model.account.as_mut() {
                    account.rename(&profile.name);
                }
                caps.notify.profile_updated(user_id, profile);
                model.show_toast(ToastMessage::success("Profile saved"));
            }
            SaveCompletion::Failed(error) => {
                warn!(generation = generation.0, %error, "profile save failed");
            }
            SaveCompletion::Stale => {
                debug!(generation = generation.0, "dropping stale save response");
            }
        }
    }

    fn parse_choices(
        date: Option<&str>,
        time: Option<&str>,
    ) -> Result<(Option<chrono::NaiveDate>, Option<TimeSlot>), RecordsError> {
        let date = date.map(parse_date).transpose()?;
        let time = time.map(str::parse::<TimeSlot>).transpose()?;
        Ok((date, time))
    }

    fn close_dialog_for(model: &mut Model, record_id: &RecordId) {
        if model
            .dialog
            .as_ref()
            .is_some_and(|d| d.record_id() == record_id)
        {
            model.dialog = None;
        }
    }

    fn cancel_record(
        model: &mut Model,
        record_id: &RecordId,
        reason: &str,
    ) -> AppResult<()> {
        model.records.cancel(record_id, reason)?;
        Self::close_dialog_for(model, record_id);
        model.show_toast(ToastMessage::success("Appointment cancelled"));
        Ok(())
    }

    fn reschedule_record(
        model: &mut Model,
        record_id: &RecordId,
        date: Option<chrono::NaiveDate>,
        time: Option<TimeSlot>,
    ) -> AppResult<()> {
        model.records.reschedule(record_id, date, time)?;
        Self::close_dialog_for(model, record_id);
        model.show_toast(ToastMessage::success("Appointment rescheduled"));
        Ok(())
    }

    fn open_dialog(model: &mut Model, dialog: Result<RecordDialog, RecordsError>) {
        match dialog {
            Ok(dialog) => model.dialog = Some(dialog),
            Err(e) => model.set_error(e.into()),
        }
    }

    fn dialog_error(model: &mut Model, error: AppError) {
        if let Some(dialog) = model.dialog.as_mut() {
            dialog.set_error(error);
        } else {
            model.set_error(error);
        }
    }

    fn seed_records(model: &mut Model, seed: Result<RecordsSeed, RecordsError>) {
        if let Err(e) = seed.and_then(|seed| model.records.seed(seed)) {
            warn!(error = %e, "could not seed appointments");
            model.set_error(e.into());
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "update"
        );

        match event {
            Event::AppStarted => {
                if model.account.is_none() {
                    match AccountSummary::bundled() {
                        Ok(account) => model.account = Some(account),
                        Err(e) => model.set_error(e),
                    }
                }
                if model.records.is_seeded() {
                    debug!("appointments already supplied by the shell");
                } else {
                    Self::seed_records(model, RecordsSeed::bundled());
                }
            }

            Event::Configure {
                base_url,
                request_timeout_ms,
            } => match ApiConfig::new(base_url, request_timeout_ms) {
                Ok(config) => {
                    info!(
                        base_url = %config.base_url(),
                        request_timeout_ms,
                        "api configured"
                    );
                    model.config = config;
                }
                Err(e) => model.set_error(e.into()),
            },

            Event::LoadProfile { user_id } => {
                Self::start_profile_load(model, caps, UserId::new(user_id));
            }

            Event::RetryLoadProfile => match model.profile.user_id().cloned() {
                Some(user_id) => Self::start_profile_load(model, caps, user_id),
                None => model.set_error(ProfileError::NotLoaded.into()),
            },

            Event::ProfileFetched { generation, result } => {
                Self::on_profile_fetched(model, caps, generation, *result);
            }

            Event::ProfileFetchTimerFired { generation, output } => {
                Self::on_profile_fetch_timer(model, generation, output);
            }

            Event::BeginEditProfile => {
                if let Err(e) = model.profile.begin_edit() {
                    model.set_error(e.into());
                }
            }

            Event::DraftNameChanged(name) => {
                if let Err(e) = model.profile.edit_draft(|d| d.name = name) {
                    model.set_error(e.into());
                }
            }

            Event::DraftEmailChanged(email) => {
                if let Err(e) = model.profile.edit_draft(|d| d.email = email) {
                    model.set_error(e.into());
                }
            }

            Event::SaveProfile => Self::save_profile(model, caps),

            Event::ProfileSaved { generation, result } => {
                Self::on_profile_saved(model, caps, generation, *result);
            }

            Event::CancelEditProfile => {
                if !model.profile.cancel_edit() {
                    debug!("cancel edit with no open edit session");
                }
            }

            Event::SeedRecords(seed) => Self::seed_records(model, Ok(seed)),

            Event::CancelRecord { record_id, reason } => {
                if let Err(e) = Self::cancel_record(model, &RecordId::new(record_id), &reason) {
                    model.set_error(e);
                }
            }

            Event::RescheduleRecord {
                record_id,
                date,
                time,
            } => {
                let result = Self::parse_choices(date.as_deref(), time.as_deref())
                    .map_err(AppError::from)
                    .and_then(|(date, time)| {
                        Self::reschedule_record(model, &RecordId::new(record_id), date, time)
                    });
                if let Err(e) = result {
                    model.set_error(e);
                }
            }

            Event::OpenCancelDialog { record_id } => {
                let dialog = RecordDialog::cancel(&model.records, RecordId::new(record_id));
                Self::open_dialog(model, dialog);
            }

            Event::CancelReasonChanged(text) => {
                if let Some(RecordDialog::Cancel { reason, error, .. }) = model.dialog.as_mut() {
                    *reason = text;
                    *error = None;
                }
            }

            Event::ConfirmCancel => {
                if let Some(RecordDialog::Cancel {
                    record_id, reason, ..
                }) = model.dialog.clone()
                {
                    if let Err(e) = Self::cancel_record(model, &record_id, &reason) {
                        Self::dialog_error(model, e);
                    }
                }
            }

            Event::OpenRescheduleDialog { record_id } => {
                let dialog = RecordDialog::reschedule(&model.records, RecordId::new(record_id));
                Self::open_dialog(model, dialog);
            }

            Event::RescheduleDateSelected(value) => {
                let parsed = parse_date(&value).and_then(|d| {
                    if model.records.is_offered(d) {
                        Ok(d)
                    } else {
                        Err(RecordsError::DateNotOffered(d))
                    }
                });
                match (parsed, model.dialog.as_mut()) {
                    (Ok(d), Some(RecordDialog::Reschedule { date, error, .. })) => {
                        *date = Some(d);
                        *error = None;
                    }
                    (Err(e), Some(dialog)) if matches!(dialog, RecordDialog::Reschedule { .. }) => {
                        dialog.set_error(e.into());
                    }
                    _ => {}
                }
            }

            Event::RescheduleTimeSelected(value) => {
                match (value.parse::<TimeSlot>(), model.dialog.as_mut()) {
                    (Ok(slot), Some(RecordDialog::Reschedule { time, error, .. })) => {
                        *time = Some(slot);
                        *error = None;
                    }
                    (Err(e), Some(dialog)) if matches!(dialog, RecordDialog::Reschedule { .. }) => {
                        dialog.set_error(e.into());
                    }
                    _ => {}
                }
            }

            Event::ConfirmReschedule => {
                if let Some(RecordDialog::Reschedule {
                    record_id,
                    date,
                    time,
                    ..
                }) = model.dialog.clone()
                {
                    if let Err(e) = Self::reschedule_record(model, &record_id, date, time) {
                        Self::dialog_error(model, e);
                    }
                }
            }

            Event::DismissDialog => model.dialog = None,

            Event::DismissError => model.clear_error(),

            Event::DismissToast => model.active_toast = None,
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
