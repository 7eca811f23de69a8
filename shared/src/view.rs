//! Render-ready projection of the [`Model`](crate::Model).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Model, ToastKind, ToastMessage};
use crate::profile::{Profile, ProfileStatus};
use crate::records::{AppointmentRecord, RecordDialog, RecordsStore, TimeSlot, DATE_FORMAT};
use crate::{AppError, ErrorSeverity};

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Long Russian date, e.g. `16 декабря 2024 г.`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    let month = MONTHS_GENITIVE[date.month0() as usize];
    format!("{} {} {} г.", date.day(), month, date.year())
}

#[must_use]
pub fn format_price(price: u32) -> String {
    format!("{price} ₽")
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_transient: e.severity == ErrorSeverity::Transient,
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccountView {
    pub user_name: String,
    pub avatar_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileFields {
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl From<&Profile> for ProfileFields {
    fn from(p: &Profile) -> Self {
        Self {
            name: p.name.clone(),
            email: p.email.clone(),
            created_at: p.created_at.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfileView {
    /// Nothing requested yet, or nothing found.
    Idle,
    Loading {
        cached: Option<ProfileFields>,
    },
    Loaded {
        profile: ProfileFields,
    },
    Failed {
        error: UserFacingError,
        cached: Option<ProfileFields>,
    },
    Editing {
        draft_name: String,
        draft_email: String,
        created_at: String,
        is_saving: bool,
        error: Option<UserFacingError>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecordItem {
    pub id: String,
    pub date: String,
    pub date_label: String,
    pub time: String,
    pub service: String,
    pub price_label: String,
    pub master: String,
}

impl From<&AppointmentRecord> for RecordItem {
    fn from(r: &AppointmentRecord) -> Self {
        Self {
            id: r.id.to_string(),
            date: r.date.format(DATE_FORMAT).to_string(),
            date_label: format_date(r.date),
            time: r.time.to_string(),
            service: r.service.clone(),
            price_label: format_price(r.price),
            master: r.master.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogView {
    Cancel {
        record: RecordItem,
        reason: String,
        can_confirm: bool,
        error: Option<UserFacingError>,
    },
    Reschedule {
        record: RecordItem,
        dates: Vec<ChoiceView>,
        /// Empty until a date is chosen.
        times: Vec<ChoiceView>,
        can_confirm: bool,
        error: Option<UserFacingError>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecordsView {
    pub items: Vec<RecordItem>,
    pub is_empty: bool,
    pub dialog: Option<DialogView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub account: Option<AccountView>,
    pub profile: ProfileView,
    pub records: RecordsView,
    pub error: Option<UserFacingError>,
    pub toast: Option<ToastView>,
}

fn profile_view(model: &Model) -> ProfileView {
    let cached = model.profile.profile().map(ProfileFields::from);

    match model.profile.status() {
        ProfileStatus::Idle => ProfileView::Idle,
        ProfileStatus::Loading => ProfileView::Loading { cached },
        ProfileStatus::Loaded => match cached {
            Some(profile) => ProfileView::Loaded { profile },
            None => ProfileView::Idle,
        },
        ProfileStatus::Failed(error) => ProfileView::Failed {
            error: error.into(),
            cached,
        },
        ProfileStatus::Editing(session) => ProfileView::Editing {
            draft_name: session.draft.name.clone(),
            draft_email: session.draft.email.clone(),
            created_at: cached.map(|p| p.created_at).unwrap_or_default(),
            is_saving: session.saving.is_some(),
            error: session.error.as_ref().map(UserFacingError::from),
        },
    }
}

fn dialog_view(store: &RecordsStore, dialog: &RecordDialog) -> Option<DialogView> {
    let record = RecordItem::from(store.get(dialog.record_id())?);
    let can_confirm = dialog.can_confirm();

    let view = match dialog {
        RecordDialog::Cancel { reason, error, .. } => DialogView::Cancel {
            record,
            reason: reason.clone(),
            can_confirm,
            error: error.as_ref().map(UserFacingError::from),
        },
        RecordDialog::Reschedule {
            date, time, error, ..
        } => {
            let dates = store
                .offered_dates()
                .iter()
                .map(|d| ChoiceView {
                    value: d.format(DATE_FORMAT).to_string(),
                    label: format_date(*d),
                    selected: Some(*d) == *date,
                })
                .collect();

            let times = if dialog.shows_time_picker() {
                TimeSlot::all()
                    .map(|slot| ChoiceView {
                        value: slot.to_string(),
                        label: slot.to_string(),
                        selected: Some(slot) == *time,
                    })
                    .collect()
            } else {
                Vec::new()
            };

            DialogView::Reschedule {
                record,
                dates,
                times,
                can_confirm,
                error: error.as_ref().map(UserFacingError::from),
            }
        }
    };
    Some(view)
}

impl ViewModel {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        let items: Vec<RecordItem> = model.records.records().iter().map(RecordItem::from).collect();

        Self {
            account: model.account.as_ref().map(|a| AccountView {
                user_name: a.user_name.clone(),
                avatar_url: a.avatar_url.clone(),
            }),
            profile: profile_view(model),
            records: RecordsView {
                is_empty: items.is_empty(),
                items,
                dialog: model
                    .dialog
                    .as_ref()
                    .and_then(|d| dialog_view(&model.records, d)),
            },
            error: model.active_error.as_ref().map(UserFacingError::from),
            toast: model.active_toast.as_ref().map(ToastView::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{parse_date, RecordsSeed};

    #[test]
    fn test_format_date_russian_long_form() {
        assert_eq!(format_date(parse_date("2024-12-16").unwrap()), "16 декабря 2024 г.");
        assert_eq!(format_date(parse_date("2025-03-01").unwrap()), "1 марта 2025 г.");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(2500), "2500 ₽");
    }

    #[test]
    fn test_empty_model_view() {
        let view = ViewModel::from_model(&Model::default());
        assert_eq!(view.profile, ProfileView::Idle);
        assert!(view.records.is_empty);
        assert!(view.records.dialog.is_none());
        assert!(view.account.is_none());
    }

    #[test]
    fn test_reschedule_dialog_hides_times_until_date_chosen() {
        let mut model = Model::default();
        model.records.seed(RecordsSeed::bundled().unwrap()).unwrap();
        let record_id = crate::model::RecordId::new("3");
        model.dialog = Some(RecordDialog::reschedule(&model.records, record_id).unwrap());

        let view = ViewModel::from_model(&model);
        let Some(DialogView::Reschedule { dates, times, can_confirm, record, .. }) =
            view.records.dialog
        else {
            panic!("expected reschedule dialog");
        };
        assert_eq!(record.service, "Маникюр");
        assert_eq!(dates.len(), 3);
        assert!(times.is_empty());
        assert!(!can_confirm);

        if let Some(RecordDialog::Reschedule { date, .. }) = &mut model.dialog {
            *date = Some(parse_date("2024-12-19").unwrap());
        }
        let view = ViewModel::from_model(&model);
        let Some(DialogView::Reschedule { dates, times, .. }) = view.records.dialog else {
            panic!("expected reschedule dialog");
        };
        assert_eq!(times.len(), 8);
        assert!(dates.iter().any(|d| d.selected && d.value == "2024-12-19"));
    }
}
