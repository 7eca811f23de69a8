mod common;

use common::{send, tester};
use shared::view::{DialogView, RecordItem};
use shared::{Event, Model, ViewModel};

fn started() -> (crux_core::testing::AppTester<shared::App, shared::Effect>, Model) {
    let app = tester();
    let mut model = Model::default();
    let effects = send(&app, &mut model, Event::AppStarted);
    assert!(effects.renders > 0);
    (app, model)
}

fn items(model: &Model) -> Vec<RecordItem> {
    ViewModel::from_model(model).records.items
}

fn item(model: &Model, id: &str) -> RecordItem {
    items(model)
        .into_iter()
        .find(|r| r.id == id)
        .unwrap_or_else(|| panic!("record {id} missing"))
}

fn reschedule(id: &str, date: Option<&str>, time: Option<&str>) -> Event {
    Event::RescheduleRecord {
        record_id: id.into(),
        date: date.map(Into::into),
        time: time.map(Into::into),
    }
}

fn cancel(id: &str, reason: &str) -> Event {
    Event::CancelRecord {
        record_id: id.into(),
        reason: reason.into(),
    }
}

#[test]
fn test_app_started_loads_account_and_records() {
    let (_, model) = started();
    let view = ViewModel::from_model(&model);

    assert_eq!(view.account.unwrap().user_name, "Алексей Смирнов");
    assert_eq!(view.records.items.len(), 3);
    assert!(!view.records.is_empty);

    let second = &view.records.items[1];
    assert_eq!(second.date_label, "16 декабря 2024 г.");
    assert_eq!(second.time, "14:00");
    assert_eq!(second.price_label, "2500 ₽");
    assert_eq!(second.master, "Мария Сидорова");
}

#[test]
fn test_reschedule_record_example() {
    let (app, mut model) = started();
    let before = item(&model, "2");

    send(&app, &mut model, reschedule("2", Some("2024-12-19"), Some("11:00")));

    let after = item(&model, "2");
    assert_eq!(after.date, "2024-12-19");
    assert_eq!(after.time, "11:00");
    assert_eq!(after.service, before.service);
    assert_eq!(after.price_label, before.price_label);
    assert_eq!(after.master, before.master);
    assert_eq!(items(&model)[1].id, "2");
    assert!(ViewModel::from_model(&model).toast.is_some());
}

#[test]
fn test_reschedule_rejects_bad_input_without_mutation() {
    let (app, mut model) = started();
    let snapshot = items(&model);

    for event in [
        reschedule("2", None, Some("11:00")),
        reschedule("2", Some("2024-12-19"), None),
        reschedule("2", Some("19.12.2024"), Some("11:00")),
        reschedule("2", Some("2024-12-19"), Some("09:00")),
        reschedule("2", Some("2025-01-01"), Some("11:00")),
    ] {
        send(&app, &mut model, event);
        let Some(error) = ViewModel::from_model(&model).error else {
            panic!("expected an error");
        };
        assert_eq!(error.error_code, "VALIDATION_ERROR");

        send(&app, &mut model, Event::DismissError);
    }

    assert_eq!(items(&model), snapshot);
    assert!(ViewModel::from_model(&model).error.is_none());
}

#[test]
fn test_cancel_record_flow() {
    let (app, mut model) = started();

    send(&app, &mut model, cancel("1", "   "));
    assert_eq!(items(&model).len(), 3);
    let Some(error) = ViewModel::from_model(&model).error else {
        panic!("expected an error");
    };
    assert_eq!(error.message, "Please state a reason for cancelling");

    send(&app, &mut model, cancel("1", "Заболел"));
    let ids: Vec<_> = items(&model).into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["2", "3"]);

    send(&app, &mut model, cancel("1", "again"));
    let Some(error) = ViewModel::from_model(&model).error else {
        panic!("expected an error");
    };
    assert_eq!(error.error_code, "NOT_FOUND");

    assert_eq!(items(&model).len(), 2);
}

#[test]
fn test_unknown_record_is_reported() {
    let (app, mut model) = started();

    send(&app, &mut model, reschedule("404", Some("2024-12-18"), Some("12:00")));
    let Some(error) = ViewModel::from_model(&model).error else {
        panic!("expected an error");
    };
    assert_eq!(error.error_code, "NOT_FOUND");

    send(&app, &mut model, Event::DismissError);
    send(
        &app,
        &mut model,
        Event::OpenCancelDialog {
            record_id: "404".into(),
        },
    );
    let view = ViewModel::from_model(&model);
    assert!(view.records.dialog.is_none());
    assert!(view.error.is_some());
}

#[test]
fn test_cancel_dialog_flow() {
    let (app, mut model) = started();

    send(
        &app,
        &mut model,
        Event::OpenCancelDialog {
            record_id: "3".into(),
        },
    );
    send(&app, &mut model, Event::ConfirmCancel);
    assert!(matches!(
        ViewModel::from_model(&model).records.dialog,
        Some(DialogView::Cancel { error: Some(_), can_confirm: true, .. })
    ));
    assert_eq!(items(&model).len(), 3);

    send(&app, &mut model, Event::CancelReasonChanged("Уезжаю".into()));
    assert!(matches!(
        ViewModel::from_model(&model).records.dialog,
        Some(DialogView::Cancel { error: None, ref reason, .. }) if reason == "Уезжаю"
    ));

    send(&app, &mut model, Event::ConfirmCancel);
    let view = ViewModel::from_model(&model);
    assert!(view.records.dialog.is_none());
    assert_eq!(view.records.items.len(), 2);
    assert!(view.toast.is_some());
}

#[test]
fn test_reschedule_dialog_flow() {
    let (app, mut model) = started();

    send(
        &app,
        &mut model,
        Event::OpenRescheduleDialog {
            record_id: "1".into(),
        },
    );
    assert!(matches!(
        ViewModel::from_model(&model).records.dialog,
        Some(DialogView::Reschedule { ref times, can_confirm: false, .. }) if times.is_empty()
    ));

    send(&app, &mut model, Event::RescheduleDateSelected("2025-01-01".into()));
    assert!(matches!(
        ViewModel::from_model(&model).records.dialog,
        Some(DialogView::Reschedule { error: Some(_), .. })
    ));

    send(&app, &mut model, Event::RescheduleDateSelected("2024-12-20".into()));
    send(&app, &mut model, Event::RescheduleTimeSelected("16:00".into()));
    let Some(DialogView::Reschedule {
        times,
        can_confirm: true,
        error: None,
        ..
    }) = ViewModel::from_model(&model).records.dialog
    else {
        panic!("expected a confirmable reschedule dialog");
    };
    assert_eq!(times.len(), 8);
    assert!(times.iter().any(|t| t.selected && t.value == "16:00"));

    send(&app, &mut model, Event::ConfirmReschedule);
    assert!(ViewModel::from_model(&model).records.dialog.is_none());
    let moved = item(&model, "1");
    assert_eq!(moved.date, "2024-12-20");
    assert_eq!(moved.time, "16:00");
}

#[test]
fn test_dismiss_dialog_leaves_records_untouched() {
    let (app, mut model) = started();
    let snapshot = items(&model);

    send(
        &app,
        &mut model,
        Event::OpenRescheduleDialog {
            record_id: "2".into(),
        },
    );
    send(&app, &mut model, Event::RescheduleDateSelected("2024-12-18".into()));
    send(&app, &mut model, Event::DismissDialog);

    assert!(ViewModel::from_model(&model).records.dialog.is_none());
    assert_eq!(items(&model), snapshot);
}

#[test]
fn test_shell_seed_takes_precedence() {
    let app = tester();
    let mut model = Model::default();

    let seed = shared::records::RecordsSeed {
        offered_dates: vec![],
        records: vec![],
    };
    send(&app, &mut model, Event::SeedRecords(seed.clone()));
    send(&app, &mut model, Event::AppStarted);

    let view = ViewModel::from_model(&model);
    assert!(view.records.is_empty);
    assert!(view.error.is_none());

    send(&app, &mut model, Event::SeedRecords(seed));
    let Some(error) = ViewModel::from_model(&model).error else {
        panic!("expected an error");
    };
    assert_eq!(error.error_code, "INVALID_STATE");
}
