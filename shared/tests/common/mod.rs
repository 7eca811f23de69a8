#![allow(dead_code)]

use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use shared::capabilities::{NotifyOperation, TimerOperation, TimerOutput};
use shared::{App, Effect, Event, Model};

#[derive(Default)]
pub struct Effects {
    pub http: Vec<Request<HttpRequest>>,
    pub timers: Vec<Request<TimerOperation>>,
    pub notifications: Vec<NotifyOperation>,
    pub renders: usize,
}

impl Effects {
    pub fn absorb(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Http(request) => self.http.push(request),
                Effect::Timer(request) => self.timers.push(request),
                Effect::Notify(request) => self.notifications.push(request.operation),
                Effect::Render(_) => self.renders += 1,
            }
        }
    }

    fn merge(&mut self, other: Effects) {
        self.http.extend(other.http);
        self.timers.extend(other.timers);
        self.notifications.extend(other.notifications);
        self.renders += other.renders;
    }

    pub fn take_http(&mut self) -> Request<HttpRequest> {
        assert!(!self.http.is_empty(), "expected an http request");
        self.http.remove(0)
    }

    pub fn timer_starts(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| matches!(t.operation, TimerOperation::Start { .. }))
            .count()
    }

    pub fn timer_cancels(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| matches!(t.operation, TimerOperation::Cancel { .. }))
            .count()
    }

    pub fn take_timer_start(&mut self) -> Request<TimerOperation> {
        let index = self
            .timers
            .iter()
            .position(|t| matches!(t.operation, TimerOperation::Start { .. }))
            .expect("expected a timer start");
        self.timers.remove(index)
    }
}

pub fn tester() -> AppTester<App, Effect> {
    AppTester::<App, Effect>::default()
}

/// Sends `event` and follows every event the app feeds back to itself.
pub fn send(app: &AppTester<App, Effect>, model: &mut Model, event: Event) -> Effects {
    let update = app.update(event, model);
    follow(app, model, update)
}

pub fn resolve_http(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    request: &mut Request<HttpRequest>,
    result: HttpResult,
) -> Effects {
    let update = app.resolve(request, result).expect("http request resolves");
    follow(app, model, update)
}

pub fn resolve_timer(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    request: &mut Request<TimerOperation>,
    output: TimerOutput,
) -> Effects {
    let update = app.resolve(request, output).expect("timer resolves");
    follow(app, model, update)
}

fn follow(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    update: Update<Effect, Event>,
) -> Effects {
    let mut effects = Effects::default();
    effects.absorb(update.effects);
    for event in update.events {
        let more = send(app, model, event);
        effects.merge(more);
    }
    effects
}

pub fn ok_json(body: &serde_json::Value) -> HttpResult {
    HttpResult::Ok(HttpResponse::ok().json(body).build())
}

pub fn status(code: u16, body: &serde_json::Value) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(code).json(body).build())
}
