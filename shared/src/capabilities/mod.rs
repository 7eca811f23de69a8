mod notify;
mod timer;

pub use self::notify::{Notify, NotifyOperation};
pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub timer: Timer<Event>,
    pub notify: Notify<Event>,
    pub render: Render<Event>,
}
