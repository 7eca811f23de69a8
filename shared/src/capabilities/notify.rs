use serde::{Deserialize, Serialize};

use crux_core::capability::{Capability, CapabilityContext, Operation};

use crate::profile::Profile;

/// Fire-and-forget messages for listeners living in the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NotifyOperation {
    ProfileUpdated { user_id: String, profile: Profile },
}

impl Operation for NotifyOperation {
    type Output = ();
}

pub struct Notify<Ev> {
    context: CapabilityContext<NotifyOperation, Ev>,
}

impl<Ev> Capability<Ev> for Notify<Ev> {
    type Operation = NotifyOperation;
    type MappedSelf<MappedEv> = Notify<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + Copy + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Notify::new(self.context.map_event(f))
    }
}

impl<Ev> Notify<Ev> {
    pub fn new(context: CapabilityContext<NotifyOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Notify<Ev>
where
    Ev: Send + 'static,
{
    pub fn profile_updated(&self, user_id: String, profile: Profile) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .notify_shell(NotifyOperation::ProfileUpdated { user_id, profile })
                .await;
        });
    }
}
