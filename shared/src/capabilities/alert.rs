use serde::{Deserialize, Serialize};

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;

/// Blocking, dismiss-only notices. Nothing is reported back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertOperation {
    Notice { message: String },
}

impl Operation for AlertOperation {
    type Output = ();
}

#[derive(Capability)]
pub struct Alert<Ev> {
    context: CapabilityContext<AlertOperation, Ev>,
}

impl<Ev> Alert<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<AlertOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn notice(&self, message: impl Into<String>) {
        let operation = AlertOperation::Notice {
            message: message.into(),
        };

        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
