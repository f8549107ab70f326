use serde::{Deserialize, Serialize};

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;

use crate::model::PreviewHandle;

/// Previews are created by the shell when a file is picked; the core
/// only ever tells it when one is no longer referenced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PreviewOperation {
    Release { handle: String },
}

impl Operation for PreviewOperation {
    type Output = ();
}

#[derive(Capability)]
pub struct Preview<Ev> {
    context: CapabilityContext<PreviewOperation, Ev>,
}

impl<Ev> Preview<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<PreviewOperation, Ev>) -> Self {
        Self { context }
    }

    /// Consumes the handle so it cannot be released twice.
    pub fn release(&self, handle: PreviewHandle) {
        let operation = PreviewOperation::Release {
            handle: handle.into_inner(),
        };

        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
