//! Background check for entry permissions about to lapse

use crate::notice::Notice;
use crate::ScreenContext;
use guard_portal_resources::{paths, CancelFlag, EntryPermission, ResourceError};
use log::{debug, error};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Warn about every permission the backend reports as expiring soon
///
/// Failures are logged and surfaced as a warning notice; this never blocks
/// a screen.
pub async fn check_expiring(ctx: &ScreenContext) -> Vec<EntryPermission> {
    let session = ctx.session().get();
    let token = session.as_ref().map(|s| s.token.as_str());

    match ctx
        .resources
        .fetch_list::<EntryPermission>(paths::ENTRIES_EXPIRING_SOON, &[], token)
        .await
    {
        Ok(entries) => {
            for entry in &entries {
                ctx.notify(Notice::warning(format!(
                    "Permission for {} is expiring soon!",
                    entry.name
                )));
            }
            entries
        }
        Err(ResourceError::NotFound) => Vec::new(),
        Err(err) => {
            error!("Error checking expiring permissions: {}", err);
            ctx.notify(Notice::warning("Could not check expiring permissions"));
            Vec::new()
        }
    }
}

/// Periodic [`check_expiring`] running on the tokio runtime
///
/// Stops when [`stop`](Self::stop) is called or the watch is dropped.
#[derive(Debug)]
pub struct ExpiryWatch {
    cancel: CancelFlag,
    handle: JoinHandle<()>,
}

impl ExpiryWatch {
    pub fn spawn(ctx: ScreenContext, every: Duration) -> Self {
        let cancel = CancelFlag::new();
        let flag = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                if flag.is_cancelled() {
                    break;
                }
                let expiring = check_expiring(&ctx).await;
                debug!("{} permissions expiring soon", expiring.len());
            }
        });

        Self { cancel, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

impl Drop for ExpiryWatch {
    fn drop(&mut self) {
        self.stop();
    }
}
