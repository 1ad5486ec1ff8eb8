// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stand-in for the §6.3 notification transport: no D-Bus-equivalent
//! listener is in scope for this workspace, so registry/instance changes
//! are traced instead of pushed anywhere.

use async_trait::async_trait;
use oj_adapters::{NotifyAdapter, NotifyError, NotifyEvent};
use tracing::info;

#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl NotifyAdapter for LoggingNotifier {
    async fn notify(&self, event: NotifyEvent) -> Result<(), NotifyError> {
        match event {
            NotifyEvent::JobAdded(key) => info!(job = %key, "job added"),
            NotifyEvent::JobRemoved(key) => info!(job = %key, "job removed"),
            NotifyEvent::InstanceAdded { class, instance } => info!(job = %class, %instance, "instance added"),
            NotifyEvent::InstanceRemoved { class, instance } => info!(job = %class, %instance, "instance removed"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
