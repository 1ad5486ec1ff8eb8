// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane change notifications: `JobAdded`/`JobRemoved`/
//! `InstanceAdded`/`InstanceRemoved` pushed to whoever is watching the
//! registry and instance table over the control surface.

mod noop;

pub use noop::NoOpNotifyAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use oj_core::ClassKey;
use thiserror::Error;

/// A registry or instance-table change worth telling watchers about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    JobAdded(ClassKey),
    JobRemoved(ClassKey),
    InstanceAdded { class: ClassKey, instance: String },
    InstanceRemoved { class: ClassKey, instance: String },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for pushing [`NotifyEvent`]s to subscribers of the control
/// surface.
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn notify(&self, event: NotifyEvent) -> Result<(), NotifyError>;
}
