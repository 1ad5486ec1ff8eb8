// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::ClassKey;

#[tokio::test]
async fn logs_every_notify_event_kind_without_erroring() {
    let notifier = LoggingNotifier;
    let key = ClassKey::system("web");

    notifier.notify(NotifyEvent::JobAdded(key.clone())).await.unwrap();
    notifier.notify(NotifyEvent::JobRemoved(key.clone())).await.unwrap();
    notifier.notify(NotifyEvent::InstanceAdded { class: key.clone(), instance: "1".into() }).await.unwrap();
    notifier.notify(NotifyEvent::InstanceRemoved { class: key, instance: "1".into() }).await.unwrap();
}
