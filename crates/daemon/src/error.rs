// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced across the control surface: the core/engine error kinds
//! plus the control-surface-only additions of spec §7.

use oj_engine::EngineError;
use oj_storage::WalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("journal error: {0}")]
    Wal(#[from] WalError),

    /// Cross-session modification attempt. Nothing in this workspace
    /// enforces session ownership on a control call yet (no transport sits
    /// in front of [`crate::control::Control`] to authenticate a caller
    /// against a session), but the variant is part of the control-surface
    /// contract so a future transport has somewhere to report it.
    #[error("permission denied")]
    PermissionDenied,
}
