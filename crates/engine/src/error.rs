// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level errors, composing the core and process-adapter error kinds.

use oj_core::CoreError;
use oj_adapters::ProcessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("instance name expansion failed: undefined variable ${0}")]
    UndefinedVariable(String),

    #[error("detected invariant violation: {0}")]
    InternalInvariant(String),
}
