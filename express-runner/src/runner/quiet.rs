// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Silencing the panic hook while unit stages run.
//!
//! Panics raised by a stage are captured and reported as results, so the default hook's message
//! and backtrace would only duplicate the report. While at least one stage is running anywhere in
//! the process, a hook is installed that stays quiet for threads inside a stage and forwards
//! everything else to the hook that was installed before. Once the last stage finishes, the
//! previous hook is put back.

use std::{
    cell::Cell,
    panic::{self, PanicHookInfo},
    sync::{Arc, Mutex, PoisonError},
};

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

struct HookState {
    depth: usize,
    previous: Option<Arc<PanicHook>>,
}

static HOOK_STATE: Mutex<HookState> = Mutex::new(HookState {
    depth: 0,
    previous: None,
});

thread_local! {
    static IN_STAGE: Cell<bool> = const { Cell::new(false) };
}

/// Keeps panics on the current thread quiet until dropped.
pub(super) struct QuietPanics {
    was_in_stage: bool,
}

impl QuietPanics {
    pub(super) fn enter() -> Self {
        let mut state = HOOK_STATE.lock().unwrap_or_else(PoisonError::into_inner);
        if state.depth == 0 {
            let previous = Arc::new(panic::take_hook());
            let forward = Arc::clone(&previous);
            panic::set_hook(Box::new(move |info| {
                // TLS may already be gone if the thread is being torn down.
                if !IN_STAGE.try_with(Cell::get).unwrap_or(false) {
                    forward(info);
                }
            }));
            state.previous = Some(previous);
        }
        state.depth += 1;

        Self {
            was_in_stage: IN_STAGE.replace(true),
        }
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        IN_STAGE.set(self.was_in_stage);

        let mut state = HOOK_STATE.lock().unwrap_or_else(PoisonError::into_inner);
        state.depth -= 1;
        if state.depth > 0 {
            return;
        }
        let Some(previous) = state.previous.take() else {
            return;
        };

        // Dropping the quiet hook releases its handle on the previous one.
        drop(panic::take_hook());
        match Arc::try_unwrap(previous) {
            Ok(hook) => panic::set_hook(hook),
            Err(shared) => panic::set_hook(Box::new(move |info| shared(info))),
        }
    }
}
