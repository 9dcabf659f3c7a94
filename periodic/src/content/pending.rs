// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use std::future::Future;
use std::sync::Mutex;
use tokio::task::JoinHandle;

/// Background persistence tasks that responses do not wait for.
#[derive(Debug, Default)]
pub struct PendingWrites {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl PendingWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` on the runtime and keeps its handle until the next `settle`.
    pub fn track<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        match self.handles.lock() {
            Ok(mut handles) => {
                handles.retain(|existing| !existing.is_finished());
                handles.push(handle);
            }
            Err(_) => warn!("Pending write list lock poisoned; task runs untracked"),
        }
    }

    /// Waits for every task tracked so far.
    pub async fn settle(&self) {
        let handles = match self.handles.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(_) => {
                warn!("Pending write list lock poisoned; nothing to settle");
                return;
            }
        };
        for handle in handles {
            if let Err(err) = handle.await {
                warn!("Background write task failed: {}", err);
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.handles.lock() {
            Ok(handles) => handles.iter().filter(|handle| !handle.is_finished()).count(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
