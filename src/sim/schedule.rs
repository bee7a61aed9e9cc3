//! One-shot delayed actions keyed to session time
//!
//! Tasks carry no references to actors; whoever runs a task re-checks the
//! state it depends on before acting.

use serde::{Deserialize, Serialize};

/// Deferred actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Start the next wave after a clear
    AdvanceWave,
    /// Spawn the boss once the warning banner has shown
    SpawnBoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Entry {
    due_ms: f64,
    task: Task,
}

/// Pending tasks, polled once per tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<Entry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once session time reaches `due_ms`
    pub fn schedule(&mut self, due_ms: f64, task: Task) {
        self.entries.push(Entry { due_ms, task });
    }

    /// Whether a task of this kind is pending
    pub fn is_pending(&self, task: Task) -> bool {
        self.entries.iter().any(|e| e.task == task)
    }

    /// Remove and return every task due at `now_ms`, earliest first.
    /// Ties keep scheduling order.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<Task> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due_ms <= now_ms {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| {
            a.due_ms
                .partial_cmp(&b.due_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        due.into_iter().map(|e| e.task).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
