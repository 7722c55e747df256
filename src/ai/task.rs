//! Per-actor task queue.

use std::collections::VecDeque;

use rhai::{Dynamic, INT};

use crate::actor::ActorId;

/// Name reported by an idle queue.
pub(crate) const IDLE_TASK: &str = "none";

/// Data a task carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPayload {
    /// Nothing.
    None,
    /// A number pushed by a script (often an actor id).
    Integer(i64),
    /// An actor, set by the host itself.
    Actor(ActorId),
}

impl TaskPayload {
    /// The value scripts see through `target()`.
    #[must_use]
    pub fn to_dynamic(&self) -> Dynamic {
        match self {
            Self::None => Dynamic::UNIT,
            Self::Integer(n) => Dynamic::from_int(*n),
            Self::Actor(id) => Dynamic::from_int(INT::from(id.0)),
        }
    }
}

/// A named goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Routine that runs while the task is active.
    pub name: String,
    /// Payload.
    pub payload: TaskPayload,
}

impl Task {
    /// A task running `name`.
    pub fn new(name: impl Into<String>, payload: TaskPayload) -> Self {
        Self { name: name.into(), payload }
    }
}

/// Ordered goals. The head is the active task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQueue(VecDeque<Task>);

impl TaskQueue {
    /// Insert at the head when `position` is 0, append otherwise.
    pub fn push(&mut self, position: i64, task: Task) {
        if position == 0 {
            self.0.push_front(task);
        } else {
            self.0.push_back(task);
        }
    }

    /// Remove the active task.
    pub fn pop(&mut self) -> Option<Task> {
        self.0.pop_front()
    }

    /// The active task.
    #[must_use]
    pub fn head(&self) -> Option<&Task> {
        self.0.front()
    }

    /// Name of the active task, or `"none"`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.front().map_or(IDLE_TASK, |t| t.name.as_str())
    }

    /// Queued tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the actor is idle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tasks from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.0.iter()
    }

    /// Drop every task.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(queue: &TaskQueue) -> Vec<&str> {
        queue.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_push_front_is_lifo() {
        let mut queue = TaskQueue::default();
        queue.push(0, Task::new("X", TaskPayload::None));
        queue.push(0, Task::new("Y", TaskPayload::None));
        assert_eq!(queue.name(), "Y");
        queue.pop();
        assert_eq!(queue.name(), "X");
    }

    #[test]
    fn test_push_back_keeps_order() {
        let mut queue = TaskQueue::default();
        queue.push(1, Task::new("X", TaskPayload::None));
        queue.push(1, Task::new("Y", TaskPayload::None));
        assert_eq!(names(&queue), ["X", "Y"]);
    }

    #[test]
    fn test_idle_queue() {
        let mut queue = TaskQueue::default();
        assert_eq!(queue.name(), IDLE_TASK);
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_payload_as_script_value() {
        assert!(TaskPayload::None.to_dynamic().is_unit());
        assert_eq!(TaskPayload::Integer(7).to_dynamic().as_int(), Ok(7));
        assert_eq!(TaskPayload::Actor(ActorId(12)).to_dynamic().as_int(), Ok(12));
    }
}
