#![forbid(unsafe_code)]

//! Interaction state machine.
//!
//! Consumes normalised [`InputEvent`]s and produces high-level [`Action`]s.
//!
//! ```text
//!            press                    |motion - anchor| >= threshold
//!   IDLE ───────────────▶ PRESSED ─────────────────────────────▶ DRAGGING
//!    ▲                       │                                      │
//!    └───────── release ─────┴────────────── release ───────────────┘
//! ```
//!
//! Scroll and key events never change state. The machine also owns the idle
//! timestamp used for auto-rotation: it is reset whenever `feed` returns at
//! least one action.
//!
//! Rotations are expressed in cells; the caller converts them to radians.

use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::event::{InputEvent, KeyCode, KeyEvent, Position, ScrollDirection};

/// Manhattan distance (cells) a press must travel before it becomes a drag.
pub const DRAG_THRESHOLD: u32 = 2;
/// Per-axis cap on a single motion's rotation, in cells.
pub const MAX_DRAG_STEP: i32 = 15;
/// Rotation applied by one arrow key press, in cells.
pub const KEY_ROTATE_STEP: f64 = 10.0;
/// Zoom change per wheel notch or zoom key.
pub const ZOOM_STEP: f64 = 0.1;
/// Time without input before auto-rotation resumes.
pub const IDLE_THRESHOLD: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputConfig {
    pub drag_threshold: u32,
    pub max_drag_step: i32,
    pub key_rotate_step: f64,
    pub zoom_step: f64,
    pub idle_threshold: Duration,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DRAG_THRESHOLD,
            max_drag_step: MAX_DRAG_STEP,
            key_rotate_step: KEY_ROTATE_STEP,
            zoom_step: ZOOM_STEP,
            idle_threshold: IDLE_THRESHOLD,
        }
    }
}

/// A high-level interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// A press crossed the drag threshold. Carries no rotation of its own.
    DragStart,
    /// Rotate by a delta in cells: `dx` drives yaw, `dy` drives pitch.
    Rotate { dx: f64, dy: f64 },
    /// Zoom by a signed delta; positive zooms in.
    Zoom(f64),
    Quit,
}

/// At most two actions come out of a single event.
pub type Actions = SmallVec<[Action; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Pressed,
    Dragging,
}

/// Lives from press to release (or invalidation).
#[derive(Debug, Clone, Copy)]
struct DragSession {
    anchor: Position,
    last: Position,
    dragging: bool,
}

#[derive(Debug)]
pub struct InputStateMachine {
    config: InputConfig,
    session: Option<DragSession>,
    last_action: Instant,
    finished: bool,
}

impl InputStateMachine {
    /// Create a machine whose idle timer starts at `now`.
    #[must_use]
    pub fn new(config: InputConfig, now: Instant) -> Self {
        Self {
            config,
            session: None,
            last_action: now,
            finished: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        match self.session {
            None => DragState::Idle,
            Some(DragSession {
                dragging: false, ..
            }) => DragState::Pressed,
            Some(DragSession { dragging: true, .. }) => DragState::Dragging,
        }
    }

    /// True once a quit action has been emitted; further events are ignored.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Idle long enough for auto-rotation, with no button held.
    #[must_use]
    pub fn is_idle(&self, now: Instant) -> bool {
        self.session.is_none()
            && now.saturating_duration_since(self.last_action) >= self.config.idle_threshold
    }

    /// Drop any in-flight drag (called when the viewport changes size).
    pub fn invalidate(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("drag session invalidated");
        }
    }

    /// Feed one event observed at `now`.
    pub fn feed(&mut self, event: InputEvent, now: Instant) -> Actions {
        let mut actions = Actions::new();
        if self.finished {
            return actions;
        }
        match event {
            InputEvent::ButtonPress { pos, .. } => {
                self.session = Some(DragSession {
                    anchor: pos,
                    last: pos,
                    dragging: false,
                });
            }
            InputEvent::ButtonRelease { .. } => {
                self.session = None;
            }
            InputEvent::Motion { pos } => self.motion(pos, &mut actions),
            InputEvent::Scroll { direction } => {
                let step = self.config.zoom_step;
                actions.push(Action::Zoom(match direction {
                    ScrollDirection::Up => step,
                    ScrollDirection::Down => -step,
                }));
            }
            InputEvent::Key(key) => {
                if let Some(action) = self.key_action(key) {
                    actions.push(action);
                }
            }
        }
        if !actions.is_empty() {
            self.last_action = now;
        }
        if actions.contains(&Action::Quit) {
            self.finished = true;
            self.session = None;
        }
        actions
    }

    fn motion(&mut self, pos: Position, actions: &mut Actions) {
        let cap = self.config.max_drag_step;
        let threshold = self.config.drag_threshold;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.dragging {
            if session.anchor.manhattan(pos) < threshold {
                return;
            }
            session.dragging = true;
            actions.push(Action::DragStart);
        }
        let dx = (i32::from(pos.x) - i32::from(session.last.x)).clamp(-cap, cap);
        let dy = (i32::from(pos.y) - i32::from(session.last.y)).clamp(-cap, cap);
        session.last = pos;
        if dx != 0 || dy != 0 {
            actions.push(Action::Rotate {
                dx: f64::from(dx),
                dy: f64::from(dy),
            });
        }
    }

    fn key_action(&self, key: KeyEvent) -> Option<Action> {
        let step = self.config.key_rotate_step;
        let zoom = self.config.zoom_step;
        let action = match key.code {
            KeyCode::Left => Action::Rotate { dx: -step, dy: 0.0 },
            KeyCode::Right => Action::Rotate { dx: step, dy: 0.0 },
            KeyCode::Up => Action::Rotate { dx: 0.0, dy: -step },
            KeyCode::Down => Action::Rotate { dx: 0.0, dy: step },
            KeyCode::Char('c') if key.ctrl() => Action::Quit,
            KeyCode::Char('q' | 'Q') => Action::Quit,
            KeyCode::Char('+' | '=') => Action::Zoom(zoom),
            KeyCode::Char('-' | '_') => Action::Zoom(-zoom),
            _ => return None,
        };
        Some(action)
    }
}
