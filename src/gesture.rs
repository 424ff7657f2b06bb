//! Pointer gesture classification.
//!
//! Raw press/motion/release events go in, semantic gestures come out. Times
//! are seconds from an arbitrary epoch supplied by the caller.

use crate::config::GestureConfig;
use crate::utils::{Position, Rectangle};
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Press { button: i32, position: Position },
    Release { button: i32, position: Position },
    Click { button: i32, position: Position },
    DoubleClick { button: i32, position: Position },
    Drag {
        button: i32,
        position: Position,
        delta: Position,
    },
    Move { position: Position },
    Enter { position: Position },
    Leave { position: Position },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastClick {
    pub button: i32,
    pub position: Position,
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseGestureState {
    pub down: bool,
    pub button: i32,
    pub press_position: Position,
    pub press_time: f64,
    pub position: Position,
    pub previous: Position,
    /// Path length travelled since the press.
    pub drag_distance: f32,
    pub dragging: bool,
    pub inside: bool,
    pub last_click: Option<LastClick>,
}

impl MouseGestureState {
    fn reset_press(&mut self) {
        self.down = false;
        self.drag_distance = 0.0;
        self.dragging = false;
    }
}

pub struct GestureClassifier {
    config: GestureConfig,
    // enter/leave are only reported against a region
    region: Option<Rectangle>,
    state: MouseGestureState,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            region: None,
            state: MouseGestureState::default(),
        }
    }

    pub fn with_region(mut self, region: Rectangle) -> Self {
        self.region = Some(region);
        self
    }

    pub fn set_region(&mut self, region: Option<Rectangle>) {
        self.region = region;
    }

    pub fn region(&self) -> Option<Rectangle> {
        self.region
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    pub fn state(&self) -> &MouseGestureState {
        &self.state
    }

    pub fn is_down(&self) -> bool {
        self.state.down
    }

    pub fn press(&mut self, button: i32, position: Position, now: f64) -> Vec<Gesture> {
        if self.state.down {
            return Vec::new();
        }
        let state = &mut self.state;
        state.down = true;
        state.button = button;
        state.press_position = position;
        state.press_time = now;
        state.previous = state.position;
        state.position = position;
        state.drag_distance = 0.0;
        state.dragging = false;
        vec![Gesture::Press { button, position }]
    }

    pub fn motion(&mut self, position: Position) -> Vec<Gesture> {
        let state = &mut self.state;
        state.previous = state.position;
        state.position = position;
        let delta = position - state.previous;

        if state.down {
            state.drag_distance += position.distance(state.previous);
            if state.dragging || state.drag_distance > self.config.drag_threshold {
                state.dragging = true;
                return vec![Gesture::Drag {
                    button: state.button,
                    position,
                    delta,
                }];
            }
            return vec![Gesture::Move { position }];
        }

        let mut gestures = vec![Gesture::Move { position }];
        if let Some(region) = self.region {
            let inside = region.contains(position);
            if inside && !state.inside {
                gestures.push(Gesture::Enter { position });
            } else if !inside && state.inside {
                gestures.push(Gesture::Leave { position });
            }
            state.inside = inside;
        }
        gestures
    }

    pub fn release(&mut self, button: i32, position: Position, now: f64) -> Vec<Gesture> {
        if !self.state.down || self.state.button != button {
            return Vec::new();
        }
        self.state.previous = self.state.position;
        self.state.position = position;

        let mut gestures = vec![Gesture::Release { button, position }];
        let state = &mut self.state;
        let is_click = !state.dragging
            && now - state.press_time <= self.config.click_max_duration
            && position.distance(state.press_position) <= self.config.click_max_distance;

        if is_click {
            gestures.push(Gesture::Click { button, position });
            let is_double = state.last_click.is_some_and(|last| {
                last.button == button
                    && now - last.time <= self.config.double_click_window
                    && position.distance(last.position) <= self.config.double_click_max_distance
            });
            if is_double {
                gestures.push(Gesture::DoubleClick { button, position });
                // a third click starts a new sequence
                state.last_click = None;
            } else {
                state.last_click = Some(LastClick {
                    button,
                    position,
                    time: now,
                });
            }
        } else {
            state.last_click = None;
        }

        state.reset_press();
        trace!("release {} -> {:?}", button, gestures);
        gestures
    }

    /// Releases a held button at the last known position so the state machine
    /// never stays stuck in a drag. No click is synthesized.
    pub fn focus_lost(&mut self) -> Vec<Gesture> {
        if !self.state.down {
            return Vec::new();
        }
        let gesture = Gesture::Release {
            button: self.state.button,
            position: self.state.position,
        };
        self.state.reset_press();
        self.state.last_click = None;
        vec![gesture]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(GestureConfig::default())
    }

    fn p(x: f32, y: f32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn quick_press_release_is_a_click() {
        let mut c = classifier();
        c.press(0, p(10.0, 10.0), 0.0);
        let out = c.release(0, p(11.0, 10.0), 0.1);
        assert_eq!(
            out,
            vec![
                Gesture::Release {
                    button: 0,
                    position: p(11.0, 10.0)
                },
                Gesture::Click {
                    button: 0,
                    position: p(11.0, 10.0)
                },
            ]
        );
        assert!(!c.is_down());
    }

    #[test]
    fn slow_release_is_not_a_click() {
        let mut c = classifier();
        c.press(0, p(0.0, 0.0), 0.0);
        let out = c.release(0, p(0.0, 0.0), 2.0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn second_click_fires_double_after_single() {
        let mut c = classifier();
        c.press(0, p(5.0, 5.0), 0.0);
        c.release(0, p(5.0, 5.0), 0.05);
        c.press(0, p(5.0, 5.0), 0.2);
        let out = c.release(0, p(6.0, 5.0), 0.25);
        assert!(matches!(out[1], Gesture::Click { .. }));
        assert!(matches!(out[2], Gesture::DoubleClick { .. }));

        // third click is a fresh single click
        c.press(0, p(5.0, 5.0), 0.3);
        let out = c.release(0, p(5.0, 5.0), 0.35);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn different_button_does_not_double_click() {
        let mut c = classifier();
        c.press(0, p(5.0, 5.0), 0.0);
        c.release(0, p(5.0, 5.0), 0.05);
        c.press(1, p(5.0, 5.0), 0.1);
        let out = c.release(1, p(5.0, 5.0), 0.15);
        assert!(!out.iter().any(|g| matches!(g, Gesture::DoubleClick { .. })));
    }

    #[test]
    fn drag_starts_past_threshold_and_suppresses_click() {
        let mut c = classifier();
        c.press(0, p(0.0, 0.0), 0.0);
        assert_eq!(
            c.motion(p(2.0, 0.0)),
            vec![Gesture::Move {
                position: p(2.0, 0.0)
            }]
        );
        let out = c.motion(p(6.0, 0.0));
        assert_eq!(
            out,
            vec![Gesture::Drag {
                button: 0,
                position: p(6.0, 0.0),
                delta: p(4.0, 0.0)
            }]
        );
        assert!(matches!(c.motion(p(6.5, 0.0))[0], Gesture::Drag { .. }));
        let out = c.release(0, p(0.0, 0.0), 0.1);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn press_while_down_is_ignored() {
        let mut c = classifier();
        assert_eq!(c.press(0, p(0.0, 0.0), 0.0).len(), 1);
        assert!(c.press(1, p(0.0, 0.0), 0.1).is_empty());
        assert!(c.release(1, p(0.0, 0.0), 0.2).is_empty());
        assert!(c.is_down());
    }

    #[test]
    fn enter_and_leave_are_edge_triggered() {
        let mut c = classifier().with_region(Rectangle::new(0.0, 0.0, 100.0, 100.0));
        assert!(c.motion(p(10.0, 10.0)).contains(&Gesture::Enter {
            position: p(10.0, 10.0)
        }));
        assert_eq!(c.motion(p(20.0, 20.0)).len(), 1);
        assert!(c.motion(p(200.0, 20.0)).contains(&Gesture::Leave {
            position: p(200.0, 20.0)
        }));
        assert_eq!(c.motion(p(300.0, 20.0)).len(), 1);
    }

    #[test]
    fn focus_loss_releases_at_last_position() {
        let mut c = classifier();
        c.press(2, p(1.0, 1.0), 0.0);
        c.motion(p(50.0, 50.0));
        let out = c.focus_lost();
        assert_eq!(
            out,
            vec![Gesture::Release {
                button: 2,
                position: p(50.0, 50.0)
            }]
        );
        assert!(!c.is_down());
        assert!(!c.state().dragging);
        assert!(c.focus_lost().is_empty());
    }
}
