//! Window and input service.
//!
//! Keeps the drawing rectangle locked to an aspect ratio inside the host
//! viewport, owns one surface per layer and turns host input into
//! [`InputEvent`]s in rectangle-local coordinates. Events wait in a queue
//! until the guest polls.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use canopy_hostapi::{Display, Surface};
use canopy_primitives::geometry::{fit_aspect_ratio, Rect};
use canopy_primitives::wire::{CursorStyle, MouseAction, MouseButton};
use canopy_primitives::{InputEvent, KeyboardEvent, MouseEvent, WheelEvent};

use crate::event_queue::EventQueue;

/// Input as observed by the host, in viewport coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Key(KeyboardEvent),
    MouseMove { x: f32, y: f32 },
    MouseDown { button: MouseButton, x: f32, y: f32 },
    MouseUp { button: MouseButton, x: f32, y: f32 },
    Wheel(WheelEvent),
}

pub struct WindowService {
    display: Box<dyn Display>,
    surfaces: BTreeMap<i32, Box<dyn Surface>>,
    aspect_ratio: f32,
    rect: Rect,
    initialized: bool,
    click_distance: f32,
    pressed_at: HashMap<MouseButton, (f32, f32)>,
    events: EventQueue<InputEvent>,
}

impl WindowService {
    pub fn new(display: Box<dyn Display>, aspect_ratio: f32, click_distance: f32) -> Self {
        let (vw, vh) = display.viewport_size();
        Self {
            display,
            surfaces: BTreeMap::new(),
            aspect_ratio,
            rect: fit_aspect_ratio(vw, vh, aspect_ratio),
            initialized: false,
            click_distance,
            pressed_at: HashMap::new(),
            events: EventQueue::plain(),
        }
    }

    /// Start accepting input. Only the first call has an effect.
    pub fn init(&mut self, aspect_ratio: f32) {
        if self.initialized {
            log::debug!("window already initialized, ignoring aspect ratio {aspect_ratio}");
            return;
        }
        self.initialized = true;
        self.set_aspect_ratio(aspect_ratio);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.handle_resize();
    }

    /// Recompute the drawing rectangle from the current viewport and resize
    /// every surface.
    pub fn handle_resize(&mut self) {
        let (vw, vh) = self.display.viewport_size();
        self.rect = fit_aspect_ratio(vw, vh, self.aspect_ratio);
        for surface in self.surfaces.values_mut() {
            surface.set_bounds(self.rect);
        }
        self.attach();
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn width(&self) -> f32 {
        self.rect.width
    }

    pub fn height(&self) -> f32 {
        self.rect.height
    }

    pub fn set_title(&mut self, title: &str) {
        self.display.set_title(title);
    }

    /// Surface for `layer`, allocated on first use.
    pub fn surface(&mut self, layer: i32) -> &mut dyn Surface {
        let (display, rect) = (&mut self.display, self.rect);
        let mut stacking: Vec<i32> = self.surfaces.keys().copied().collect();
        match self.surfaces.entry(layer) {
            Entry::Occupied(entry) => entry.into_mut().as_mut(),
            Entry::Vacant(entry) => {
                log::debug!("allocating surface for layer {layer}");
                let surface = display.create_surface(layer, rect);
                let at = stacking.partition_point(|l| *l < layer);
                stacking.insert(at, layer);
                display.attach_surfaces(&stacking);
                entry.insert(surface).as_mut()
            }
        }
    }

    pub fn layers(&self) -> Vec<i32> {
        self.surfaces.keys().copied().collect()
    }

    /// Erase every surface and reset its cursor.
    pub fn clear(&mut self) {
        for surface in self.surfaces.values_mut() {
            surface.clear();
            surface.set_cursor(CursorStyle::Default);
        }
    }

    pub fn set_cursor(&mut self, cursor: CursorStyle) {
        for surface in self.surfaces.values_mut() {
            surface.set_cursor(cursor);
        }
    }

    fn attach(&mut self) {
        let layers = self.layers();
        self.display.attach_surfaces(&layers);
    }

    // ── Input ──

    /// Queue the events produced by one host input. Input arriving before
    /// `init` is dropped.
    pub fn handle_input(&mut self, input: RawInput) {
        if !self.initialized {
            return;
        }
        match input {
            RawInput::Key(key) => self.events.push(InputEvent::Keyboard(key)),
            RawInput::MouseMove { x, y } => {
                let (x, y) = self.to_local(x, y);
                self.push_mouse(MouseAction::Move, None, x, y);
            }
            RawInput::MouseDown { button, x, y } => {
                let (x, y) = self.to_local(x, y);
                self.pressed_at.insert(button, (x, y));
                self.push_mouse(MouseAction::Down, Some(button), x, y);
            }
            RawInput::MouseUp { button, x, y } => {
                let (x, y) = self.to_local(x, y);
                let press = self.pressed_at.remove(&button);
                self.push_mouse(MouseAction::Up, Some(button), x, y);
                if let Some((px, py)) = press {
                    if (x - px).hypot(y - py) < self.click_distance {
                        self.push_mouse(MouseAction::Click, Some(button), x, y);
                    }
                }
            }
            RawInput::Wheel(wheel) => {
                let (x, y) = self.to_local(wheel.x, wheel.y);
                self.events.push(InputEvent::Wheel(WheelEvent { x, y, ..wheel }));
            }
        }
    }

    fn to_local(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.rect.x, y - self.rect.y)
    }

    fn push_mouse(&mut self, action: MouseAction, button: Option<MouseButton>, x: f32, y: f32) {
        self.events.push(InputEvent::Mouse(MouseEvent { action, button, x, y }));
    }

    /// Take every queued event.
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_hostapi::{RecordingDisplay, SurfaceOp};
    use canopy_primitives::wire::KeyboardAction;
    use canopy_primitives::Modifiers;

    fn window(width: f32, height: f32) -> (WindowService, RecordingDisplay) {
        let display = RecordingDisplay::new(width, height);
        let mut window = WindowService::new(Box::new(display.clone()), 16.0 / 9.0, 5.0);
        window.init(16.0 / 9.0);
        (window, display)
    }

    fn actions(events: &[InputEvent]) -> Vec<MouseAction> {
        events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Mouse(m) => Some(m.action),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_aspect_geometry() {
        let (window, _) = window(1000.0, 500.0);
        assert_eq!(window.width(), 888.0);
        assert_eq!(window.height(), 500.0);
        assert_eq!(window.rect().x, 56.0);
        assert_eq!(window.rect().y, 0.0);
    }

    #[test]
    fn test_click_synthesized_after_up() {
        let (mut window, _) = window(1000.0, 500.0);
        window.handle_input(RawInput::MouseDown { button: MouseButton::Left, x: 66.0, y: 10.0 });
        window.handle_input(RawInput::MouseUp { button: MouseButton::Left, x: 68.0, y: 11.0 });
        let events = window.poll_events();
        assert_eq!(
            actions(&events),
            vec![MouseAction::Down, MouseAction::Up, MouseAction::Click]
        );
        match &events[2] {
            InputEvent::Mouse(m) => {
                assert_eq!(m.button, Some(MouseButton::Left));
                assert_eq!((m.x, m.y), (12.0, 11.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_no_click_when_far() {
        let (mut window, _) = window(1000.0, 500.0);
        window.handle_input(RawInput::MouseDown { button: MouseButton::Right, x: 100.0, y: 100.0 });
        window.handle_input(RawInput::MouseUp { button: MouseButton::Right, x: 105.0, y: 100.0 });
        assert_eq!(actions(&window.poll_events()), vec![MouseAction::Down, MouseAction::Up]);
    }

    #[test]
    fn test_press_cleared_on_release() {
        let (mut window, _) = window(1000.0, 500.0);
        window.handle_input(RawInput::MouseDown { button: MouseButton::Left, x: 100.0, y: 100.0 });
        window.handle_input(RawInput::MouseUp { button: MouseButton::Left, x: 100.0, y: 100.0 });
        window.handle_input(RawInput::MouseUp { button: MouseButton::Left, x: 100.0, y: 100.0 });
        assert_eq!(
            actions(&window.poll_events()),
            vec![MouseAction::Down, MouseAction::Up, MouseAction::Click, MouseAction::Up]
        );
    }

    #[test]
    fn test_click_tracked_per_button() {
        let (mut window, _) = window(1000.0, 500.0);
        window.handle_input(RawInput::MouseDown { button: MouseButton::Left, x: 100.0, y: 100.0 });
        window.handle_input(RawInput::MouseUp { button: MouseButton::Middle, x: 100.0, y: 100.0 });
        assert_eq!(actions(&window.poll_events()), vec![MouseAction::Down, MouseAction::Up]);
    }

    #[test]
    fn test_poll_drains() {
        let (mut window, _) = window(800.0, 450.0);
        window.handle_input(RawInput::Key(KeyboardEvent {
            action: KeyboardAction::Down,
            code: "KeyA".into(),
            text: Some('a'),
            modifiers: Modifiers::default(),
        }));
        assert_eq!(window.poll_events().len(), 1);
        assert!(window.poll_events().is_empty());
    }

    #[test]
    fn test_input_ignored_before_init() {
        let display = RecordingDisplay::new(800.0, 450.0);
        let mut window = WindowService::new(Box::new(display), 16.0 / 9.0, 5.0);
        window.handle_input(RawInput::MouseMove { x: 1.0, y: 1.0 });
        assert!(window.poll_events().is_empty());
    }

    #[test]
    fn test_init_only_once() {
        let (mut window, _) = window(1000.0, 500.0);
        window.init(1.0);
        assert_eq!(window.width(), 888.0);
        window.set_aspect_ratio(1.0);
        assert_eq!((window.width(), window.height()), (500.0, 500.0));
    }

    #[test]
    fn test_surfaces_allocated_lazily_and_stacked() {
        let (mut window, display) = window(1600.0, 900.0);
        window.surface(3);
        window.surface(-1);
        window.surface(3);
        assert_eq!(display.created_layers(), vec![3, -1]);
        assert_eq!(display.stacking(), vec![-1, 3]);
    }

    #[test]
    fn test_new_surface_is_the_one_returned() {
        let (mut window, display) = window(1600.0, 900.0);
        window.surface(1);
        window.surface(4).save();
        window.surface(2).restore();
        window.surface(4).clear();
        assert_eq!(display.created_layers(), vec![1, 4, 2]);
        assert_eq!(display.stacking(), vec![1, 2, 4]);
        assert_eq!(
            display.ops_on(4),
            vec![SurfaceOp::Bounds(window.rect()), SurfaceOp::Save, SurfaceOp::Clear]
        );
        assert_eq!(display.ops_on(2).last(), Some(&SurfaceOp::Restore));
    }

    #[test]
    fn test_resize_updates_surfaces() {
        let (mut window, display) = window(1600.0, 900.0);
        window.surface(0);
        display.set_viewport(800.0, 900.0);
        window.handle_resize();
        let resized = Rect::new(0.0, 225.0, 800.0, 450.0);
        assert_eq!(window.rect(), resized);
        assert_eq!(display.ops_on(0).last(), Some(&SurfaceOp::Bounds(resized)));
    }

    #[test]
    fn test_wheel_coordinates_are_local() {
        let (mut window, _) = window(1000.0, 500.0);
        window.handle_input(RawInput::Wheel(WheelEvent {
            x: 60.0,
            y: 5.0,
            delta_x: 0.0,
            delta_y: -3.0,
            delta_z: 0.0,
            delta_mode: canopy_primitives::wire::WheelDeltaMode::Line,
        }));
        match &window.poll_events()[0] {
            InputEvent::Wheel(w) => assert_eq!((w.x, w.y, w.delta_y), (4.0, 5.0, -3.0)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
