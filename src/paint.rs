//! The painting state machine.
//!
//! `PaintController::tick` is one pass of the main loop: poll the fused
//! inputs, then apply each event in order. Knob events retune the brush,
//! pointer events move the cursor and paint, erase or click the tool column,
//! and a shake wipes the canvas.

use embedded_hal::delay::DelayNs;

use crate::bus::RegisterBus;
use crate::color::{map_range, spectrum, Color, RgbIndicator, LEVEL_FLOOR, LEVEL_MAX};
use crate::display::VideoLayers;
use crate::input::{
    Accelerometer, AnalogInput, InputEvent, InputFusion, Knob, PointerDevice, PointerSample,
};
use crate::ui::{self, UiAction};

pub const MIN_BRUSH_RADIUS: i32 = 1;
pub const MAX_BRUSH_RADIUS: i32 = 20;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaintState {
    Idle,
    Painting,
    Erasing,
    UiInteracting,
}

/// Runtime tunables.
#[derive(Clone, Debug)]
pub struct PaintConfig {
    /// Knob movement that counts as a deliberate turn.
    pub knob_hysteresis: f64,
    /// Rise in accelerometer magnitude (g) that counts as a shake.
    pub shake_threshold: f32,
    /// Cursor pixels per pointer report, per axis.
    pub cursor_step: i32,
    pub cursor_max_x: i32,
    pub cursor_max_y: i32,
    pub start_x: i32,
    pub start_y: i32,
    pub brush_radius: i32,
    pub brush_color: Color,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            knob_hysteresis: 0.008,
            shake_threshold: 1.0,
            cursor_step: 4,
            cursor_max_x: 630,
            cursor_max_y: 450,
            start_x: 320,
            start_y: 240,
            brush_radius: 5,
            brush_color: Color::RED,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Brush {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub color: Color,
}

/// Knob position to brush radius.
pub fn knob_radius(level: f64) -> i32 {
    let (lo, hi) = (MIN_BRUSH_RADIUS as f64, MAX_BRUSH_RADIUS as f64);
    let r = map_range(level, LEVEL_FLOOR, LEVEL_MAX, lo, hi);
    (r as i32).clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS)
}

pub struct PaintController<B, L> {
    layers: VideoLayers<B>,
    led: L,
    config: PaintConfig,
    brush: Brush,
    state: PaintState,
    left_held: bool,
    welcome_visible: bool,
    pointer_enabled: bool,
    selected_border: Option<usize>,
}

impl<B, L> PaintController<B, L>
where
    B: RegisterBus + Clone,
    L: RgbIndicator,
{
    pub fn new(layers: VideoLayers<B>, led: L, config: PaintConfig) -> Self {
        let brush = Brush {
            x: config.start_x,
            y: config.start_y,
            radius: config.brush_radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS),
            color: config.brush_color,
        };
        Self {
            layers,
            led,
            config,
            brush,
            state: PaintState::Idle,
            left_held: false,
            welcome_visible: false,
            pointer_enabled: false,
            selected_border: None,
        }
    }

    /// Blank every layer, draw the screen and run the intro. Without a
    /// pointer the intro is replaced by a notice and painting stays off.
    pub fn start(&mut self, delay: &mut impl DelayNs, has_pointer: bool) {
        log::info!("pixelpoet starting");
        self.layers.blank_all();

        ui::render_canvas(&mut self.layers.frame);
        ui::draw_swatch(&mut self.layers.frame, self.brush.color);

        self.pointer_enabled = has_pointer;
        if has_pointer {
            ui::show_welcome(&mut self.layers.osd, delay);
            ui::draw_trademark(&mut self.layers.osd);
            self.welcome_visible = true;
        } else {
            log::error!("no pointer device, painting disabled");
            self.layers.osd.clear();
            ui::draw_trademark(&mut self.layers.osd);
            ui::show_no_mouse(&mut self.layers.osd);
        }
    }

    /// One loop iteration.
    pub fn tick<P, A, G>(&mut self, input: &mut InputFusion<P, A, G>)
    where
        P: PointerDevice,
        A: AnalogInput,
        G: Accelerometer,
    {
        for event in input.poll() {
            match event {
                InputEvent::ColorKnob(level) => self.on_color_knob(level),
                InputEvent::BrushKnob(level) => self.on_brush_knob(level),
                InputEvent::Pointer(sample) => self.on_pointer(sample, input),
                InputEvent::Shake => {
                    log::info!("shake detected");
                    self.reset_canvas();
                }
            }
        }
    }

    fn on_color_knob(&mut self, level: f64) {
        let s = spectrum(level);
        self.led.set_duty(s.duty);
        self.set_color(Color::from_levels(s.levels));
    }

    fn on_brush_knob(&mut self, level: f64) {
        self.brush.radius = knob_radius(level);
        self.selected_border = None;
        ui::select_brush_border(&mut self.layers.frame, None);
    }

    fn on_pointer<P, A, G>(&mut self, s: PointerSample, input: &mut InputFusion<P, A, G>)
    where
        P: PointerDevice,
        A: AnalogInput,
        G: Accelerometer,
    {
        if !self.pointer_enabled {
            return;
        }
        if self.welcome_visible {
            ui::dismiss_welcome(&mut self.layers.osd);
            self.welcome_visible = false;
        }

        // device up is screen up
        let step = self.config.cursor_step;
        let x = self.brush.x + step * (s.dx as i32).signum();
        let y = self.brush.y - step * (s.dy as i32).signum();
        self.set_cursor(x, y);
        self.layers.mouse.bypass(false);
        self.layers.mouse.move_to(self.brush.x, self.brush.y);

        let clicked = s.left && !self.left_held;
        self.left_held = s.left;

        let Brush { x, y, radius, color } = self.brush;
        if ui::in_canvas(x, y, radius) {
            self.state = PaintState::Idle;
            if s.left {
                self.layers.frame.fill_circle(x, y, radius, color);
                self.state = PaintState::Painting;
            }
            if s.right {
                self.layers.frame.fill_circle(x, y, radius, Color::WHITE);
                self.state = PaintState::Erasing;
            }
        } else if s.left {
            self.state = PaintState::UiInteracting;
            if clicked {
                if let Some(action) = ui::hit_test(x, y) {
                    self.apply(action, input);
                }
            }
        } else {
            self.state = PaintState::Idle;
        }
    }

    fn apply<P, A, G>(&mut self, action: UiAction, input: &mut InputFusion<P, A, G>)
    where
        P: PointerDevice,
        A: AnalogInput,
        G: Accelerometer,
    {
        log::debug!("ui action {:?}", action);
        match action {
            UiAction::Brush { radius, border } => {
                self.brush.radius = radius;
                input.release(Knob::Brush);
                self.selected_border = Some(border);
                ui::select_brush_border(&mut self.layers.frame, Some(border));
            }
            UiAction::Color(color) => {
                self.set_color(color);
                input.release(Knob::Color);
            }
            UiAction::Clear => self.reset_canvas(),
        }
    }

    fn set_color(&mut self, color: Color) {
        if color != self.brush.color {
            self.brush.color = color;
            ui::draw_swatch(&mut self.layers.frame, color);
        }
    }

    /// Repaint the whole screen, keeping brush settings.
    pub fn reset_canvas(&mut self) {
        log::info!("canvas reset");
        ui::render_canvas(&mut self.layers.frame);
        ui::draw_swatch(&mut self.layers.frame, self.brush.color);
        self.selected_border = None;
    }

    /// Place the cursor, clamped to the configured range.
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.brush.x = x.clamp(0, self.config.cursor_max_x);
        self.brush.y = y.clamp(0, self.config.cursor_max_y);
    }

    pub fn state(&self) -> PaintState {
        self.state
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn selected_border(&self) -> Option<usize> {
        self.selected_border
    }

    pub fn welcome_visible(&self) -> bool {
        self.welcome_visible
    }

    pub fn layers_mut(&mut self) -> &mut VideoLayers<B> {
        &mut self.layers
    }
}
