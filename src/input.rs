//! Input fusion for the painting loop.
//!
//! This module provides:
//! - the collaborator traits for the raw devices (`PointerDevice`,
//!   `AnalogInput`, `Accelerometer`)
//! - `KnobTracker`, a sticky hysteresis filter for noisy potentiometers
//! - `ShakeDetector`, a one-shot spike detector on accelerometer magnitude
//! - `InputFusion`, which polls all of them once per cycle and returns the
//!   resulting events in a fixed order: knobs, pointer, shake
//!
//! Everything here is polled from the main loop; no interrupts, no heap.

use heapless::Vec;

use crate::paint::PaintConfig;

/// One decoded movement/button report. `dy > 0` means the device moved up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerSample {
    pub left: bool,
    pub right: bool,
    pub dx: i16,
    pub dy: i16,
}

pub trait PointerDevice {
    /// Next report, or `None` if nothing arrived since the last poll.
    fn poll(&mut self) -> Option<PointerSample>;
}

/// The two analog knobs, by ADC channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Knob {
    Color = 0,
    Brush = 1,
}

impl Knob {
    pub const fn channel(self) -> u8 {
        self as u8
    }
}

pub trait AnalogInput {
    /// Normalized knob position in `[0, 1]`.
    fn read(&mut self, knob: Knob) -> f64;
}

pub trait Accelerometer {
    fn read_magnitude(&mut self) -> f32;
}

// A missing sensor reads as a constant, so it never shakes.
impl<G: Accelerometer> Accelerometer for Option<G> {
    fn read_magnitude(&mut self) -> f32 {
        self.as_mut().map_or(0.0, |g| g.read_magnitude())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputEvent {
    ColorKnob(f64),
    BrushKnob(f64),
    Pointer(PointerSample),
    Shake,
}

/// Most events a single poll can produce.
pub const MAX_EVENTS: usize = 4;

pub type Events = Vec<InputEvent, MAX_EVENTS>;

// Knob tracking with a sticky "active" flag.
//
// Small jitter never activates a knob. Once a reading moves by more than the
// hysteresis it counts as a deliberate turn, and from then on every change is
// reported until `release` is called.
#[derive(Clone, Debug)]
pub struct KnobTracker {
    value: f64,
    active: bool,
    hysteresis: f64,
}

impl KnobTracker {
    pub fn new(initial: f64, hysteresis: f64) -> Self {
        Self { value: initial, active: false, hysteresis }
    }

    /// Feed a reading; returns it when the knob should be acted on.
    pub fn update(&mut self, reading: f64) -> Option<f64> {
        if libm::fabs(reading - self.value) > self.hysteresis {
            self.active = true;
        }
        if reading != self.value {
            self.value = reading;
            if self.active {
                return Some(reading);
            }
        }
        None
    }

    pub fn release(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Gesture state: last magnitude and the rise that counts as a shake.
#[derive(Clone, Debug)]
pub struct ShakeDetector {
    previous: f32,
    threshold: f32,
}

impl ShakeDetector {
    pub fn new(initial: f32, threshold: f32) -> Self {
        Self { previous: initial, threshold }
    }

    /// True once per rising spike above the threshold.
    pub fn update(&mut self, magnitude: f32) -> bool {
        let spike = magnitude - self.previous;
        if magnitude != self.previous {
            self.previous = magnitude;
        }
        spike > self.threshold
    }
}

pub struct InputFusion<P, A, G> {
    pointer: Option<P>,
    analog: A,
    accel: G,
    color: KnobTracker,
    brush: KnobTracker,
    shake: ShakeDetector,
}

impl<P, A, G> InputFusion<P, A, G>
where
    P: PointerDevice,
    A: AnalogInput,
    G: Accelerometer,
{
    /// Takes one baseline reading from every analog source so a device at
    /// rest produces no events on the first poll.
    pub fn new(pointer: Option<P>, mut analog: A, mut accel: G, config: &PaintConfig) -> Self {
        let color = KnobTracker::new(analog.read(Knob::Color), config.knob_hysteresis);
        let brush = KnobTracker::new(analog.read(Knob::Brush), config.knob_hysteresis);
        let shake = ShakeDetector::new(accel.read_magnitude(), config.shake_threshold);
        Self { pointer, analog, accel, color, brush, shake }
    }

    pub fn has_pointer(&self) -> bool {
        self.pointer.is_some()
    }

    /// Drop a knob back to inactive, e.g. after a discrete UI choice.
    pub fn release(&mut self, knob: Knob) {
        match knob {
            Knob::Color => self.color.release(),
            Knob::Brush => self.brush.release(),
        }
    }

    pub fn knob_active(&self, knob: Knob) -> bool {
        match knob {
            Knob::Color => self.color.is_active(),
            Knob::Brush => self.brush.is_active(),
        }
    }

    /// Sample every source once.
    pub fn poll(&mut self) -> Events {
        let mut events = Events::new();

        if let Some(v) = self.color.update(self.analog.read(Knob::Color)) {
            push(&mut events, InputEvent::ColorKnob(v));
        }
        if let Some(v) = self.brush.update(self.analog.read(Knob::Brush)) {
            push(&mut events, InputEvent::BrushKnob(v));
        }

        if let Some(sample) = self.pointer.as_mut().and_then(|p| p.poll()) {
            push(&mut events, InputEvent::Pointer(sample));
        }

        if self.shake.update(self.accel.read_magnitude()) {
            push(&mut events, InputEvent::Shake);
        }

        events
    }
}

// At most one event per source, so the buffer never fills.
fn push(events: &mut Events, ev: InputEvent) {
    if events.push(ev).is_err() {
        log::warn!("input event dropped: {:?}", ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample, ScriptedAccel, ScriptedKnobs, ScriptedPointer};

    fn fusion(
        pointer: Option<ScriptedPointer>,
        knobs: ScriptedKnobs,
        accel: ScriptedAccel,
    ) -> InputFusion<ScriptedPointer, ScriptedKnobs, ScriptedAccel> {
        InputFusion::new(pointer, knobs, accel, &PaintConfig::default())
    }

    #[test]
    fn small_knob_jitter_never_activates() {
        let mut k = KnobTracker::new(0.5, 0.008);
        for r in [0.505, 0.498, 0.503, 0.5, 0.507, 0.5] {
            assert_eq!(k.update(r), None, "reading {r}");
        }
        assert!(!k.is_active());
        assert_eq!(k.value(), 0.5);
    }

    #[test]
    fn knob_stays_active_until_released() {
        let mut k = KnobTracker::new(0.5, 0.008);
        assert_eq!(k.update(0.52), Some(0.52));
        // below the hysteresis, but the knob is already being turned
        assert_eq!(k.update(0.521), Some(0.521));
        assert_eq!(k.update(0.521), None);

        k.release();
        assert!(!k.is_active());
        assert_eq!(k.update(0.525), None);
        assert_eq!(k.update(0.6), Some(0.6));
    }

    #[test]
    fn one_shake_per_rising_spike() {
        let mut d = ShakeDetector::new(0.0, 1.0);
        let hits: std::vec::Vec<bool> = [0.2, 0.3, 1.5].iter().map(|&m| d.update(m)).collect();
        assert_eq!(hits, vec![false, false, true]);
        // staying high or falling is not a shake
        assert!(!d.update(1.5));
        assert!(!d.update(0.1));
        // exactly the threshold is not enough
        assert!(!d.update(0.0));
        assert!(!d.update(1.0));
    }

    #[test]
    fn poll_orders_knobs_then_pointer_then_shake() {
        let pointer = ScriptedPointer::new([Some(sample(true, false, 1, 0))]);
        // first reading of each list is the baseline
        let knobs = ScriptedKnobs::new(&[0.1, 0.4], &[0.1, 0.9]);
        let accel = ScriptedAccel::new(&[1.0, 2.5]);
        let mut input = fusion(Some(pointer), knobs, accel);

        let events = input.poll();
        assert_eq!(
            events.as_slice(),
            &[
                InputEvent::ColorKnob(0.4),
                InputEvent::BrushKnob(0.9),
                InputEvent::Pointer(sample(true, false, 1, 0)),
                InputEvent::Shake,
            ]
        );

        // nothing new on the next cycle
        assert!(input.poll().is_empty());
    }

    #[test]
    fn baseline_reading_is_not_a_shake() {
        let mut input = fusion(None, ScriptedKnobs::idle(), ScriptedAccel::new(&[1.3, 1.3]));
        assert!(input.poll().is_empty());
    }

    #[test]
    fn missing_accelerometer_never_shakes() {
        let mut accel: Option<ScriptedAccel> = None;
        assert_eq!(accel.read_magnitude(), 0.0);
        let mut input = InputFusion::new(
            None::<ScriptedPointer>,
            ScriptedKnobs::idle(),
            accel,
            &PaintConfig::default(),
        );
        assert!(input.poll().is_empty());
    }

    #[test]
    fn missing_pointer_never_reports() {
        let mut input = fusion(None, ScriptedKnobs::idle(), ScriptedAccel::new(&[]));
        assert!(!input.has_pointer());
        for _ in 0..3 {
            assert!(input.poll().is_empty());
        }
    }

    #[test]
    fn release_is_per_knob() {
        let knobs = ScriptedKnobs::new(&[0.0, 0.5, 0.505], &[0.0, 0.5, 0.505]);
        let mut input = fusion(None, knobs, ScriptedAccel::new(&[]));
        assert_eq!(input.poll().len(), 2);

        input.release(Knob::Brush);
        assert!(!input.knob_active(Knob::Brush));
        assert!(input.knob_active(Knob::Color));
        assert_eq!(input.poll().as_slice(), &[InputEvent::ColorKnob(0.505)]);
    }
}
