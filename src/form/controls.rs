//! Bounded numeric controls backing the form's sliders and step pickers
//!
//! Every setter clamps to the control's bounds and snaps to its step grid,
//! so a value read back from a control is always one the user could have
//! reached by dragging the slider.

/// Integer slider with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntSlider {
    value: i64,
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl IntSlider {
    pub fn new(value: i64, min: i64, max: i64, step: i64) -> Self {
        let mut slider = Self {
            value: min,
            min,
            max,
            step: step.max(1),
        };
        slider.set(value);
        slider
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Set the value, returning what was actually stored
    pub fn set(&mut self, value: i64) -> i64 {
        self.value = snap_int(value, self.min, self.max, self.step);
        self.value
    }

    /// Move by a whole number of steps (negative moves down)
    pub fn nudge(&mut self, steps: i64) -> i64 {
        self.set(self.value.saturating_add(steps.saturating_mul(self.step)))
    }
}

/// Floating point slider with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatSlider {
    value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FloatSlider {
    pub fn new(value: f64, min: f64, max: f64, step: f64) -> Self {
        let mut slider = Self {
            value: min,
            min,
            max,
            step,
        };
        slider.set(value);
        slider
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set(&mut self, value: f64) -> f64 {
        self.value = snap_float(value, self.min, self.max, self.step);
        self.value
    }

    pub fn nudge(&mut self, steps: i64) -> f64 {
        self.set(self.value + steps as f64 * self.step)
    }

    /// Number of decimals needed to display a value on this slider's grid
    pub fn precision(&self) -> usize {
        step_decimals(self.step) as usize
    }
}

/// Integer range slider; `low <= high` always holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntRange {
    low: i64,
    high: i64,
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl IntRange {
    pub fn new(low: i64, high: i64, min: i64, max: i64, step: i64) -> Self {
        let mut range = Self {
            low: min,
            high: max,
            min,
            max,
            step: step.max(1),
        };
        range.set(low, high);
        range
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.low, self.high)
    }

    pub fn set(&mut self, low: i64, high: i64) -> (i64, i64) {
        let a = snap_int(low, self.min, self.max, self.step);
        let b = snap_int(high, self.min, self.max, self.step);
        self.low = a.min(b);
        self.high = a.max(b);
        self.bounds()
    }

    /// Move the lower handle; it stops at the upper handle
    pub fn nudge_low(&mut self, steps: i64) -> (i64, i64) {
        let low = snap_int(
            self.low.saturating_add(steps.saturating_mul(self.step)),
            self.min,
            self.max,
            self.step,
        );
        self.low = low.min(self.high);
        self.bounds()
    }

    /// Move the upper handle; it stops at the lower handle
    pub fn nudge_high(&mut self, steps: i64) -> (i64, i64) {
        let high = snap_int(
            self.high.saturating_add(steps.saturating_mul(self.step)),
            self.min,
            self.max,
            self.step,
        );
        self.high = high.max(self.low);
        self.bounds()
    }
}

/// Floating point range slider; `low <= high` always holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRange {
    low: f64,
    high: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FloatRange {
    pub fn new(low: f64, high: f64, min: f64, max: f64, step: f64) -> Self {
        let mut range = Self {
            low: min,
            high: max,
            min,
            max,
            step,
        };
        range.set(low, high);
        range
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    pub fn set(&mut self, low: f64, high: f64) -> (f64, f64) {
        let a = snap_float(low, self.min, self.max, self.step);
        let b = snap_float(high, self.min, self.max, self.step);
        self.low = a.min(b);
        self.high = a.max(b);
        self.bounds()
    }

    pub fn nudge_low(&mut self, steps: i64) -> (f64, f64) {
        let low = snap_float(
            self.low + steps as f64 * self.step,
            self.min,
            self.max,
            self.step,
        );
        self.low = low.min(self.high);
        self.bounds()
    }

    pub fn nudge_high(&mut self, steps: i64) -> (f64, f64) {
        let high = snap_float(
            self.high + steps as f64 * self.step,
            self.min,
            self.max,
            self.step,
        );
        self.high = high.max(self.low);
        self.bounds()
    }

    pub fn precision(&self) -> usize {
        step_decimals(self.step) as usize
    }
}

/// A fixed set of options with one selected (dropdown)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choice<T: Copy + PartialEq + 'static> {
    options: &'static [T],
    index: usize,
}

impl<T: Copy + PartialEq + 'static> Choice<T> {
    /// Create a choice with the first option selected
    pub fn new(options: &'static [T]) -> Self {
        Self { options, index: 0 }
    }

    pub fn value(&self) -> T {
        self.options[self.index]
    }

    pub fn options(&self) -> &'static [T] {
        self.options
    }

    /// Select an option by value; unknown values leave the selection unchanged
    pub fn select(&mut self, value: T) -> bool {
        match self.options.iter().position(|o| *o == value) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    /// Cycle through the options, wrapping at both ends
    pub fn nudge(&mut self, steps: i64) -> T {
        let len = self.options.len() as i64;
        self.index = (self.index as i64 + steps).rem_euclid(len) as usize;
        self.value()
    }
}

fn snap_int(value: i64, min: i64, max: i64, step: i64) -> i64 {
    let clamped = value.clamp(min, max);
    let steps = ((clamped - min) as f64 / step as f64).round() as i64;
    (min + steps * step).min(max)
}

fn snap_float(value: f64, min: f64, max: f64, step: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    let clamped = value.clamp(min, max);
    let snapped = if step > 0.0 {
        min + ((clamped - min) / step).round() * step
    } else {
        clamped
    };
    // Strip accumulated float noise (0.015000000000000001 -> 0.015)
    let factor = 10f64.powi(step_decimals(step));
    ((snapped * factor).round() / factor).clamp(min, max)
}

fn step_decimals(step: f64) -> i32 {
    if step <= 0.0 || step >= 1.0 {
        return 0;
    }
    (-step.log10()).ceil() as i32
}
