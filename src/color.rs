//! Trait vector → display color
//!
//! Empathy drives red, pleasure drives green and cognition drives blue.

use crate::types::{Rgb, TraitVector};

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Base color for a trait vector
pub fn trait_color(vector: &TraitVector) -> Rgb {
    Rgb {
        r: channel(vector.empathy),
        g: channel(vector.pleasure),
        b: channel(vector.cognition),
    }
}

impl Rgb {
    /// CSS `rgb(r, g, b)` notation
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// `#rrggbb` notation
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
