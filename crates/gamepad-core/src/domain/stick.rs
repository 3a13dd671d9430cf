//! Joystick drag geometry: radial clamping and axis scaling.
//!
//! An on-screen joystick reports a raw drag translation in points. The thumb
//! must not leave the joystick well, so the translation is clamped radially
//! to the stick's travel radius, preserving direction. The clamped position
//! is then scaled proportionally into the signed 16-bit axis range the wire
//! protocol uses, so that full deflection in any direction maps to ±32767
//! with the x:y ratio intact.

/// Maximum magnitude of a wire-protocol axis value.
pub const AXIS_MAX: i16 = 32767;

/// Geometry of one on-screen joystick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickGeometry {
    /// Travel radius in drag units: the furthest the thumb may move from
    /// the centre of the well.
    pub travel: f32,
}

impl Default for StickGeometry {
    fn default() -> Self {
        // Standard layout: 150 pt well with a 70 pt travel radius.
        Self { travel: 70.0 }
    }
}

impl StickGeometry {
    /// Creates a geometry with the given travel radius.
    ///
    /// # Panics
    ///
    /// Panics if `travel` is not strictly positive (a zero-travel stick has
    /// no defined scaling).
    pub fn new(travel: f32) -> Self {
        assert!(travel > 0.0, "stick travel radius must be positive");
        Self { travel }
    }

    /// Clamps a raw drag translation to the travel radius.
    ///
    /// Translations inside the radius pass through unchanged; translations
    /// beyond it are scaled back along the same direction so the distance
    /// equals `travel`. The x:y ratio is always preserved.
    pub fn clamp(&self, dx: f32, dy: f32) -> (f32, f32) {
        let distance = (dx * dx + dy * dy).sqrt();
        if distance > self.travel {
            let scale = self.travel / distance;
            (dx * scale, dy * scale)
        } else {
            (dx, dy)
        }
    }

    /// Converts a raw drag translation into wire-protocol axis values.
    ///
    /// The translation is clamped first, then scaled so that full deflection
    /// maps to ±[`AXIS_MAX`].
    pub fn to_axes(&self, dx: f32, dy: f32) -> (i16, i16) {
        let (cx, cy) = self.clamp(dx, dy);
        let x = (cx / self.travel * f32::from(AXIS_MAX)).round();
        let y = (cy / self.travel * f32::from(AXIS_MAX)).round();
        // Rounding can only land inside the axis range because the inputs
        // were clamped, but saturate anyway so the cast is total.
        (saturate(x), saturate(y))
    }
}

fn saturate(v: f32) -> i16 {
    v.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

// ── Tests ─────────────────────────────────────────────────────────────────────
