//! Length units used by DrawingML.
//!
//! All geometry is stored in English Metric Units (EMU). Typographic sizes are
//! stored in points and converted to the hundredths-of-a-point form the markup
//! expects only when written.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;

/// Resolution assumed for images that carry no density information.
pub const DEFAULT_IMAGE_DPI: u32 = 72;

/// A length in English Metric Units.
pub type Emu = i64;

/// Convert inches to EMU, rounding to the nearest unit.
#[inline]
pub fn inches(value: f64) -> Emu {
    (value * EMUS_PER_INCH as f64).round() as Emu
}

/// Convert points to EMU, rounding to the nearest unit.
#[inline]
pub fn pt(value: f64) -> Emu {
    (value * EMUS_PER_PT as f64).round() as Emu
}

#[inline]
pub fn emu_to_inches(emu: Emu) -> f64 {
    emu as f64 / EMUS_PER_INCH as f64
}

#[inline]
pub fn px_to_emu(px: u32, dpi: u32) -> Emu {
    ((px as f64) * EMUS_PER_INCH as f64 / dpi as f64) as Emu
}

/// Points expressed in hundredths, as used by `sz` and `spcPts`.
#[inline]
pub fn centipoints(points: f64) -> i64 {
    (points * 100.0).round() as i64
}

/// Scale `other_native` by the ratio `target / native`, keeping the aspect ratio.
///
/// Returns `target` itself when the native extent is degenerate.
#[inline]
pub fn scale_to(target: Emu, native: Emu, other_native: Emu) -> Emu {
    if native <= 0 {
        return target;
    }
    ((other_native as f64) * (target as f64) / (native as f64)).round() as Emu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(10.0), 9_144_000);
        assert_eq!(inches(5.625), 5_143_500);
        assert_eq!(inches(-0.6), -548_640);
    }

    #[test]
    fn test_points() {
        assert_eq!(pt(1.0), 12_700);
        assert_eq!(centipoints(22.0), 2200);
        assert_eq!(centipoints(8.0), 800);
    }

    #[test]
    fn test_px_to_emu() {
        assert_eq!(px_to_emu(72, 72), EMUS_PER_INCH);
        assert_eq!(px_to_emu(96, 96), EMUS_PER_INCH);
    }

    #[test]
    fn test_scale_to_keeps_ratio() {
        // 400x200 image scaled to a 3in height doubles as width
        let h = inches(3.0);
        assert_eq!(scale_to(h, px_to_emu(200, 72), px_to_emu(400, 72)), inches(6.0));
        assert_eq!(scale_to(h, 0, 10), h);
    }
}
