// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pixel layout selection for framebuffer transfers.

/// Transfer description of one pixel layout.
///
/// `format` and `component_type` are API-level tokens (e.g. the GL format
/// and type enums) passed through to the GPU read call untouched; the
/// engine only interprets `bytes_per_pixel`, which drives all stride
/// arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    pub format: u32,
    pub component_type: u32,
    pub bytes_per_pixel: u32,
}

impl PixelLayout {
    pub const fn new(format: u32, component_type: u32, bytes_per_pixel: u32) -> Self {
        Self {
            format,
            component_type,
            bytes_per_pixel,
        }
    }
}

/// Pixel sizes at or below this many bits read back as monochrome.
pub const MONOCHROME_CUTOFF_BITS: u32 = 8;

/// The two layouts a framebuffer can be read back as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferFormats {
    /// Full-color layout, used above the monochrome cutoff.
    pub color: PixelLayout,
    /// Single-channel layout, used at or below the cutoff.
    pub monochrome: PixelLayout,
}

impl FramebufferFormats {
    /// Pick the layout for a requested pixel size in bits.
    pub fn select(&self, pixel_size_bits: u32) -> PixelLayout {
        if pixel_size_bits > MONOCHROME_CUTOFF_BITS {
            self.color
        } else {
            self.monochrome
        }
    }
}

/// Supplies the framebuffer layouts of the active graphics context.
///
/// Queried once per read call; implementations may change their answer
/// between frames, e.g. after a context reconfiguration.
pub trait FormatProvider: Send + Sync {
    fn framebuffer_formats(&self) -> FramebufferFormats;
}

/// [`FormatProvider`] for contexts whose formats never change.
#[derive(Debug, Clone, Copy)]
pub struct StaticFormats(pub FramebufferFormats);

impl FormatProvider for StaticFormats {
    fn framebuffer_formats(&self) -> FramebufferFormats {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> FramebufferFormats {
        FramebufferFormats {
            color: PixelLayout::new(1, 2, 4),
            monochrome: PixelLayout::new(3, 4, 1),
        }
    }

    #[test]
    fn cutoff_boundary_selects_monochrome() {
        let f = formats();
        assert_eq!(f.select(MONOCHROME_CUTOFF_BITS), f.monochrome);
    }

    #[test]
    fn below_cutoff_selects_monochrome() {
        let f = formats();
        assert_eq!(f.select(4), f.monochrome);
        assert_eq!(f.select(0), f.monochrome);
    }

    #[test]
    fn above_cutoff_selects_color() {
        let f = formats();
        assert_eq!(f.select(9), f.color);
        assert_eq!(f.select(16), f.color);
        assert_eq!(f.select(32), f.color);
    }
}
