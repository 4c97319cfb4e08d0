//! Dominant colour extraction.
//!
//! The image is quantised with modified median cut (MMCQ) over a 5-bit
//! colour histogram. The resulting swatches are then classified into six
//! named targets (vibrant/muted × normal/light/dark) by saturation and
//! lightness.

use std::path::Path;

use image::{DynamicImage, GenericImageView};

use crate::card::CardColors;
use crate::error::PaletteError;

/// Maximum number of quantised swatches.
pub const MAX_COLORS: usize = 64;

/// Long-edge size images are scaled down to before sampling.
const SAMPLE_EDGE: u32 = 256;

const SIGBITS: u32 = 5;
const RSHIFT: u32 = 8 - SIGBITS;
const HIST_SIDE: usize = 1 << SIGBITS;

const FRACT_BY_POPULATION: f64 = 0.75;

const TARGET_DARK_LUMA: f64 = 0.26;
const MAX_DARK_LUMA: f64 = 0.45;
const MIN_LIGHT_LUMA: f64 = 0.55;
const TARGET_LIGHT_LUMA: f64 = 0.74;
const MIN_NORMAL_LUMA: f64 = 0.3;
const TARGET_NORMAL_LUMA: f64 = 0.5;
const MAX_NORMAL_LUMA: f64 = 0.7;
const TARGET_MUTED_SATURATION: f64 = 0.3;
const MAX_MUTED_SATURATION: f64 = 0.4;
const TARGET_VIBRANT_SATURATION: f64 = 1.0;
const MIN_VIBRANT_SATURATION: f64 = 0.35;

const WEIGHT_SATURATION: f64 = 3.0;
const WEIGHT_LUMA: f64 = 6.5;
const WEIGHT_POPULATION: f64 = 0.5;

const FALLBACK_PRIMARY: [u8; 3] = [0, 0, 0];
const FALLBACK_SECONDARY: [u8; 3] = [255, 255, 255];
const DARK_TEXT: &str = "#111111";
const LIGHT_TEXT: &str = "#ffffff";

/// A representative colour and how many sampled pixels it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    /// Average colour of the pixels in this swatch.
    pub rgb: [u8; 3],
    /// Number of sampled pixels. Zero for synthesised swatches.
    pub population: u32,
}

impl Swatch {
    /// Hue, saturation and lightness, each in `[0, 1]`.
    #[must_use]
    pub fn hsl(&self) -> (f64, f64, f64) {
        rgb_to_hsl(self.rgb)
    }

    /// Lower-case `#rrggbb`.
    #[must_use]
    pub fn hex(&self) -> String {
        to_hex(self.rgb)
    }

    fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        Self {
            rgb: hsl_to_rgb(h, s, l),
            population: 0,
        }
    }
}

/// The six named swatches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Palette {
    /// Saturated, mid lightness.
    pub vibrant: Option<Swatch>,
    /// Saturated, light.
    pub light_vibrant: Option<Swatch>,
    /// Saturated, dark.
    pub dark_vibrant: Option<Swatch>,
    /// Desaturated, mid lightness.
    pub muted: Option<Swatch>,
    /// Desaturated, light.
    pub light_muted: Option<Swatch>,
    /// Desaturated, dark.
    pub dark_muted: Option<Swatch>,
}

struct Target {
    min_luma: f64,
    target_luma: f64,
    max_luma: f64,
    min_saturation: f64,
    target_saturation: f64,
    max_saturation: f64,
}

const VIBRANT: Target = Target {
    min_luma: MIN_NORMAL_LUMA,
    target_luma: TARGET_NORMAL_LUMA,
    max_luma: MAX_NORMAL_LUMA,
    min_saturation: MIN_VIBRANT_SATURATION,
    target_saturation: TARGET_VIBRANT_SATURATION,
    max_saturation: 1.0,
};
const LIGHT_VIBRANT: Target = Target {
    min_luma: MIN_LIGHT_LUMA,
    target_luma: TARGET_LIGHT_LUMA,
    max_luma: 1.0,
    ..VIBRANT
};
const DARK_VIBRANT: Target = Target {
    min_luma: 0.0,
    target_luma: TARGET_DARK_LUMA,
    max_luma: MAX_DARK_LUMA,
    ..VIBRANT
};
const MUTED: Target = Target {
    min_saturation: 0.0,
    target_saturation: TARGET_MUTED_SATURATION,
    max_saturation: MAX_MUTED_SATURATION,
    ..VIBRANT
};
const LIGHT_MUTED: Target = Target {
    min_luma: MIN_LIGHT_LUMA,
    target_luma: TARGET_LIGHT_LUMA,
    max_luma: 1.0,
    ..MUTED
};
const DARK_MUTED: Target = Target {
    min_luma: 0.0,
    target_luma: TARGET_DARK_LUMA,
    max_luma: MAX_DARK_LUMA,
    ..MUTED
};

impl Palette {
    /// Quantise and classify an image.
    #[must_use]
    pub fn from_image(img: &DynamicImage) -> Self {
        let (w, h) = img.dimensions();
        let sampled = if w.max(h) > SAMPLE_EDGE {
            img.thumbnail(SAMPLE_EDGE, SAMPLE_EDGE)
        } else {
            img.clone()
        };
        let rgba = sampled.to_rgba8();
        let pixels = rgba
            .pixels()
            .filter(|p| p[3] >= 125 && !(p[0] > 250 && p[1] > 250 && p[2] > 250))
            .map(|p| [p[0], p[1], p[2]]);
        Self::from_swatches(&quantize(pixels, MAX_COLORS))
    }

    /// Classify swatches into the six targets, then fill gaps from neighbours.
    #[must_use]
    pub fn from_swatches(swatches: &[Swatch]) -> Self {
        let max_population = swatches.iter().map(|s| s.population).max().unwrap_or(0);
        let mut palette = Self::default();
        let mut taken: Vec<Swatch> = Vec::new();
        let mut pick = |target: &Target| {
            let best = find_best(swatches, target, max_population, &taken);
            if let Some(s) = best {
                taken.push(s);
            }
            best
        };
        palette.vibrant = pick(&VIBRANT);
        palette.light_vibrant = pick(&LIGHT_VIBRANT);
        palette.dark_vibrant = pick(&DARK_VIBRANT);
        palette.muted = pick(&MUTED);
        palette.light_muted = pick(&LIGHT_MUTED);
        palette.dark_muted = pick(&DARK_MUTED);
        palette.fill_missing();
        palette
    }

    fn fill_missing(&mut self) {
        let with_luma = |s: Swatch, luma: f64| {
            let (h, sat, _) = s.hsl();
            Swatch::from_hsl(h, sat, luma)
        };
        let with_saturation = |s: Swatch, saturation: f64| {
            let (h, _, l) = s.hsl();
            Swatch::from_hsl(h, saturation, l)
        };

        if self.vibrant.is_none() && self.dark_vibrant.is_none() && self.light_vibrant.is_none() {
            self.dark_vibrant = self.dark_muted.map(|s| with_luma(s, TARGET_DARK_LUMA));
            self.light_vibrant = self.light_muted.map(|s| with_luma(s, TARGET_LIGHT_LUMA));
        }
        if self.vibrant.is_none() {
            self.vibrant = self
                .dark_vibrant
                .or(self.light_vibrant)
                .map(|s| with_luma(s, TARGET_NORMAL_LUMA));
        }
        if let Some(vibrant) = self.vibrant {
            self.dark_vibrant
                .get_or_insert_with(|| with_luma(vibrant, TARGET_DARK_LUMA));
            self.light_vibrant
                .get_or_insert_with(|| with_luma(vibrant, TARGET_LIGHT_LUMA));
            self.muted
                .get_or_insert_with(|| with_saturation(vibrant, TARGET_MUTED_SATURATION));
        }
        if self.dark_muted.is_none() {
            self.dark_muted = self
                .dark_vibrant
                .map(|s| with_saturation(s, TARGET_MUTED_SATURATION));
        }
        if self.light_muted.is_none() {
            self.light_muted = self
                .light_vibrant
                .map(|s| with_saturation(s, TARGET_MUTED_SATURATION));
        }
    }

    /// Reduce the palette to the three card colours.
    #[must_use]
    pub fn card_colors(&self) -> CardColors {
        let primary = self
            .vibrant
            .or(self.muted)
            .or(self.dark_vibrant)
            .map_or(FALLBACK_PRIMARY, |s| s.rgb);
        let secondary = self
            .light_vibrant
            .or(self.light_muted)
            .or(self.dark_muted)
            .map_or(FALLBACK_SECONDARY, |s| s.rgb);

        CardColors {
            primary: to_hex(primary),
            secondary: to_hex(secondary),
            text: text_color_for(primary).to_string(),
        }
    }
}

/// Extract the card colours from an image file.
///
/// # Errors
///
/// Returns [`PaletteError::Decode`] if the file cannot be read or decoded.
pub fn extract_colors(path: &Path) -> Result<CardColors, PaletteError> {
    let img = image::open(path).map_err(|source| PaletteError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let colors = Palette::from_image(&img).card_colors();
    tracing::debug!(
        "Extracted colours from {}: primary {} secondary {} text {}",
        path.display(),
        colors.primary,
        colors.secondary,
        colors.text
    );
    Ok(colors)
}

/// Dark text on light backgrounds, white text otherwise.
#[must_use]
pub fn text_color_for(background: [u8; 3]) -> &'static str {
    let [r, g, b] = background.map(f64::from);
    let luminance = (r * 0.299 + g * 0.587 + b * 0.114) / 255.0;
    if luminance > 0.6 {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

fn find_best(
    swatches: &[Swatch],
    target: &Target,
    max_population: u32,
    taken: &[Swatch],
) -> Option<Swatch> {
    let mut best: Option<(f64, Swatch)> = None;
    for swatch in swatches {
        let (_, sat, luma) = swatch.hsl();
        let in_range = (target.min_saturation..=target.max_saturation).contains(&sat)
            && (target.min_luma..=target.max_luma).contains(&luma);
        if !in_range || taken.contains(swatch) {
            continue;
        }
        let population = if max_population == 0 {
            0.0
        } else {
            f64::from(swatch.population) / f64::from(max_population)
        };
        let value = (inverse_diff(sat, target.target_saturation) * WEIGHT_SATURATION
            + inverse_diff(luma, target.target_luma) * WEIGHT_LUMA
            + population * WEIGHT_POPULATION)
            / (WEIGHT_SATURATION + WEIGHT_LUMA + WEIGHT_POPULATION);
        if !best.is_some_and(|(v, _)| value <= v) {
            best = Some((value, *swatch));
        }
    }
    best.map(|(_, s)| s)
}

fn inverse_diff(value: f64, target: f64) -> f64 {
    1.0 - (value - target).abs()
}

// ---------------------------------------------------------------------------
// Quantisation
// ---------------------------------------------------------------------------

struct Histogram {
    counts: Vec<u32>,
    sums: Vec<[u64; 3]>,
}

impl Histogram {
    fn index(r: usize, g: usize, b: usize) -> usize {
        (r << (2 * SIGBITS)) + (g << SIGBITS) + b
    }

    fn from_pixels(pixels: impl Iterator<Item = [u8; 3]>) -> Self {
        let size = HIST_SIDE * HIST_SIDE * HIST_SIDE;
        let mut hist = Self {
            counts: vec![0; size],
            sums: vec![[0; 3]; size],
        };
        for [r, g, b] in pixels {
            let idx = Self::index(
                usize::from(r >> RSHIFT),
                usize::from(g >> RSHIFT),
                usize::from(b >> RSHIFT),
            );
            hist.counts[idx] += 1;
            hist.sums[idx][0] += u64::from(r);
            hist.sums[idx][1] += u64::from(g);
            hist.sums[idx][2] += u64::from(b);
        }
        hist
    }
}

/// An axis-aligned box in the 5-bit colour cube, bounds inclusive.
#[derive(Debug, Clone, Copy)]
struct ColorBox {
    lo: [usize; 3],
    hi: [usize; 3],
    count: u32,
}

impl ColorBox {
    fn volume(&self) -> u64 {
        (0..3)
            .map(|c| u64::try_from(self.hi[c] - self.lo[c] + 1).unwrap_or(u64::MAX))
            .product()
    }

    fn bins(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (self.lo[0]..=self.hi[0]).flat_map(move |r| {
            (self.lo[1]..=self.hi[1])
                .flat_map(move |g| (self.lo[2]..=self.hi[2]).map(move |b| [r, g, b]))
        })
    }

    /// Shrink to the populated bins and recount. `None` if empty.
    fn fit(mut self, hist: &Histogram) -> Option<Self> {
        let mut lo = [usize::MAX; 3];
        let mut hi = [0usize; 3];
        let mut count = 0u32;
        for bin in self.bins() {
            let n = hist.counts[Histogram::index(bin[0], bin[1], bin[2])];
            if n == 0 {
                continue;
            }
            count += n;
            for c in 0..3 {
                lo[c] = lo[c].min(bin[c]);
                hi[c] = hi[c].max(bin[c]);
            }
        }
        if count == 0 {
            return None;
        }
        self.lo = lo;
        self.hi = hi;
        self.count = count;
        Some(self)
    }

    fn splittable(&self) -> bool {
        self.count > 1 && self.volume() > 1
    }

    /// Split at the population median along the widest axis.
    fn split(&self, hist: &Histogram) -> Option<(Self, Self)> {
        if !self.splittable() {
            return None;
        }
        let axis = (0..3)
            .max_by_key(|&c| self.hi[c] - self.lo[c])
            .unwrap_or(0);

        let mut cumulative = Vec::with_capacity(self.hi[axis] - self.lo[axis] + 1);
        let mut running = 0u32;
        for slice in self.lo[axis]..=self.hi[axis] {
            running += self
                .bins()
                .filter(|bin| bin[axis] == slice)
                .map(|bin| hist.counts[Histogram::index(bin[0], bin[1], bin[2])])
                .sum::<u32>();
            cumulative.push(running);
        }

        let half = (self.count / 2).max(1);
        let last = cumulative.len() - 1;
        let offset = cumulative[..last]
            .iter()
            .position(|&c| c >= half)
            .unwrap_or(last.saturating_sub(1));
        let cut = self.lo[axis] + offset;

        let mut left = *self;
        left.hi[axis] = cut;
        let mut right = *self;
        right.lo[axis] = cut + 1;
        Some((left.fit(hist)?, right.fit(hist)?))
    }

    fn average(&self, hist: &Histogram) -> [u8; 3] {
        let mut sum = [0u64; 3];
        let mut n = 0u64;
        for bin in self.bins() {
            let idx = Histogram::index(bin[0], bin[1], bin[2]);
            n += u64::from(hist.counts[idx]);
            for c in 0..3 {
                sum[c] += hist.sums[idx][c];
            }
        }
        if n == 0 {
            return [0, 0, 0];
        }
        sum.map(|s| u8::try_from((s + n / 2) / n).unwrap_or(u8::MAX))
    }
}

/// Reduce pixels to at most `max_colors` swatches.
#[must_use]
pub fn quantize(pixels: impl Iterator<Item = [u8; 3]>, max_colors: usize) -> Vec<Swatch> {
    let hist = Histogram::from_pixels(pixels);
    let whole = ColorBox {
        lo: [0; 3],
        hi: [HIST_SIDE - 1; 3],
        count: 0,
    };
    let Some(root) = whole.fit(&hist) else {
        return Vec::new();
    };

    let mut boxes = vec![root];
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let first_phase = (FRACT_BY_POPULATION * max_colors as f64).ceil() as usize;
    split_until(&mut boxes, &hist, first_phase, |b| u64::from(b.count));
    split_until(&mut boxes, &hist, max_colors, |b| u64::from(b.count) * b.volume());

    let mut swatches: Vec<Swatch> = boxes
        .iter()
        .map(|b| Swatch {
            rgb: b.average(&hist),
            population: b.count,
        })
        .collect();
    swatches.sort_by_key(|s| std::cmp::Reverse(s.population));
    swatches
}

fn split_until<F>(boxes: &mut Vec<ColorBox>, hist: &Histogram, target: usize, priority: F)
where
    F: Fn(&ColorBox) -> u64,
{
    while boxes.len() < target {
        let Some(pos) = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.splittable())
            .max_by_key(|(_, b)| priority(b))
            .map(|(i, _)| i)
        else {
            break;
        };
        let candidate = boxes.swap_remove(pos);
        match candidate.split(hist) {
            Some((left, right)) => {
                boxes.push(left);
                boxes.push(right);
            }
            None => {
                boxes.push(candidate);
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Colour space helpers
// ---------------------------------------------------------------------------

/// Format an RGB triple as lower-case `#rrggbb`.
#[must_use]
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn rgb_to_hsl(rgb: [u8; 3]) -> (f64, f64, f64) {
    let [r, g, b] = rgb.map(|v| f64::from(v) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn channel(v: f64) -> u8 {
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    }
    if s.abs() < f64::EPSILON {
        let v = channel(l);
        return [v, v, v];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        channel(hue_to_rgb(p, q, h)),
        channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    ]
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
