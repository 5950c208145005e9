//! Single-color synthesis.
//!
//! A color is either drawn uniformly from the full 24-bit space or derived
//! from one of the config's seeds by rotating the seed's hue by a random
//! offset of at most [`HUE_THRESHOLD`] degrees. Saturation and lightness of a
//! chromatic seed are preserved, so the result stays in the seed's tone.

use crate::{ColorResult, Coordinate, GenerationConfig, Hsl, RandSource, Rgb};

/// Maximum hue rotation, in degrees, applied to a seed color.
pub const HUE_THRESHOLD: f64 = 30.0;

const HEX_ALPHABET: &[u8; 16] = b"0123456789abcdef";

/// Produces one color for `config`, consuming randomness from `rng`.
///
/// - With dimensions, a coordinate is drawn uniformly from the grid.
/// - With seeds, one seed is picked uniformly and perturbed by
///   [`perturb_seed`].
/// - Otherwise six hex digits are drawn independently.
pub fn synthesize<R>(config: &GenerationConfig, rng: &mut R) -> ColorResult
where
    R: RandSource + ?Sized,
{
    let coordinate = config.dimensions().map(|dims| Coordinate {
        x: rng.rand_below(dims.width()),
        y: rng.rand_below(dims.height()),
    });

    let value = match config.seeds() {
        [] => random_hex(rng),
        seeds => {
            let idx = rng.rand_below(seeds.len().try_into().unwrap_or(u32::MAX)) as usize;
            perturb_seed(seeds[idx], rng).to_hex()
        }
    };

    ColorResult { value, coordinate }
}

/// Derives a color similar to `seed`.
///
/// The seed is converted to HSL and its hue rotated by an offset drawn from
/// `[-HUE_THRESHOLD, HUE_THRESHOLD]`.
///
/// An achromatic seed (all channels equal) has no hue to rotate. Its lightness
/// is shifted by the reciprocal of the offset instead and clamped to `[0, 1]`.
/// Because `|1 / offset| >= 1 / HUE_THRESHOLD`, small offsets shift far and
/// frequently saturate to pure black or white.
pub fn perturb_seed<R>(seed: Rgb, rng: &mut R) -> Rgb
where
    R: RandSource + ?Sized,
{
    let offset = rng.rand_range(-HUE_THRESHOLD, HUE_THRESHOLD);
    let hsl = Hsl::from(seed);

    if seed.is_achromatic() {
        let lightness = (hsl.lightness + offset.recip()).clamp(0.0, 1.0);
        return Hsl::new(0.0, 0.0, lightness).to_rgb();
    }

    let mut hue = (hsl.hue + offset + 360.0).rem_euclid(360.0);
    if hue >= 360.0 {
        hue = 0.0;
    }
    Hsl::new(hue, hsl.saturation, hsl.lightness).to_rgb()
}

fn random_hex<R>(rng: &mut R) -> String
where
    R: RandSource + ?Sized,
{
    let mut value = String::with_capacity(7);
    value.push('#');
    for _ in 0..6 {
        value.push(char::from(HEX_ALPHABET[rng.rand_below(16) as usize]));
    }
    value
}
