use crate::{
    config::{NoiseFieldConfig, NoiseFnType},
    util::{cmp_f64, range::NumRange},
};
use log::debug;
use nalgebra::Point3;
use noise::{Fbm, MultiFractal, NoiseFn, RidgedMulti, Seedable};
use rand::Rng;
use std::fmt::Debug;

/// Lets us box up the different noise function types
trait NoiseFnTrait: Debug + NoiseFn<[f64; 2]> {}

impl<T: Debug + NoiseFn<[f64; 2]>> NoiseFnTrait for T {}

/// A seeded 2D noise field over the XZ plane, sampled on a square grid
/// centered on the origin. Grid samples with a high enough value become
/// candidate points for the road trees to grow from.
#[derive(Debug)]
pub struct NoiseField {
    noise_fn: Box<dyn NoiseFnTrait>,
    config: NoiseFieldConfig,
}

impl NoiseField {
    /// World coordinates get divided by this before being fed to the noise
    /// function, so that reasonable frequencies give reasonable output
    const INPUT_SCALE: f64 = 100.0;
    /// Output range of the underlying noise functions
    const NOISE_FN_OUTPUT_RANGE: NumRange = NumRange::new(-1.0, 1.0);

    /// Create a field with a seed pulled from the given RNG
    pub fn new(rng: &mut impl Rng, config: NoiseFieldConfig) -> Self {
        let seed: u32 = rng.gen();
        debug!("Creating {} noise field with seed {}", config.noise_type, seed);
        Self {
            noise_fn: Self::make_noise_fn(&config, seed),
            config,
        }
    }

    // Seedable and MultiFractal aren't object safe, so each type has to be
    // configured separately
    fn make_noise_fn(
        config: &NoiseFieldConfig,
        seed: u32,
    ) -> Box<dyn NoiseFnTrait> {
        match config.noise_type {
            NoiseFnType::Fbm => Box::new(
                Fbm::default()
                    .set_seed(seed)
                    .set_octaves(config.octaves)
                    .set_frequency(config.frequency)
                    .set_lacunarity(config.lacunarity)
                    .set_persistence(config.persistence),
            ),
            NoiseFnType::RidgedMulti => Box::new(
                RidgedMulti::default()
                    .set_seed(seed)
                    .set_octaves(config.octaves)
                    .set_frequency(config.frequency)
                    .set_lacunarity(config.lacunarity)
                    .set_persistence(config.persistence),
            ),
        }
    }

    /// Sample the field at a point on the XZ plane. The output is always in
    /// `[0, 1]`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let value = self
            .noise_fn
            .get([x / Self::INPUT_SCALE, z / Self::INPUT_SCALE]);
        NumRange::NORMAL.clamp(Self::NOISE_FN_OUTPUT_RANGE.normalize(value))
    }

    /// World positions of every grid sample, row by row along X. Y is 0.
    pub fn grid_points(&self) -> impl Iterator<Item = Point3<f64>> {
        let size = self.config.grid_size;
        let cell_size = self.config.cell_size;
        // Offset so the grid is centered on the origin
        let offset = (size as f64 - 1.0) / 2.0;
        (0..size).flat_map(move |row| {
            (0..size).map(move |col| {
                Point3::new(
                    (col as f64 - offset) * cell_size,
                    0.0,
                    (row as f64 - offset) * cell_size,
                )
            })
        })
    }

    /// Every grid point whose sample is at or above the threshold, strongest
    /// first. Ties keep grid order.
    pub fn candidates(&self) -> Vec<Point3<f64>> {
        let mut candidates: Vec<(Point3<f64>, f64)> = self
            .grid_points()
            .map(|point| (point, self.sample(point.x, point.z)))
            .filter(|(_, value)| *value >= self.config.threshold)
            .collect();
        candidates.sort_by(|(_, a), (_, b)| cmp_f64(*b, *a));
        candidates.into_iter().map(|(point, _)| point).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use strum::IntoEnumIterator;

    fn field(seed: u64, config: NoiseFieldConfig) -> NoiseField {
        NoiseField::new(&mut Pcg64::seed_from_u64(seed), config)
    }

    #[test]
    fn test_grid_centered() {
        let config = NoiseFieldConfig {
            grid_size: 3,
            cell_size: 5.0,
            ..Default::default()
        };
        let points: Vec<_> = field(0, config).grid_points().collect();
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], Point3::new(-5.0, 0.0, -5.0));
        assert_eq!(points[4], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(points[8], Point3::new(5.0, 0.0, 5.0));
    }

    #[test]
    fn test_samples_normalized() {
        for noise_type in NoiseFnType::iter() {
            let config = NoiseFieldConfig {
                noise_type,
                grid_size: 16,
                ..Default::default()
            };
            let field = field(1, config);
            for point in field.grid_points() {
                let value = field.sample(point.x, point.z);
                assert!(NumRange::NORMAL.contains(value), "{}", value);
            }
        }
    }

    #[test]
    fn test_threshold() {
        let config = NoiseFieldConfig {
            grid_size: 16,
            threshold: 0.0,
            ..Default::default()
        };
        // Everything passes a threshold of 0
        assert_eq!(field(2, config).candidates().len(), 256);

        let config = NoiseFieldConfig {
            threshold: 0.6,
            ..config
        };
        let field = field(2, config);
        let candidates = field.candidates();
        let values: Vec<f64> = candidates
            .iter()
            .map(|point| field.sample(point.x, point.z))
            .collect();
        assert!(values.iter().all(|value| *value >= 0.6));
        assert!(values.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_seeded() {
        let config = NoiseFieldConfig {
            grid_size: 16,
            threshold: 0.5,
            ..Default::default()
        };
        let candidates = field(3, config).candidates();
        assert_eq!(candidates, field(3, config).candidates());

        let a = field(3, config);
        let b = field(4, config);
        let differs = a
            .grid_points()
            .any(|p| a.sample(p.x, p.z) != b.sample(p.x, p.z));
        assert!(differs);
    }
}
