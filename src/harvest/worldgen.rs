use std::{
    f32::consts::PI,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

use bracket_random::prelude::RandomNumberGenerator;
use log::{debug, info, warn};

use crate::error::{Result, SketchError};

use super::{Field, ResourceNode, ResourcePatch, ResourceType, Vec2};

/// An inclusive integer range written as `center +/- extent`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spread {
    pub center: i32,
    pub extent: i32,
}

impl Spread {
    pub const fn new(center: i32, extent: i32) -> Self {
        Self { center, extent }
    }

    pub fn sample(&self, rng: &mut RandomNumberGenerator) -> i32 {
        let low = self.center - self.extent;
        let high = self.center + self.extent;
        if high <= low {
            return low.max(0);
        }
        rng.range(low, high + 1).max(0)
    }

    fn scaled(self, factor: f32) -> Self {
        Self {
            center: (self.center as f32 * factor).round() as i32,
            extent: (self.extent as f32 * factor).round() as i32,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub seed: u64,
    /// Patch counts per type, in [`ResourceType::ALL`] order.
    pub patch_counts: [Spread; 4],
    pub patch_size: Spread,
    pub half_extent: f32,
    pub node_spread: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            patch_counts: [
                Spread::new(25_000, 5_000),
                Spread::new(50_000, 5_000),
                Spread::new(15_000, 5_000),
                Spread::new(10_000, 5_000),
            ],
            patch_size: Spread::new(250, 50),
            half_extent: 30_000.0,
            node_spread: 6.0,
        }
    }
}

impl FieldConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fewer patches over a smaller area at the same density.
    pub fn scaled(mut self, factor: f32) -> Self {
        let factor = factor.clamp(f32::EPSILON, 1.0);
        for count in &mut self.patch_counts {
            *count = count.scaled(factor);
        }
        self.half_extent *= factor.sqrt();
        self
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    AllocatingMemory = 0,
    PlacingPatches = 1,
    GrowingMetal = 2,
    GrowingWood = 3,
    GrowingWater = 4,
    GrowingEnergy = 5,
    Complete = 6,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Stage::AllocatingMemory => "Allocating memory",
            Stage::PlacingPatches => "Sowing seeds",
            Stage::GrowingMetal => "Creating metal",
            Stage::GrowingWood => "Growing wood",
            Stage::GrowingWater => "Adding water",
            Stage::GrowingEnergy => "Generating energy",
            Stage::Complete => "Complete",
        }
    }

    const fn growing(kind: ResourceType) -> Self {
        match kind {
            ResourceType::Metal => Stage::GrowingMetal,
            ResourceType::Wood => Stage::GrowingWood,
            ResourceType::Water => Stage::GrowingWater,
            ResourceType::Energy => Stage::GrowingEnergy,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Stage::AllocatingMemory,
            1 => Stage::PlacingPatches,
            2 => Stage::GrowingMetal,
            3 => Stage::GrowingWood,
            4 => Stage::GrowingWater,
            5 => Stage::GrowingEnergy,
            _ => Stage::Complete,
        }
    }
}

/// Written by the worker, read by the UI thread.
#[derive(Debug, Default)]
pub struct Progress {
    stage: AtomicU8,
    fraction: AtomicU32,
    patches: AtomicUsize,
    nodes: AtomicUsize,
    cancelled: AtomicBool,
}

impl Progress {
    pub fn stage(&self) -> Stage {
        Stage::from_u8(self.stage.load(Ordering::Acquire))
    }

    pub fn fraction(&self) -> f32 {
        f32::from_bits(self.fraction.load(Ordering::Relaxed))
    }

    pub fn patches_placed(&self) -> usize {
        self.patches.load(Ordering::Relaxed)
    }

    pub fn nodes_grown(&self) -> usize {
        self.nodes.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn enter(&self, stage: Stage) {
        self.set_fraction(0.0);
        self.stage.store(stage as u8, Ordering::Release);
    }

    fn set_fraction(&self, fraction: f32) {
        self.fraction.store(fraction.to_bits(), Ordering::Relaxed);
    }
}

fn share(done: usize, total: usize) -> f32 {
    if total == 0 {
        1.0
    } else {
        done as f32 / total as f32
    }
}

fn normal(rng: &mut RandomNumberGenerator, sigma: f32) -> f32 {
    let u1: f32 = rng.range(f32::EPSILON, 1.0);
    let u2: f32 = rng.range(0.0, 1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * sigma
}

/// Builds a field, reporting through `progress`. Returns `None` as soon as
/// the cancel flag is seen.
pub fn generate(config: &FieldConfig, progress: &Progress) -> Option<Field> {
    let mut rng = RandomNumberGenerator::seeded(config.seed);

    progress.enter(Stage::AllocatingMemory);
    let counts: Vec<usize> = config
        .patch_counts
        .iter()
        .map(|spread| spread.sample(&mut rng) as usize)
        .collect();
    let total_patches: usize = counts.iter().sum();

    let mut sizes = Vec::with_capacity(total_patches);
    let mut total_nodes = 0;
    for i in 0..total_patches {
        let size = config.patch_size.sample(&mut rng) as usize;
        sizes.push(size);
        total_nodes += size;
        progress.set_fraction(share(i + 1, total_patches));
        if progress.is_cancelled() {
            return None;
        }
    }
    let mut field = Field {
        patches: Vec::with_capacity(total_patches),
        nodes: Vec::with_capacity(total_nodes),
    };
    debug!("allocated {total_patches} patches and {total_nodes} nodes");

    progress.enter(Stage::PlacingPatches);
    let kinds: Vec<ResourceType> = ResourceType::ALL
        .iter()
        .zip(&counts)
        .flat_map(|(kind, count)| std::iter::repeat_n(*kind, *count))
        .collect();
    let extent = config.half_extent;
    let mut start = 0;
    for (i, (kind, size)) in kinds.iter().zip(&sizes).enumerate() {
        let base = Vec2::new(rng.range(-extent, extent), rng.range(-extent, extent));
        field.patches.push(ResourcePatch {
            base,
            kind: *kind,
            radius: 0.0,
            nodes: start..start + size,
            empty: false,
        });
        start += size;
        progress.patches.store(i + 1, Ordering::Relaxed);
        progress.set_fraction(share(i + 1, total_patches));
        if progress.is_cancelled() {
            return None;
        }
    }

    grow(&mut field, config, &mut rng, progress)?;

    progress.set_fraction(1.0);
    progress.stage.store(Stage::Complete as u8, Ordering::Release);
    info!(
        "generated {} patches and {} nodes",
        field.patches.len(),
        field.nodes.len()
    );
    Some(field)
}

/// Scatters each patch's nodes around its base. Patches of one type form a
/// stage, and the fraction restarts at every stage.
fn grow(
    field: &mut Field,
    config: &FieldConfig,
    rng: &mut RandomNumberGenerator,
    progress: &Progress,
) -> Option<()> {
    progress.enter(Stage::GrowingMetal);
    let mut current = None;
    let mut stage_start = 0;
    let mut stage_len = 0;
    for i in 0..field.patches.len() {
        let (base, kind, size) = {
            let patch = &field.patches[i];
            (patch.base, patch.kind, patch.nodes.len())
        };
        if current != Some(kind) {
            current = Some(kind);
            stage_start = i;
            stage_len = field.patches[i..]
                .iter()
                .take_while(|patch| patch.kind == kind)
                .count();
            progress.enter(Stage::growing(kind));
        }
        let radius = (size as f32 / PI).sqrt() * config.node_spread;
        field.patches[i].radius = radius;
        for _ in 0..size {
            let angle: f32 = rng.range(0.0, 2.0 * PI);
            let length = normal(rng, radius / 6.0);
            field
                .nodes
                .push(ResourceNode::new(base + Vec2::from_angle(angle, length), kind));
            if progress.is_cancelled() {
                return None;
            }
        }
        progress.nodes.store(field.nodes.len(), Ordering::Relaxed);
        progress.set_fraction(share(i + 1 - stage_start, stage_len));
    }
    Some(())
}

/// Field generation running on a worker thread.
pub struct Generation {
    progress: Arc<Progress>,
    handle: Option<JoinHandle<Option<Field>>>,
}

impl Generation {
    pub fn spawn(config: FieldConfig) -> Result<Self> {
        let progress = Arc::new(Progress::default());
        let worker_progress = Arc::clone(&progress);
        let handle = thread::Builder::new()
            .name("worldgen".into())
            .spawn(move || generate(&config, &worker_progress))?;
        Ok(Self {
            progress,
            handle: Some(handle),
        })
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .is_none_or(|handle| handle.is_finished())
    }

    pub fn cancel(&self) {
        self.progress.cancel();
    }

    /// Waits for the worker. `Ok(None)` means it was cancelled.
    pub fn join(mut self) -> Result<Option<Field>> {
        let Some(handle) = self.handle.take() else {
            return Ok(None);
        };
        handle
            .join()
            .map_err(|_| SketchError::Worker("worldgen thread panicked".into()))
    }
}

impl Drop for Generation {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.progress.cancel();
            if handle.join().is_err() {
                warn!("worldgen thread panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> FieldConfig {
        FieldConfig {
            seed: 7,
            patch_counts: [
                Spread::new(4, 1),
                Spread::new(3, 1),
                Spread::new(2, 0),
                Spread::new(1, 0),
            ],
            patch_size: Spread::new(10, 2),
            half_extent: 100.0,
            node_spread: 6.0,
        }
    }

    #[test]
    fn scaling_keeps_density() {
        let config = FieldConfig::default().scaled(0.01);
        assert_eq!(config.patch_counts[0], Spread::new(250, 50));
        assert_eq!(config.patch_counts[1], Spread::new(500, 50));
        assert!((config.half_extent - 3_000.0).abs() < 0.5);
        assert_eq!(config.patch_size, Spread::new(250, 50));
    }

    #[test]
    fn generates_contiguous_patches_in_type_order() {
        let progress = Progress::default();
        let field = generate(&tiny(), &progress).unwrap();

        let total: usize = field.patches.iter().map(|patch| patch.nodes.len()).sum();
        assert_eq!(total, field.nodes.len());
        let mut next = 0;
        for patch in &field.patches {
            assert_eq!(patch.nodes.start, next);
            assert!((8..=12).contains(&patch.nodes.len()));
            assert!(patch.radius > 0.0);
            assert!(field.nodes[patch.nodes.clone()].iter().all(|n| n.kind == patch.kind));
            next = patch.nodes.end;
        }
        let kinds: Vec<ResourceType> = field.patches.iter().map(|patch| patch.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert_eq!(kinds.iter().filter(|k| **k == ResourceType::Water).count(), 2);

        assert_eq!(progress.stage(), Stage::Complete);
        assert_eq!(progress.fraction(), 1.0);
        assert_eq!(progress.patches_placed(), field.patches.len());
        assert_eq!(progress.nodes_grown(), field.nodes.len());
    }

    #[test]
    fn same_seed_same_field() {
        let a = generate(&tiny(), &Progress::default()).unwrap();
        let b = generate(&tiny(), &Progress::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cancelled_generation_returns_nothing() {
        let progress = Progress::default();
        progress.cancel();
        assert!(generate(&tiny(), &progress).is_none());
        assert_ne!(progress.stage(), Stage::Complete);
    }

    #[test_log::test]
    fn worker_thread_delivers_the_field() {
        let generation = Generation::spawn(tiny()).unwrap();
        let field = generation.join().unwrap().unwrap();
        assert!(!field.nodes.is_empty());
    }

    #[test]
    fn cancelled_worker_joins_cleanly() {
        let generation = Generation::spawn(FieldConfig::default().scaled(0.05)).unwrap();
        generation.cancel();
        let _ = generation.join().unwrap();
    }

    #[test]
    fn growth_fills_each_stage_on_its_own() {
        let mut field = generate(&tiny(), &Progress::default()).unwrap();
        let grown = field.nodes.len();
        field.nodes.clear();

        let progress = Progress::default();
        let mut rng = RandomNumberGenerator::seeded(3);
        assert!(grow(&mut field, &tiny(), &mut rng, &progress).is_some());
        assert_eq!(field.nodes.len(), grown);
        assert_eq!(progress.stage(), Stage::GrowingEnergy);
        assert_eq!(progress.fraction(), 1.0);

        // A lone wood patch still finishes its stage.
        let mut wood = Field {
            patches: field
                .patches
                .iter()
                .filter(|patch| patch.kind == ResourceType::Wood)
                .take(1)
                .cloned()
                .map(|mut patch| {
                    patch.nodes = 0..patch.nodes.len();
                    patch
                })
                .collect(),
            nodes: Vec::new(),
        };
        let progress = Progress::default();
        assert!(grow(&mut wood, &tiny(), &mut rng, &progress).is_some());
        assert_eq!(progress.stage(), Stage::GrowingWood);
        assert_eq!(progress.fraction(), 1.0);
    }

    #[test]
    fn fractions_cover_empty_stages() {
        assert_eq!(share(0, 0), 1.0);
        assert_eq!(share(1, 4), 0.25);
        assert_eq!(share(2, 2), 1.0);
    }

    #[test]
    fn dropping_a_generation_cancels_and_joins_the_worker() {
        let generation = Generation::spawn(FieldConfig::default().scaled(0.05)).unwrap();
        let progress = Arc::clone(&generation.progress);
        drop(generation);
        assert!(progress.is_cancelled());
        assert_eq!(Arc::strong_count(&progress), 1);
    }

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::PlacingPatches.label(), "Sowing seeds");
        assert_eq!(Stage::from_u8(Stage::GrowingWater as u8), Stage::GrowingWater);
    }
}
