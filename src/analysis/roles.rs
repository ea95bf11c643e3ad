//! Exclusive role assignment: ordered greedy over the hint values.

use std::cmp::Ordering;

use crate::config::AnalysisConfig;
use crate::types::{RoleMap, Tile};

/// Assign every tile to exactly one role.
///
/// Stages run in fixed order (accent, foreground, motion, bed); within a
/// stage, ties break by ascending tile index. The accent tile is always
/// taken — it is the outlier slot, never threshold-gated — while foreground
/// and motion picks must clear their hint floors.
pub fn assign_roles(tiles: &[Tile], config: &AnalysisConfig) -> RoleMap {
    debug_assert!(!tiles.is_empty());

    let mut remaining: Vec<usize> = (0..tiles.len()).collect();

    // 1. Accent: single highest-saliency tile.
    let accent_index = ranked_by(&remaining, |i| tiles[i].saliency)[0];
    remaining.retain(|&i| i != accent_index);
    let accent_tile = &tiles[accent_index];
    let accent_transient = accent_tile.brightness_variance.max(accent_tile.hf_energy);

    // 2. Foreground: up to cap, each clearing the object-hint floor.
    let foreground = take_gated(
        &mut remaining,
        config.foreground_cap,
        config.object_threshold,
        |i| tiles[i].object_hint,
    );

    // 3. Motion: up to cap from what is left, clearing the motion-hint floor.
    let motion = take_gated(
        &mut remaining,
        config.motion_cap,
        config.motion_threshold,
        |i| tiles[i].motion_hint,
    );

    // 4. Bed: everything not yet assigned.
    let mut bed = remaining;
    bed.sort_unstable();

    let foreground_confidence = mean_of(&foreground, |i| tiles[i].object_hint);
    let motion_confidence = mean_of(&motion, |i| tiles[i].motion_hint);

    let map = RoleMap {
        accent: vec![accent_index],
        foreground,
        motion,
        bed,
        accent_saliency: accent_tile.saliency,
        accent_transient,
        foreground_confidence,
        motion_confidence,
    };

    debug_assert_eq!(
        map.accent.len() + map.foreground.len() + map.motion.len() + map.bed.len(),
        tiles.len()
    );
    map
}

/// Indices ordered by (value desc, index asc).
fn ranked_by(indices: &[usize], value: impl Fn(usize) -> f32) -> Vec<usize> {
    let mut order = indices.to_vec();
    order.sort_by(|&a, &b| {
        value(b)
            .partial_cmp(&value(a))
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

/// Take up to `cap` highest-valued indices clearing `floor`, removing them
/// from `remaining`. The returned list is sorted ascending.
fn take_gated(
    remaining: &mut Vec<usize>,
    cap: usize,
    floor: f32,
    value: impl Fn(usize) -> f32 + Copy,
) -> Vec<usize> {
    let mut taken = Vec::with_capacity(cap);
    for i in ranked_by(remaining, value) {
        if taken.len() >= cap {
            break;
        }
        if value(i) >= floor {
            taken.push(i);
        }
    }
    remaining.retain(|i| !taken.contains(i));
    taken.sort_unstable();
    taken
}

fn mean_of(indices: &[usize], value: impl Fn(usize) -> f32) -> f32 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| value(i)).sum::<f32>() / indices.len() as f32
}
