// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

//! Layout leveling
//!
//! Groups steps by dependency depth so the editor can lay them out left to
//! right. This is a layout aid, not a scheduler: it accepts malformed input
//! (cycles, dangling references) and still places every step somewhere.

use std::collections::HashMap;

use super::Step;

/// Partition steps into levels by dependency depth.
///
/// Returns indices into `steps`. Level 0 holds steps with no dependencies;
/// a step whose dependencies are all placed goes one level past the deepest
/// of them. Steps that can never be placed (cycles, references to missing
/// steps) are appended to the last level. Every step appears exactly once.
pub fn compute_levels(steps: &[Step]) -> Vec<Vec<usize>> {
    let mut assigned: Vec<Option<usize>> = vec![None; steps.len()];
    let mut id_levels: HashMap<&str, usize> = HashMap::new();
    let mut levels: Vec<Vec<usize>> = Vec::new();

    for (idx, step) in steps.iter().enumerate() {
        if step.depends_on.is_empty() {
            place(&mut levels, &mut assigned, &mut id_levels, idx, &step.id, 0);
        }
    }

    loop {
        let mut progressed = false;

        for (idx, step) in steps.iter().enumerate() {
            if assigned[idx].is_some() {
                continue;
            }

            let dep_levels: Option<Vec<usize>> = step
                .depends_on
                .iter()
                .map(|dep| id_levels.get(dep.as_str()).copied())
                .collect();

            if let Some(dep_levels) = dep_levels {
                let level = dep_levels.into_iter().max().map_or(0, |max| max + 1);
                place(&mut levels, &mut assigned, &mut id_levels, idx, &step.id, level);
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }

    let unresolved: Vec<usize> = assigned
        .iter()
        .enumerate()
        .filter(|(_, level)| level.is_none())
        .map(|(idx, _)| idx)
        .collect();

    if !unresolved.is_empty() {
        tracing::debug!(
            count = unresolved.len(),
            "steps with unresolved dependencies placed in last level"
        );
        if levels.is_empty() {
            levels.push(Vec::new());
        }
        if let Some(last) = levels.last_mut() {
            last.extend(unresolved);
        }
    }

    levels
}

fn place<'a>(
    levels: &mut Vec<Vec<usize>>,
    assigned: &mut [Option<usize>],
    id_levels: &mut HashMap<&'a str, usize>,
    idx: usize,
    id: &'a str,
    level: usize,
) {
    if levels.len() <= level {
        levels.resize_with(level + 1, Vec::new);
    }
    levels[level].push(idx);
    assigned[idx] = Some(level);

    let entry = id_levels.entry(id).or_insert(level);
    *entry = (*entry).max(level);
}

/// Level of each step, indexed like `steps`
pub fn level_of_each(levels: &[Vec<usize>], step_count: usize) -> Vec<usize> {
    let mut out = vec![0; step_count];
    for (level, members) in levels.iter().enumerate() {
        for &idx in members {
            if let Some(slot) = out.get_mut(idx) {
                *slot = level;
            }
        }
    }
    out
}
