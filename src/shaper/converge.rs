//! Pull a scope's top-k score into the configured band

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, ScenarioError};
use crate::core::types::{round_score, ScoreBound};
use crate::grid::model::MapModel;
use crate::grid::terrain::is_zero_class;
use crate::scoring::{reorder, topk_fpt, TileProperty};

use super::generator::ShapeContext;
use super::mutation::{
    add_resource, change_terrain, choose_terrain, lake_share, remove_resource, toggle_resource,
    MutationKind,
};

/// Mutate top-k tiles until the scope score lies inside `bound`
///
/// Each round re-ranks the scope and picks one tile among the current
/// top-k: a terrain shift to the adjacent bucket when any top tile can
/// move that way, otherwise a resource removal (score too high) or
/// addition (score too low). `properties` holds the whole scope and is
/// left in top-k order. Fails with [`ScenarioError::UnsatisfiableBound`]
/// when no top-k tile can be changed or the round limit is reached.
pub fn converge(
    ctx: &ShapeContext<'_>,
    model: &mut MapModel,
    properties: &mut Vec<TileProperty>,
    bound: ScoreBound,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<MutationKind>> {
    let config = ctx.config;
    let k = config.topk;
    let mut applied = Vec::new();

    loop {
        *properties = reorder(std::mem::take(properties), config.keep_ocean, k);
        let score = round_score(config.weight.apply(&topk_fpt(properties, k)));
        if bound.contains(score) {
            break;
        }
        let unsatisfiable = ScenarioError::UnsatisfiableBound {
            score,
            lower: bound.lower,
            upper: bound.upper,
        };
        if applied.len() >= config.convergence_limit {
            return Err(unsatisfiable);
        }

        let raise = score < bound.lower;
        let step = if raise { 1 } else { -1 };
        let top = k.min(properties.len());
        let terrain_space: Vec<(usize, &[char])> = (0..top)
            .filter_map(|i| {
                ctx.buckets
                    .neighbour(properties[i].terrain_score, step)
                    .map(|(_, members)| (i, members))
            })
            .collect();
        let avoid_lake = lake_share(properties) > config.lake_limit;

        let kind = if let Some(&(i, members)) = terrain_space.choose(rng) {
            let terrain = choose_terrain(members, avoid_lake, rng).ok_or(unsatisfiable)?;
            change_terrain(model, &mut properties[i], terrain, ctx.tables, &config.weight)?;
            MutationKind::TerrainChange
        } else {
            // tiles that turn out to take no resource drop out of the space
            let mut space: Vec<usize> =
                (0..top).filter(|i| properties[*i].has_resources() != raise).collect();
            space.shuffle(rng);
            let mut changed = false;
            for i in space {
                let delta = if raise {
                    add_resource(model, &mut properties[i], ctx.tables, &config.weight, rng)?
                } else {
                    remove_resource(model, &mut properties[i], ctx.tables, &config.weight)?
                };
                if delta.is_some() {
                    changed = true;
                    break;
                }
            }
            if !changed {
                return Err(unsatisfiable);
            }
            if raise {
                MutationKind::ResourceBoost
            } else {
                MutationKind::ResourceReduce
            }
        };
        applied.push(kind);
    }

    if !applied.is_empty() {
        tracing::debug!(mutations = applied.len(), "Converged scope score");
    }
    Ok(applied)
}

/// Swap one random scope tile to another terrain of the same bucket,
/// occasionally adding or removing a resource; `false` when nothing changed
pub fn perturb(
    ctx: &ShapeContext<'_>,
    model: &mut MapModel,
    properties: &mut [TileProperty],
    rng: &mut ChaCha8Rng,
) -> Result<bool> {
    if properties.is_empty() {
        return Ok(false);
    }
    let config = ctx.config;
    let avoid_lake = lake_share(properties) > config.lake_limit;
    let i = rng.gen_range(0..properties.len());
    let property = &mut properties[i];
    if is_zero_class(property.terrain) {
        return Ok(false);
    }
    let Some(members) = ctx.buckets.members(property.terrain_score) else {
        return Ok(false);
    };
    let Some(terrain) = choose_terrain(members, avoid_lake, rng) else {
        return Ok(false);
    };
    change_terrain(model, property, terrain, ctx.tables, &config.weight)?;
    if rng.gen::<f64>() < config.resource_prob {
        toggle_resource(model, property, ctx.tables, &config.weight, rng)?;
    }
    Ok(true)
}
