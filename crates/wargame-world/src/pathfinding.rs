//! Grid route planning.
//!
//! [`find_path`] runs an A* search over the 8-neighbourhood of the
//! [`TerrainMap`], then partitions the resulting path into turn-sized hops
//! using a per-turn movement budget. It is a pure function of its inputs.
//!
//! # Cost semantics
//!
//! The returned [`Route::cost`] means two different things:
//!
//! - When start and goal touch (Chebyshev distance 1) no search runs. The
//!   route is the goal alone and the cost is the goal's terrain cost.
//! - Otherwise the cost is the number of hops, i.e. the number of turns
//!   the route takes, not the summed terrain cost.
//!
//! Callers rely on both meanings, so they are kept as they are.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use serde::{Deserialize, Serialize};

use wargame_types::{Coord, Waypoint};

use crate::error::PathError;
use crate::terrain::{TerrainMap, traversal_cost};

/// A planned route: turn-boundary waypoints plus a cost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Turn-boundary waypoints in travel order. The last one is the goal.
    /// Empty when the goal is unreachable.
    pub hops: Vec<Waypoint>,
    /// Terrain cost of the goal for adjacent moves, hop count otherwise.
    pub cost: u64,
}

impl Route {
    /// Whether the route has no hops (the goal was unreachable).
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// The final waypoint, if any.
    pub fn destination(&self) -> Option<&Waypoint> {
        self.hops.last()
    }
}

/// Plan a route from `start` to `goal`.
///
/// Never fails: an unreachable goal (or a goal that is not on the map)
/// yields an empty [`Route`]. Use [`plan_route`] for an explicit error.
pub fn find_path(start: Coord, goal: Coord, map: &TerrainMap, movement_budget: u32) -> Route {
    if start.is_adjacent(goal) {
        return adjacent_route(goal, map);
    }

    let path = search(start, goal, map);
    if path.is_empty() {
        return Route::default();
    }

    let hops = partition_into_turns(&path, goal, map, movement_budget);
    let cost = u64::try_from(hops.len()).unwrap_or(u64::MAX);
    Route { hops, cost }
}

/// Plan a route and report failures explicitly.
///
/// # Errors
///
/// - [`PathError::OffMap`] if `start` or `goal` is not on the map.
/// - [`PathError::SameCell`] if `start == goal`.
/// - [`PathError::Unreachable`] if no path connects them.
pub fn plan_route(
    start: Coord,
    goal: Coord,
    map: &TerrainMap,
    movement_budget: u32,
) -> Result<Route, PathError> {
    for cell in [start, goal] {
        if !map.contains(cell) {
            return Err(PathError::OffMap(cell));
        }
    }
    if start == goal {
        return Err(PathError::SameCell(start));
    }

    let route = find_path(start, goal, map, movement_budget);
    if route.is_empty() {
        return Err(PathError::Unreachable {
            from: start,
            to: goal,
        });
    }
    Ok(route)
}

/// The single-hop route to a touching cell.
fn adjacent_route(goal: Coord, map: &TerrainMap) -> Route {
    let (Some(terrain), Some(waypoint)) = (map.terrain_at(goal), map.waypoint_at(goal)) else {
        return Route::default();
    };
    Route {
        hops: vec![waypoint],
        cost: u64::from(traversal_cost(terrain)),
    }
}

/// A* search with the Chebyshev heuristic.
///
/// Returns the path from the first step after `start` up to and including
/// `goal`, or an empty vector if the goal is unreachable. Frontier ties are
/// broken by coordinate order, so the result is deterministic for a given
/// map.
fn search(start: Coord, goal: Coord, map: &TerrainMap) -> Vec<Coord> {
    // Best known cost from start.
    let mut g_score: BTreeMap<Coord, u64> = BTreeMap::new();
    // Predecessor map for path reconstruction.
    let mut came_from: BTreeMap<Coord, Coord> = BTreeMap::new();
    let mut frontier: BinaryHeap<Reverse<(u64, Coord)>> = BinaryHeap::new();

    g_score.insert(start, 0);
    frontier.push(Reverse((heuristic(start, goal), start)));

    while let Some(Reverse((priority, current))) = frontier.pop() {
        if current == goal {
            break;
        }
        let Some(&current_g) = g_score.get(&current) else {
            continue;
        };
        // Skip entries superseded by a cheaper push.
        if priority > current_g.saturating_add(heuristic(current, goal)) {
            continue;
        }

        for neighbour in current.neighbours() {
            let Some(terrain) = map.terrain_at(neighbour) else {
                continue;
            };
            let tentative = current_g.saturating_add(u64::from(traversal_cost(terrain)));
            let improves = g_score
                .get(&neighbour)
                .is_none_or(|&best| tentative < best);
            if improves {
                came_from.insert(neighbour, current);
                g_score.insert(neighbour, tentative);
                frontier.push(Reverse((
                    tentative.saturating_add(heuristic(neighbour, goal)),
                    neighbour,
                )));
            }
        }
    }

    let mut path = Vec::new();
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(current);
        current = previous;
    }
    path.reverse();
    path
}

fn heuristic(from: Coord, to: Coord) -> u64 {
    u64::from(from.chebyshev(to))
}

/// Split a path into turn-boundary waypoints.
///
/// Terrain cost accumulates along the path; whenever it reaches the budget
/// the current cell becomes a waypoint and the accumulator resets. The goal
/// is appended if the last stretch never reached the budget.
fn partition_into_turns(
    path: &[Coord],
    goal: Coord,
    map: &TerrainMap,
    movement_budget: u32,
) -> Vec<Waypoint> {
    let mut hops: Vec<Waypoint> = Vec::new();
    let mut spent: u32 = 0;

    for &cell in path {
        let Some(terrain) = map.terrain_at(cell) else {
            continue;
        };
        spent = spent.saturating_add(traversal_cost(terrain));
        if spent >= movement_budget {
            if let Some(waypoint) = map.waypoint_at(cell) {
                hops.push(waypoint);
            }
            spent = 0;
        }
    }

    if hops.last().map(Waypoint::coord) != Some(goal) {
        if let Some(waypoint) = map.waypoint_at(goal) {
            hops.push(waypoint);
        }
    }
    hops
}
