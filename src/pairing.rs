//! The pairing optimizer: fills eight anchor/gunner fourball slots from the
//! rated pools, honouring hard constraints. Required pairs are locked before any
//! search, either/or groups are resolved next, and the remaining slots are
//! filled by a bounded exhaustive permutation search with a documented greedy
//! fallback. Everything left over is a reserve, never an error.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::PerformanceRating;
use crate::rating::PlayerRating;
use crate::roles::{LocationPreference, Role};

/// Number of pairs in a full assignment, and the size of each free pool.
pub const POOL_SIZE: usize = 8;

/// Pair-validity checks attempted before the exhaustive search abandons the
/// permutation space. 8 free slots cost at most 8! ≈ 40K permutations, so the
/// default budget is only ever exceeded through [ConstraintSet] pathologies.
const SEARCH_BUDGET: u64 = 200_000;

/// Hard pairing rules supplied by the league captain, keyed by player id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSet {
    /// Pairs that must play together, exempt from the handicap-gap rule.
    pub required_pairs: Vec<(String, String)>,

    /// Groups where exactly one of `alternatives` partners `partner`; the rest
    /// sit out as reserves.
    pub either_or_groups: Vec<EitherOr>,

    /// Unordered pairs that must never share a fourball.
    pub forbidden_pairs: Vec<(String, String)>,

    /// Minimum |CH(anchor) − CH(gunner)| for auto-assigned pairs.
    pub min_handicap_gap: u32,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self {
            required_pairs: vec![],
            either_or_groups: vec![],
            forbidden_pairs: vec![],
            min_handicap_gap: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EitherOr {
    /// Candidate partners in preference order.
    pub alternatives: Vec<String>,
    pub partner: String,
}

/// A malformed constraint set is fatal before any search begins; resolving it
/// silently risks an undetectable incorrect pairing.
#[derive(Debug, Error, PartialEq)]
pub enum ConstraintSetError {
    #[error("pair ({0}, {1}) is both required and forbidden")]
    ContradictoryPair(String, String),

    #[error("player {0} is claimed by more than one required pairing")]
    DoubleBooked(String),

    #[error("player {0} cannot be paired with themself")]
    SelfPair(String),

    #[error("either/or group for {0} names no alternatives")]
    NoAlternatives(String),
}

impl ConstraintSet {
    pub fn validate(&self) -> Result<(), ConstraintSetError> {
        let mut claimed = BTreeSet::new();
        let mut claim = |id: &str| {
            if !claimed.insert(id.to_string()) {
                return Err(ConstraintSetError::DoubleBooked(id.to_string()));
            }
            Ok(())
        };
        for (first, second) in &self.required_pairs {
            if first == second {
                return Err(ConstraintSetError::SelfPair(first.clone()));
            }
            claim(first)?;
            claim(second)?;
            if self.forbids(first, second) {
                return Err(ConstraintSetError::ContradictoryPair(
                    first.clone(),
                    second.clone(),
                ));
            }
        }
        for group in &self.either_or_groups {
            if group.alternatives.is_empty() {
                return Err(ConstraintSetError::NoAlternatives(group.partner.clone()));
            }
            claim(&group.partner)?;
        }
        for (first, second) in &self.forbidden_pairs {
            if first == second {
                return Err(ConstraintSetError::SelfPair(first.clone()));
            }
        }
        Ok(())
    }

    pub fn forbids(&self, first: &str, second: &str) -> bool {
        self.forbidden_pairs.iter().any(|(a, b)| {
            (a == first && b == second) || (a == second && b == first)
        })
    }
}

/// A rated player eligible for pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub player_id: String,
    pub player_name: String,
    pub blended: f64,
    pub course_handicap: i32,
    pub role: Role,
    pub performance: Option<PerformanceRating>,
    pub location: Option<LocationPreference>,
}

/// Extracts pairing candidates from the ratings table: players with a blended
/// score and a resolved role. A player with no home round on record plays off
/// a course handicap of zero.
pub fn candidates(
    ratings: &[PlayerRating],
    course_handicaps: &FxHashMap<String, i32>,
) -> Vec<Candidate> {
    ratings
        .iter()
        .filter_map(|rating| {
            Some(Candidate {
                player_id: rating.player_id.clone(),
                player_name: rating.player_name.clone(),
                blended: rating.blended?.value,
                course_handicap: *course_handicaps.get(&rating.player_id).unwrap_or(&0),
                role: rating.role?,
                performance: rating.performance,
                location: rating.location,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PairingKind {
    #[strum(serialize = "REQUIRED")]
    Required,
    #[strum(serialize = "AUTO")]
    Auto,
}

/// Where a pair should be fielded, from the majority of its members' leanings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PairLocation {
    #[strum(serialize = "HOME")]
    Home,
    #[strum(serialize = "AWAY")]
    Away,
    #[strum(serialize = "ANY")]
    Either,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub anchor: Candidate,
    pub gunner: Candidate,
    pub kind: PairingKind,
}

impl Pairing {
    pub fn combined_score(&self) -> f64 {
        self.anchor.blended + self.gunner.blended
    }

    pub fn handicap_gap(&self) -> u32 {
        (self.anchor.course_handicap - self.gunner.course_handicap).unsigned_abs()
    }

    pub fn location_recommendation(&self) -> PairLocation {
        let members = [&self.anchor, &self.gunner];
        let leaning = |lean: fn(&LocationPreference) -> bool| {
            members
                .iter()
                .filter(|member| member.location.as_ref().map_or(false, lean))
                .count()
        };
        let (home, away) = (
            leaning(LocationPreference::leans_home),
            leaning(LocationPreference::leans_away),
        );
        if home > away {
            PairLocation::Home
        } else if away > home {
            PairLocation::Away
        } else {
            PairLocation::Either
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Strategy {
    Exhaustive,
    Greedy,
}

/// Terminal state of the optimizer: either a full table of [POOL_SIZE] pairs or
/// a flagged partial result, with everyone unplaced listed as a reserve.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Ordered by combined score, best pair first.
    pub pairings: Vec<Pairing>,
    /// Ordered by blended score, strongest reserve first.
    pub reserves: Vec<Candidate>,
    pub strategy: Strategy,
}

impl Assignment {
    pub fn complete(&self) -> bool {
        self.pairings.len() == POOL_SIZE
    }
}

pub fn solve(
    candidates: &[Candidate],
    constraints: &ConstraintSet,
) -> Result<Assignment, ConstraintSetError> {
    solve_with_budget(candidates, constraints, SEARCH_BUDGET)
}

pub fn solve_with_budget(
    candidates: &[Candidate],
    constraints: &ConstraintSet,
    budget: u64,
) -> Result<Assignment, ConstraintSetError> {
    constraints.validate()?;

    let mut free = candidates.to_vec();
    free.sort_by(|a, b| {
        b.blended
            .total_cmp(&a.blended)
            .then_with(|| a.player_name.cmp(&b.player_name))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    let mut reserves = vec![];
    let locked = lock_constrained_pairs(&mut free, &mut reserves, constraints);
    debug!("locked {} constrained pairs", locked.len());

    let slots = POOL_SIZE.saturating_sub(locked.len());
    let (anchors, gunners) = build_pools(&mut free, &mut reserves, slots);

    let (auto, strategy) = match exhaustive_assignment(&anchors, &gunners, constraints, budget) {
        Some(assignment) => (assignment, Strategy::Exhaustive),
        None => {
            warn!("no permutation satisfies all hard constraints; degrading to greedy assignment");
            (
                greedy_assignment(&anchors, &gunners, constraints),
                Strategy::Greedy,
            )
        },
    };

    let mut placed: BTreeSet<String> = BTreeSet::new();
    let mut pairings = locked;
    for (anchor, gunner) in auto {
        placed.insert(anchor.player_id.clone());
        placed.insert(gunner.player_id.clone());
        pairings.push(Pairing {
            anchor,
            gunner,
            kind: PairingKind::Auto,
        });
    }
    pairings.sort_by(|a, b| {
        b.combined_score()
            .total_cmp(&a.combined_score())
            .then_with(|| a.anchor.player_name.cmp(&b.anchor.player_name))
    });

    reserves.extend(
        anchors
            .into_iter()
            .chain(gunners)
            .filter(|candidate| !placed.contains(&candidate.player_id)),
    );
    reserves.sort_by(|a, b| {
        b.blended
            .total_cmp(&a.blended)
            .then_with(|| a.player_name.cmp(&b.player_name))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    Ok(Assignment {
        pairings,
        reserves,
        strategy,
    })
}

/// Locks required pairs and resolved either/or groups, removing their members
/// from the free list. A constraint naming an unrated player is skipped with a
/// warning rather than failing the run. Within a locked pair the anchor-role
/// member anchors; between two of a kind, the lower course handicap does.
fn lock_constrained_pairs(
    free: &mut Vec<Candidate>,
    reserves: &mut Vec<Candidate>,
    constraints: &ConstraintSet,
) -> Vec<Pairing> {
    let mut locked = vec![];
    for (first, second) in &constraints.required_pairs {
        if !contains(free, first) || !contains(free, second) {
            warn!("required pair ({first}, {second}) skipped: member not in the rated pool");
            continue;
        }
        let a = take(free, first);
        let b = take(free, second);
        let (anchor, gunner) = orient(a, b);
        locked.push(Pairing {
            anchor,
            gunner,
            kind: PairingKind::Required,
        });
    }
    for group in &constraints.either_or_groups {
        if !contains(free, &group.partner) {
            warn!("either/or group skipped: partner {} not in the rated pool", group.partner);
            continue;
        }
        let chosen = group
            .alternatives
            .iter()
            .map(String::as_str)
            .find(|&alt| contains(free, alt) && !constraints.forbids(alt, &group.partner));
        let Some(chosen) = chosen else {
            warn!("either/or group for {} has no eligible alternative", group.partner);
            continue;
        };
        let partner = take(free, &group.partner);
        let alternative = take(free, chosen);
        for other in &group.alternatives {
            if contains(free, other) {
                reserves.push(take(free, other));
            }
        }
        let (anchor, gunner) = orient(partner, alternative);
        locked.push(Pairing {
            anchor,
            gunner,
            kind: PairingKind::Required,
        });
    }
    locked
}

/// Fills each free pool to `slots` members by role, promoting the
/// strongest wildcards into whichever pool runs short; spillover becomes
/// reserves. The gunner pool may outnumber the anchors, in which case the
/// search also chooses which gunners sit out.
fn build_pools(
    free: &mut Vec<Candidate>,
    reserves: &mut Vec<Candidate>,
    slots: usize,
) -> (Vec<Candidate>, Vec<Candidate>) {
    let mut anchors = vec![];
    let mut gunners = vec![];
    let mut wildcards = vec![];
    for candidate in free.drain(..) {
        match candidate.role {
            Role::Anchor => anchors.push(candidate),
            Role::Gunner => gunners.push(candidate),
            Role::Wildcard => wildcards.push(candidate),
        }
    }
    let mut wildcards = wildcards.into_iter();
    while anchors.len() < slots {
        match wildcards.next() {
            Some(wildcard) => anchors.push(wildcard),
            None => break,
        }
    }
    while gunners.len() < slots {
        match wildcards.next() {
            Some(wildcard) => gunners.push(wildcard),
            None => break,
        }
    }
    reserves.extend(wildcards);
    reserves.extend(anchors.split_off(anchors.len().min(slots)));
    reserves.extend(gunners.split_off(gunners.len().min(slots)));
    // a pair needs both halves; surplus anchors cannot place
    reserves.extend(anchors.split_off(anchors.len().min(gunners.len())));
    (anchors, gunners)
}

fn pair_allowed(anchor: &Candidate, gunner: &Candidate, constraints: &ConstraintSet) -> bool {
    !constraints.forbids(&anchor.player_id, &gunner.player_id)
        && (anchor.course_handicap - gunner.course_handicap).unsigned_abs()
            >= constraints.min_handicap_gap
}

/// Depth-first search over gunner permutations for the assignment maximizing
/// the summed blended score. `None` if the budget runs out or no permutation
/// satisfies every hard constraint. Ties keep the first assignment found, which
/// is deterministic given the pre-sorted pools.
fn exhaustive_assignment(
    anchors: &[Candidate],
    gunners: &[Candidate],
    constraints: &ConstraintSet,
    budget: u64,
) -> Option<Vec<(Candidate, Candidate)>> {
    struct Search<'a> {
        anchors: &'a [Candidate],
        gunners: &'a [Candidate],
        constraints: &'a ConstraintSet,
        budget: u64,
        attempts: u64,
        used: Vec<bool>,
        current: Vec<usize>,
        best: Option<(f64, Vec<usize>)>,
    }
    impl Search<'_> {
        /// False once the budget is blown; the partial search is then abandoned.
        fn descend(&mut self, depth: usize, score: f64) -> bool {
            if depth == self.anchors.len() {
                let improved = match &self.best {
                    Some((best_score, _)) => score > *best_score,
                    None => true,
                };
                if improved {
                    self.best = Some((score, self.current.clone()));
                }
                return true;
            }
            for index in 0..self.gunners.len() {
                if self.used[index] {
                    continue;
                }
                self.attempts += 1;
                if self.attempts > self.budget {
                    return false;
                }
                let (anchor, gunner) = (&self.anchors[depth], &self.gunners[index]);
                if !pair_allowed(anchor, gunner, self.constraints) {
                    continue;
                }
                self.used[index] = true;
                self.current.push(index);
                let within = self.descend(depth + 1, score + anchor.blended + gunner.blended);
                self.current.pop();
                self.used[index] = false;
                if !within {
                    return false;
                }
            }
            true
        }
    }

    let mut search = Search {
        anchors,
        gunners,
        constraints,
        budget,
        attempts: 0,
        used: vec![false; gunners.len()],
        current: Vec::with_capacity(anchors.len()),
        best: None,
    };
    if !search.descend(0, 0.0) {
        warn!("exhaustive search abandoned after {} attempts", search.attempts);
        return None;
    }
    let (_, assignment) = search.best?;
    Some(
        assignment
            .into_iter()
            .enumerate()
            .map(|(depth, index)| (anchors[depth].clone(), gunners[index].clone()))
            .collect(),
    )
}

/// One pass over the anchors in rank order, each taking the best-scoring
/// admissible gunner; ties broken by wider handicap gap, then name. Anchors
/// left without an admissible gunner stay unpaired.
fn greedy_assignment(
    anchors: &[Candidate],
    gunners: &[Candidate],
    constraints: &ConstraintSet,
) -> Vec<(Candidate, Candidate)> {
    let mut assignment = vec![];
    let mut used = vec![false; gunners.len()];
    for anchor in anchors {
        let mut pick: Option<usize> = None;
        for (index, gunner) in gunners.iter().enumerate() {
            if used[index] || !pair_allowed(anchor, gunner, constraints) {
                continue;
            }
            let better = match pick {
                None => true,
                Some(best) => {
                    let incumbent = &gunners[best];
                    let gap = |gunner: &Candidate| {
                        (anchor.course_handicap - gunner.course_handicap).unsigned_abs()
                    };
                    gunner
                        .blended
                        .total_cmp(&incumbent.blended)
                        .then_with(|| gap(gunner).cmp(&gap(incumbent)))
                        .then_with(|| incumbent.player_name.cmp(&gunner.player_name))
                        .is_gt()
                },
            };
            if better {
                pick = Some(index);
            }
        }
        if let Some(index) = pick {
            used[index] = true;
            assignment.push((anchor.clone(), gunners[index].clone()));
        }
    }
    assignment
}

fn contains(pool: &[Candidate], id: &str) -> bool {
    pool.iter().any(|candidate| candidate.player_id == id)
}

/// Panics if absent; gate with [contains] first.
fn take(pool: &mut Vec<Candidate>, id: &str) -> Candidate {
    let index = pool
        .iter()
        .position(|candidate| candidate.player_id == id)
        .unwrap();
    pool.remove(index)
}

fn orient(a: Candidate, b: Candidate) -> (Candidate, Candidate) {
    let a_anchors = a.role == Role::Anchor;
    let b_anchors = b.role == Role::Anchor;
    if a_anchors == b_anchors {
        if a.course_handicap <= b.course_handicap {
            (a, b)
        } else {
            (b, a)
        }
    } else if a_anchors {
        (a, b)
    } else {
        (b, a)
    }
}
