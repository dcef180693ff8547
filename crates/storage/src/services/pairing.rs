//! Pairing engine.
//!
//! Greedy first-fit over each bucket's win-count order: every unpaired
//! competitor takes the next unpaired competitor from a different school.
//! The result depends on bucket order and can leave pairable competitors
//! without a partner.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::division::{BucketRef, DisciplineKind, DivisionTree, Subgroup};
use crate::dto::match_up::MatchContext;
use crate::models::{Competitor, Gender};

/// Pairs found in a single bucket plus whoever was left over.
#[derive(Debug, Clone, Default)]
pub struct BucketPairing<'a> {
    pub pairs: Vec<(&'a Competitor, &'a Competitor)>,
    pub unpaired: Vec<&'a Competitor>,
}

/// Pairs one bucket. No pair shares an affiliation and no competitor appears twice.
pub fn pair_bucket(competitors: &[Competitor]) -> BucketPairing<'_> {
    let mut consumed = vec![false; competitors.len()];
    let mut result = BucketPairing::default();

    for i in 0..competitors.len() {
        if consumed[i] {
            continue;
        }

        let partner = (i + 1..competitors.len())
            .find(|&j| !consumed[j] && !same_affiliation(&competitors[i], &competitors[j]));

        match partner {
            Some(j) => {
                consumed[i] = true;
                consumed[j] = true;
                result.pairs.push((&competitors[i], &competitors[j]));
            }
            None => result.unpaired.push(&competitors[i]),
        }
    }

    result
}

fn same_affiliation(a: &Competitor, b: &Competitor) -> bool {
    match (a.affiliation(), b.affiliation()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PairedCompetitor {
    pub competitor_id: Uuid,
    pub name: String,
    pub school: Option<String>,
    pub win_count: i64,
}

impl From<&Competitor> for PairedCompetitor {
    fn from(competitor: &Competitor) -> Self {
        Self {
            competitor_id: competitor.competitor_id,
            name: competitor.name.clone(),
            school: competitor.school.clone(),
            win_count: competitor.win_count,
        }
    }
}

/// A candidate bout with the labels of the bucket it came from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProposedMatchUp {
    pub player1: PairedCompetitor,
    pub player2: PairedCompetitor,
    pub gender: Gender,
    pub group: String,
    pub discipline: DisciplineKind,
    pub subgroup: Option<Subgroup>,
}

impl ProposedMatchUp {
    /// Context the operator console sends back when it pushes this bout live.
    pub fn context(&self) -> MatchContext {
        MatchContext {
            player1: self.player1.name.clone(),
            player2: self.player2.name.clone(),
            gender: Some(self.gender.as_str().to_string()),
            group: self.group.clone(),
            program: self.discipline.label().to_string(),
            subgroup: self.subgroup.map(|s| s.as_str().to_string()),
            school: self.player1.school.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnpairedCompetitor {
    pub competitor: PairedCompetitor,
    pub gender: Gender,
    pub group: String,
    pub discipline: DisciplineKind,
    pub subgroup: Option<Subgroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PairingPlan {
    pub match_ups: Vec<ProposedMatchUp>,
    pub unpaired: Vec<UnpairedCompetitor>,
}

/// Pairs every bucket of the tree, emitting match-ups in bucket traversal order.
pub fn pair_divisions(tree: &DivisionTree) -> PairingPlan {
    let mut plan = PairingPlan::default();

    for bucket in tree.buckets() {
        let pairing = pair_bucket(bucket.competitors);

        plan.match_ups.extend(pairing.pairs.iter().map(|(a, b)| ProposedMatchUp {
            player1: PairedCompetitor::from(*a),
            player2: PairedCompetitor::from(*b),
            gender: bucket.gender,
            group: bucket.group.to_string(),
            discipline: bucket.discipline,
            subgroup: bucket.subgroup,
        }));

        plan.unpaired
            .extend(pairing.unpaired.iter().map(|c| unpaired(&bucket, c)));
    }

    plan
}

fn unpaired(bucket: &BucketRef<'_>, competitor: &Competitor) -> UnpairedCompetitor {
    UnpairedCompetitor {
        competitor: PairedCompetitor::from(competitor),
        gender: bucket.gender,
        group: bucket.group.to_string(),
        discipline: bucket.discipline,
        subgroup: bucket.subgroup,
    }
}
