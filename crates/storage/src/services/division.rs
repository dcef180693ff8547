//! Division classifier.
//!
//! Buckets a roster sub-collection into gender → group → discipline →
//! subgroup. The tree is rebuilt from scratch on every call; nothing is cached.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Competitor, Gender};

const FORMS_MARKERS: &[&str] = &["型", "kata", "form"];
const SUBGROUP_A_MARKER: &str = "A组";
const SUBGROUP_B_MARKER: &str = "B组";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DisciplineKind {
    /// 型
    Forms,
    /// 组手
    Sparring,
}

impl DisciplineKind {
    pub fn from_label(program: &str) -> Self {
        let label = program.to_lowercase();
        if FORMS_MARKERS.iter().any(|m| label.contains(m)) {
            Self::Forms
        } else {
            Self::Sparring
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Forms => "型",
            Self::Sparring => "组手",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Subgroup {
    A,
    B,
    #[serde(rename = "other")]
    Other,
}

impl Subgroup {
    /// Sparring subgroup from a marker in the program label.
    pub fn from_label(program: &str) -> Self {
        let label = program.trim();
        let tail = label.trim_end_matches([')', '）', ' ']);

        if label.contains(SUBGROUP_A_MARKER) || tail.ends_with('A') {
            Self::A
        } else if label.contains(SUBGROUP_B_MARKER) || tail.ends_with('B') {
            Self::B
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Other => "other",
        }
    }

    fn all() -> &'static [Subgroup] {
        &[Self::A, Self::B, Self::Other]
    }
}

/// Leaf collection: competitors ordered by win count, highest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Bucket {
    /// Always `None` for forms.
    pub subgroup: Option<Subgroup>,
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DisciplineDivision {
    pub discipline: DisciplineKind,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupDivision {
    pub group: String,
    pub disciplines: Vec<DisciplineDivision>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenderDivision {
    pub gender: Gender,
    pub groups: Vec<GroupDivision>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DivisionTree {
    pub divisions: Vec<GenderDivision>,
}

/// Borrowed view of one leaf together with the labels of its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct BucketRef<'a> {
    pub gender: Gender,
    pub group: &'a str,
    pub discipline: DisciplineKind,
    pub subgroup: Option<Subgroup>,
    pub competitors: &'a [Competitor],
}

impl DivisionTree {
    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    /// Leaves in traversal order (gender → group → discipline → subgroup).
    pub fn buckets(&self) -> impl Iterator<Item = BucketRef<'_>> {
        self.divisions.iter().flat_map(|gender| {
            gender.groups.iter().flat_map(move |group| {
                group.disciplines.iter().flat_map(move |discipline| {
                    discipline.buckets.iter().map(move |bucket| BucketRef {
                        gender: gender.gender,
                        group: &group.group,
                        discipline: discipline.discipline,
                        subgroup: bucket.subgroup,
                        competitors: &bucket.competitors,
                    })
                })
            })
        })
    }
}

/// Groups `competitors` into a division tree.
///
/// Gender order is m, f, u; groups keep first-seen order; forms precede
/// sparring; sparring subgroups are A, B, other. Leaves are stably sorted by
/// descending win count. Empty levels never appear in the result.
pub fn classify(competitors: &[Competitor]) -> DivisionTree {
    let mut divisions = Vec::new();

    for gender in Gender::all() {
        let of_gender: Vec<&Competitor> = competitors.iter().filter(|c| c.gender == *gender).collect();

        let mut groups = Vec::new();
        for group in first_seen(of_gender.iter().map(|c| c.group_label.trim())) {
            let of_group: Vec<&Competitor> = of_gender
                .iter()
                .copied()
                .filter(|c| c.group_label.trim() == group)
                .collect();

            let disciplines: Vec<DisciplineDivision> = [DisciplineKind::Forms, DisciplineKind::Sparring]
                .into_iter()
                .filter_map(|kind| {
                    let of_kind: Vec<&Competitor> = of_group
                        .iter()
                        .copied()
                        .filter(|c| DisciplineKind::from_label(&c.program) == kind)
                        .collect();
                    discipline_division(kind, &of_kind)
                })
                .collect();

            if !disciplines.is_empty() {
                groups.push(GroupDivision {
                    group: group.to_string(),
                    disciplines,
                });
            }
        }

        if !groups.is_empty() {
            divisions.push(GenderDivision {
                gender: *gender,
                groups,
            });
        }
    }

    DivisionTree { divisions }
}

fn discipline_division(kind: DisciplineKind, competitors: &[&Competitor]) -> Option<DisciplineDivision> {
    let buckets: Vec<Bucket> = match kind {
        DisciplineKind::Forms => vec![bucket(None, competitors.iter().copied())],
        DisciplineKind::Sparring => Subgroup::all()
            .iter()
            .map(|subgroup| {
                bucket(
                    Some(*subgroup),
                    competitors
                        .iter()
                        .copied()
                        .filter(|c| Subgroup::from_label(&c.program) == *subgroup),
                )
            })
            .collect(),
    };

    let buckets: Vec<Bucket> = buckets.into_iter().filter(|b| !b.competitors.is_empty()).collect();
    if buckets.is_empty() {
        None
    } else {
        Some(DisciplineDivision {
            discipline: kind,
            buckets,
        })
    }
}

fn bucket<'a>(subgroup: Option<Subgroup>, competitors: impl Iterator<Item = &'a Competitor>) -> Bucket {
    let mut competitors: Vec<Competitor> = competitors.cloned().collect();
    // sort_by is stable: ties keep roster order
    competitors.sort_by(|a, b| b.win_count.cmp(&a.win_count));
    Bucket {
        subgroup,
        competitors,
    }
}

fn first_seen<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for label in labels {
        if !seen.contains(&label) {
            seen.push(label);
        }
    }
    seen
}
