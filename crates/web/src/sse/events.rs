//! Events pushed to viewer screens

use serde::{Deserialize, Serialize};
use storage::dto::match_up::MatchContext;

/// Match-state change published on the broadcast topic.
///
/// Serialised with a `type` discriminant, e.g.
/// `{"type":"timer_update","remaining_seconds":179}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    TimerUpdate { remaining_seconds: u32 },
    TimerPause { remaining_seconds: u32 },
    TimerResume { remaining_seconds: u32 },
    Winner {
        winner: String,
        school: Option<String>,
    },
    MatchUpdate(MatchContext),
}

impl SessionEvent {
    /// Discriminant tag, also used as the SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimerUpdate { .. } => "timer_update",
            Self::TimerPause { .. } => "timer_pause",
            Self::TimerResume { .. } => "timer_resume",
            Self::Winner { .. } => "winner",
            Self::MatchUpdate(_) => "match_update",
        }
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        match self {
            Self::TimerUpdate { remaining_seconds }
            | Self::TimerPause { remaining_seconds }
            | Self::TimerResume { remaining_seconds } => Some(*remaining_seconds),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format_carries_type_tag() {
        let event = SessionEvent::TimerUpdate {
            remaining_seconds: 179,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "timer_update", "remaining_seconds": 179})
        );

        let winner = SessionEvent::Winner {
            winner: "Alice".to_string(),
            school: Some("Dojo East".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&winner).unwrap(),
            json!({"type": "winner", "winner": "Alice", "school": "Dojo East"})
        );
    }

    #[test]
    fn test_match_update_flattens_context() {
        let event = SessionEvent::MatchUpdate(MatchContext {
            player1: "Alice".to_string(),
            player2: "Beth".to_string(),
            gender: None,
            group: "U10".to_string(),
            program: "组手".to_string(),
            subgroup: Some("A".to_string()),
            school: None,
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "match_update");
        assert_eq!(value["player1"], "Alice");
        assert_eq!(value["subgroup"], "A");
        assert_eq!(event.kind(), "match_update");
        assert_eq!(event.remaining_seconds(), None);
    }
}
