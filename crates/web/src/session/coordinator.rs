//! Live match session: countdown timer, current bout and winner recording.
//!
//! One coordinator exists per process. Every command and every tick takes the
//! same lock, mutates the session and publishes the resulting event before
//! releasing it, so viewers see events in the order the state changed.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use storage::dto::match_up::MatchContext;
use storage::error::Result;
use storage::models::MatchUp;
use storage::repository::match_up::SettledMatch;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ledger::MatchLedger;
use crate::sse::{Broadcaster, SessionEvent};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Active,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, Default)]
struct TimerState {
    remaining_seconds: u32,
    paused: bool,
    active: bool,
    finished: bool,
}

impl TimerState {
    fn phase(&self) -> SessionPhase {
        match (self.active, self.paused, self.finished) {
            (true, false, _) => SessionPhase::Active,
            (true, true, _) => SessionPhase::Paused,
            (false, _, true) => SessionPhase::Finished,
            (false, _, false) => SessionPhase::Idle,
        }
    }
}

#[derive(Debug, Default)]
struct Session {
    session_id: Option<Uuid>,
    timer: TimerState,
    /// Bumped whenever the countdown is (re)armed or stopped. A ticker whose
    /// generation no longer matches exits on its next wake-up.
    generation: u64,
    ticking: bool,
    pending_match: Option<MatchUp>,
}

/// Point-in-time view of the session for the operator console.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub session_id: Option<Uuid>,
    pub phase: SessionPhase,
    pub remaining_seconds: u32,
    pub paused: bool,
    pub active: bool,
    pub pending_match: Option<MatchUp>,
}

struct Inner {
    session: Mutex<Session>,
    broadcaster: Broadcaster,
    ledger: Arc<dyn MatchLedger>,
    tick_interval: Duration,
}

#[derive(Clone)]
pub struct MatchCoordinator {
    inner: Arc<Inner>,
}

impl MatchCoordinator {
    pub fn new(broadcaster: Broadcaster, ledger: Arc<dyn MatchLedger>) -> Self {
        Self::with_tick_interval(broadcaster, ledger, TICK_INTERVAL)
    }

    pub fn with_tick_interval(
        broadcaster: Broadcaster,
        ledger: Arc<dyn MatchLedger>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session::default()),
                broadcaster,
                ledger,
                tick_interval,
            }),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.inner.session.lock().await;
        SessionSnapshot {
            session_id: session.session_id,
            phase: session.timer.phase(),
            remaining_seconds: session.timer.remaining_seconds,
            paused: session.timer.paused,
            active: session.timer.active,
            pending_match: session.pending_match.clone(),
        }
    }

    /// Start (or restart) the countdown from `remaining_seconds`.
    ///
    /// The first tick always lands one full interval after this call.
    pub async fn start(&self, remaining_seconds: u32) {
        let mut session = self.inner.session.lock().await;
        let session_id = Uuid::new_v4();
        session.session_id = Some(session_id);
        info!("Session {} started with {}s on the clock", session_id, remaining_seconds);

        self.inner
            .broadcaster
            .publish(SessionEvent::TimerUpdate { remaining_seconds });
        self.arm(&mut session, remaining_seconds);
    }

    /// Freeze the countdown at `remaining_seconds` as shown on the console.
    pub async fn pause(&self, remaining_seconds: u32) {
        let mut session = self.inner.session.lock().await;
        session.timer.remaining_seconds = remaining_seconds;
        session.timer.paused = true;
        Self::disarm(&mut session);
        debug!("Session paused at {}s", remaining_seconds);

        self.inner
            .broadcaster
            .publish(SessionEvent::TimerPause { remaining_seconds });
    }

    pub async fn resume(&self, remaining_seconds: u32) {
        let mut session = self.inner.session.lock().await;
        debug!("Session resumed at {}s", remaining_seconds);

        self.inner
            .broadcaster
            .publish(SessionEvent::TimerResume { remaining_seconds });
        self.arm(&mut session, remaining_seconds);
    }

    /// Register the bout that is about to be fought and show it to viewers.
    pub async fn record_match(&self, context: MatchContext) -> Result<MatchUp> {
        let match_up = self.inner.ledger.open_match(&context).await?;

        let mut session = self.inner.session.lock().await;
        if let Some(previous) = session.pending_match.replace(match_up.clone()) {
            debug!("Match-up {} replaced before a winner was recorded", previous.match_up_id);
        }
        info!(
            "Match-up {}: {} vs {}",
            match_up.match_up_id, context.player1, context.player2
        );

        self.inner
            .broadcaster
            .publish(SessionEvent::MatchUpdate(context));
        Ok(match_up)
    }

    /// Declare the winner of the current bout and stop the clock.
    ///
    /// The ledger is settled first. If that fails the session is left exactly
    /// as it was and no event is published.
    pub async fn record_winner(&self, winner: &str, context: &MatchContext) -> Result<SettledMatch> {
        if !context.involves(winner) {
            warn!(
                "Winner '{}' is neither {} nor {}",
                winner, context.player1, context.player2
            );
        }

        let mut session = self.inner.session.lock().await;
        let pending_id = session.pending_match.as_ref().map(|m| m.match_up_id);
        let settled = self
            .inner
            .ledger
            .settle_match(pending_id, context, winner)
            .await?;

        session.timer.paused = true;
        session.timer.active = false;
        session.timer.finished = true;
        session.pending_match = None;
        Self::disarm(&mut session);

        let school = settled
            .winner
            .as_ref()
            .and_then(|c| c.affiliation().map(str::to_string))
            .or_else(|| context.school.clone());
        info!("Match-up {} won by {}", settled.match_up.match_up_id, winner);

        self.inner.broadcaster.publish(SessionEvent::Winner {
            winner: winner.to_string(),
            school,
        });
        Ok(settled)
    }

    /// Run the clock from `remaining_seconds` with a fresh ticker. Nothing is
    /// left to count at zero, so the session finishes on the spot.
    fn arm(&self, session: &mut Session, remaining_seconds: u32) {
        Self::disarm(session);

        if remaining_seconds == 0 {
            session.timer = TimerState {
                remaining_seconds,
                paused: false,
                active: false,
                finished: true,
            };
            info!("Time expired");
            return;
        }

        session.timer = TimerState {
            remaining_seconds,
            paused: false,
            active: true,
            finished: false,
        };
        session.ticking = true;
        tokio::spawn(self.clone().run_ticker(session.generation));
    }

    fn disarm(session: &mut Session) {
        session.generation = session.generation.wrapping_add(1);
        session.ticking = false;
    }

    async fn run_ticker(self, generation: u64) {
        debug!("Ticker {} started", generation);
        loop {
            tokio::time::sleep(self.inner.tick_interval).await;

            let mut session = self.inner.session.lock().await;
            if session.generation != generation {
                debug!("Ticker {} superseded", generation);
                return;
            }

            let remaining_seconds = session.timer.remaining_seconds.saturating_sub(1);
            session.timer.remaining_seconds = remaining_seconds;
            self.inner
                .broadcaster
                .publish(SessionEvent::TimerUpdate { remaining_seconds });

            if remaining_seconds == 0 {
                session.timer.active = false;
                session.timer.finished = true;
                Self::disarm(&mut session);
                info!("Time expired");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use storage::error::StorageError;
    use tokio::sync::broadcast::Receiver;
    use tokio::time::sleep;

    #[derive(Default)]
    struct FakeLedger {
        settled: std::sync::Mutex<Vec<(Option<Uuid>, String)>>,
        reject_settle: bool,
    }

    fn match_up(context: &MatchContext, winner: Option<&str>) -> MatchUp {
        MatchUp {
            match_up_id: Uuid::new_v4(),
            player1: context.player1.clone(),
            player2: context.player2.clone(),
            gender: context.gender.clone(),
            group_label: context.group.clone(),
            program: context.program.clone(),
            subgroup: context.subgroup.clone(),
            school: context.school.clone(),
            winner: winner.map(str::to_string),
            created_at: Utc::now().naive_utc(),
            decided_at: None,
        }
    }

    #[async_trait]
    impl MatchLedger for FakeLedger {
        async fn open_match(&self, context: &MatchContext) -> Result<MatchUp> {
            Ok(match_up(context, None))
        }

        async fn settle_match(
            &self,
            match_up_id: Option<Uuid>,
            context: &MatchContext,
            winner: &str,
        ) -> Result<SettledMatch> {
            if self.reject_settle {
                return Err(StorageError::ConstraintViolation("already decided".to_string()));
            }
            self.settled
                .lock()
                .unwrap()
                .push((match_up_id, winner.to_string()));
            Ok(SettledMatch {
                match_up: match_up(context, Some(winner)),
                winner: None,
            })
        }
    }

    fn setup(ledger: Arc<FakeLedger>) -> (MatchCoordinator, Receiver<SessionEvent>) {
        let broadcaster = Broadcaster::new("match_updates", 64);
        let rx = broadcaster.subscribe();
        (MatchCoordinator::new(broadcaster, ledger), rx)
    }

    fn drain(rx: &mut Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn updates(events: &[SessionEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::TimerUpdate { remaining_seconds } => Some(*remaining_seconds),
                _ => None,
            })
            .collect()
    }

    async fn ticking(coordinator: &MatchCoordinator) -> bool {
        coordinator.inner.session.lock().await.ticking
    }

    fn context() -> MatchContext {
        MatchContext {
            player1: "Alice".to_string(),
            player2: "Beth".to_string(),
            gender: Some("f".to_string()),
            group: "U10".to_string(),
            program: "组手".to_string(),
            subgroup: Some("A".to_string()),
            school: Some("Dojo East".to_string()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_once_per_second() {
        let (coordinator, mut rx) = setup(Arc::default());

        coordinator.start(180).await;
        sleep(Duration::from_millis(5_500)).await;

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.remaining_seconds, 175);
        assert_eq!(snapshot.phase, SessionPhase::Active);
        assert!(snapshot.session_id.is_some());
        assert_eq!(updates(&drain(&mut rx)), vec![180, 179, 178, 177, 176, 175]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_and_resume_continues() {
        let (coordinator, mut rx) = setup(Arc::default());

        coordinator.start(180).await;
        sleep(Duration::from_millis(2_500)).await;
        coordinator.pause(120).await;
        sleep(Duration::from_secs(3)).await;

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.remaining_seconds, 120);
        assert!(snapshot.paused);
        assert_eq!(snapshot.phase, SessionPhase::Paused);

        let events = drain(&mut rx);
        assert_eq!(
            events.last(),
            Some(&SessionEvent::TimerPause {
                remaining_seconds: 120
            })
        );
        assert_eq!(updates(&events), vec![180, 179, 178]);

        coordinator.resume(120).await;
        sleep(Duration::from_millis(1_200)).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::TimerResume {
                    remaining_seconds: 120
                },
                SessionEvent::TimerUpdate {
                    remaining_seconds: 119
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_realigns_ticks_to_the_restart() {
        let (coordinator, mut rx) = setup(Arc::default());

        coordinator.start(10).await;
        sleep(Duration::from_millis(1_500)).await;
        coordinator.start(10).await;

        // The first ticker would have fired at 2.0s
        sleep(Duration::from_millis(900)).await;
        assert_eq!(updates(&drain(&mut rx)), vec![10, 9, 10]);

        sleep(Duration::from_millis(1_300)).await;
        assert_eq!(updates(&drain(&mut rx)), vec![9, 8]);
        assert_eq!(coordinator.snapshot().await.remaining_seconds, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_waits_a_full_interval_before_ticking() {
        let (coordinator, mut rx) = setup(Arc::default());

        coordinator.start(180).await;
        sleep(Duration::from_millis(2_500)).await;
        coordinator.pause(120).await;
        sleep(Duration::from_millis(1_400)).await;
        coordinator.resume(120).await;
        drain(&mut rx);

        sleep(Duration::from_millis(900)).await;
        assert!(updates(&drain(&mut rx)).is_empty());
        assert_eq!(coordinator.snapshot().await.remaining_seconds, 120);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(updates(&drain(&mut rx)), vec![119]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_at_zero_finishes_immediately() {
        let (coordinator, mut rx) = setup(Arc::default());

        coordinator.start(0).await;

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Finished);
        assert!(!snapshot.active);
        assert!(!ticking(&coordinator).await);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(
            drain(&mut rx),
            vec![SessionEvent::TimerUpdate {
                remaining_seconds: 0
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_stops_at_zero() {
        let (coordinator, mut rx) = setup(Arc::default());

        coordinator.start(3).await;
        sleep(Duration::from_secs(10)).await;

        assert_eq!(updates(&drain(&mut rx)), vec![3, 2, 1, 0]);
        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.phase, SessionPhase::Finished);
        assert!(!ticking(&coordinator).await);

        coordinator.start(4).await;
        assert!(ticking(&coordinator).await);
        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(coordinator.snapshot().await.remaining_seconds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_winner_stops_the_clock() {
        let ledger = Arc::new(FakeLedger::default());
        let (coordinator, mut rx) = setup(ledger.clone());

        coordinator.start(60).await;
        sleep(Duration::from_millis(1_500)).await;
        let opened = coordinator.record_match(context()).await.unwrap();
        assert_eq!(
            coordinator.snapshot().await.pending_match.map(|m| m.match_up_id),
            Some(opened.match_up_id)
        );

        coordinator.record_winner("Alice", &context()).await.unwrap();
        sleep(Duration::from_secs(3)).await;

        let events = drain(&mut rx);
        assert_eq!(updates(&events), vec![60, 59]);
        assert_eq!(events[2], SessionEvent::MatchUpdate(context()));
        assert_eq!(
            events[3],
            SessionEvent::Winner {
                winner: "Alice".to_string(),
                school: Some("Dojo East".to_string()),
            }
        );
        assert_eq!(events.len(), 4);

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Finished);
        assert!(snapshot.paused);
        assert!(!snapshot.active);
        assert!(snapshot.pending_match.is_none());
        assert!(!ticking(&coordinator).await);

        let settled = ledger.settled.lock().unwrap().clone();
        assert_eq!(settled, vec![(Some(opened.match_up_id), "Alice".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_winner_leaves_session_running() {
        let ledger = Arc::new(FakeLedger {
            reject_settle: true,
            ..Default::default()
        });
        let (coordinator, mut rx) = setup(ledger);

        coordinator.start(30).await;
        coordinator.record_match(context()).await.unwrap();
        let result = coordinator.record_winner("Beth", &context()).await;

        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Active);
        assert!(snapshot.pending_match.is_some());
        assert!(
            !drain(&mut rx)
                .iter()
                .any(|e| matches!(e, SessionEvent::Winner { .. }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_winner_without_open_match_records_new_bout() {
        let ledger = Arc::new(FakeLedger::default());
        let (coordinator, _rx) = setup(ledger.clone());

        coordinator.record_winner("Beth", &context()).await.unwrap();

        let settled = ledger.settled.lock().unwrap().clone();
        assert_eq!(settled, vec![(None, "Beth".to_string())]);
        assert_eq!(coordinator.snapshot().await.phase, SessionPhase::Finished);
    }
}
