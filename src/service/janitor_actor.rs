use crate::db::{ArtifactStorage, CleanupReport};
use crate::error::BuddyError;

use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Messages handled by the janitor actor.
#[derive(Debug)]
pub enum JanitorMessage {
    /// Periodic tick; sweep expired rows and keep the report.
    Sweep,
    /// Sweep right away and reply with the outcome.
    SweepNow(RpcReplyPort<Result<CleanupReport, String>>),
    /// Report from the most recent sweep, if any ran.
    LastReport(RpcReplyPort<Option<CleanupReport>>),
}

/// Handle for interacting with the janitor actor.
#[derive(Clone)]
pub struct JanitorHandle {
    actor: ActorRef<JanitorMessage>,
}

impl JanitorHandle {
    pub async fn sweep_now(&self) -> Result<CleanupReport, BuddyError> {
        ractor::call!(self.actor, JanitorMessage::SweepNow)
            .map_err(|e| BuddyError::RactorError(format!("SweepNow RPC failed: {e}")))?
            .map_err(BuddyError::RactorError)
    }

    pub async fn last_report(&self) -> Result<Option<CleanupReport>, BuddyError> {
        ractor::call!(self.actor, JanitorMessage::LastReport)
            .map_err(|e| BuddyError::RactorError(format!("LastReport RPC failed: {e}")))
    }

    pub fn stop(&self) {
        self.actor.stop(None);
    }
}

struct JanitorState {
    storage: ArtifactStorage,
    last: Option<CleanupReport>,
}

struct JanitorActor;

impl JanitorActor {
    async fn sweep(state: &mut JanitorState) -> Result<CleanupReport, BuddyError> {
        let report = state.storage.cleanup_expired(Utc::now()).await?;
        if report.total() > 0 {
            info!(deleted = report.total(), "expired artifacts removed");
        } else {
            debug!("expiry sweep found nothing to delete");
        }
        state.last = Some(report.clone());
        Ok(report)
    }
}

#[ractor::async_trait]
impl Actor for JanitorActor {
    type Msg = JanitorMessage;
    type State = JanitorState;
    type Arguments = ArtifactStorage;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        storage: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(JanitorState {
            storage,
            last: None,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            JanitorMessage::Sweep => {
                if let Err(e) = Self::sweep(state).await {
                    warn!(error = %e, "periodic expiry sweep failed");
                }
            }
            JanitorMessage::SweepNow(reply) => {
                let result = Self::sweep(state).await.map_err(|e| e.to_string());
                let _ = reply.send(result);
            }
            JanitorMessage::LastReport(reply) => {
                let _ = reply.send(state.last.clone());
            }
        }
        Ok(())
    }
}

/// Start the janitor and a ticker that asks it to sweep every `interval`.
/// The first periodic sweep happens one full interval after start.
pub async fn spawn(
    storage: ArtifactStorage,
    interval: Duration,
) -> Result<JanitorHandle, BuddyError> {
    let (actor, _join) = Actor::spawn(None, JanitorActor, storage)
        .await
        .map_err(|e| BuddyError::RactorError(format!("janitor spawn failed: {e}")))?;

    let ticker = actor.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // interval fires immediately once
        tick.tick().await;
        loop {
            tick.tick().await;
            if ractor::cast!(ticker, JanitorMessage::Sweep).is_err() {
                debug!("janitor stopped; ticker exiting");
                break;
            }
        }
    });

    info!(interval_secs = interval.as_secs(), "expiry janitor started");
    Ok(JanitorHandle { actor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ArtifactKind;
    use serde_json::json;

    #[tokio::test]
    async fn sweep_now_reports_deletions() {
        let storage = ArtifactStorage::connect("sqlite::memory:").await.unwrap();
        let handle = spawn(storage.clone(), Duration::from_secs(3600))
            .await
            .unwrap();

        storage
            .insert(
                ArtifactKind::Password,
                &json!(["a"]),
                chrono::Duration::milliseconds(1),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let report = handle.sweep_now().await.unwrap();
        assert_eq!(report.deleted[&ArtifactKind::Password], 1);
        let last = handle.last_report().await.unwrap().unwrap();
        assert_eq!(last, report);
        handle.stop();
    }
}
