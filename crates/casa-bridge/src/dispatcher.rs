//! Intent dispatcher: SYNC, QUERY and EXECUTE orchestration
//!
//! Each intent is stateless across calls. Concurrency is pure
//! fan-out/fan-in over independent async operations (per-device reads
//! for QUERY, per-group and per-device writes for EXECUTE), with result
//! ordering always following input ordering, never completion ordering.

use std::sync::Arc;

use casa_core::models::{
    CapabilityDevice, CommandBatch, CommandRequest, CommandResult, CommandStatus, DesiredState,
    DeviceRef, ExecutePayload, GatewayDevice, QueryPayload, StateSnapshot, SyncPayload,
};
use casa_core::{DeviceGateway, Session, StateReporter};
use futures::future;

use crate::translator;
use crate::{Error, Result};

/// Dispatches assistant intents over the gateway collaborators.
pub struct IntentDispatcher {
    gateway: Arc<dyn DeviceGateway>,
    reporter: Option<Arc<dyn StateReporter>>,
}

impl IntentDispatcher {
    pub fn new(gateway: Arc<dyn DeviceGateway>) -> Self {
        Self {
            gateway,
            reporter: None,
        }
    }

    /// Attach a best-effort state reporter notified after successful
    /// executes.
    pub fn with_reporter(mut self, reporter: Arc<dyn StateReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// SYNC: list everything the session can see, classify, and drop
    /// what the bridge does not map. A transport failure fails the
    /// whole call; discovery has no partial-failure concept.
    pub async fn sync(&self, session: &Session) -> Result<SyncPayload> {
        let things = self.gateway.list_devices(session, None).await?;
        let devices: Vec<CapabilityDevice> =
            things.iter().filter_map(translator::classify).collect();

        tracing::debug!(
            listed = things.len(),
            mapped = devices.len(),
            "sync complete"
        );

        Ok(SyncPayload {
            agent_user_id: session.agent_user_id.clone(),
            devices,
        })
    }

    /// QUERY: read every requested device concurrently. A failing
    /// device yields `{online:false}` for that device only; response
    /// entries follow the request order regardless of which read
    /// finishes first.
    pub async fn query(&self, session: &Session, devices: &[DeviceRef]) -> Result<QueryPayload> {
        let ids: Vec<String> = devices.iter().map(|d| d.id.clone()).collect();
        let things = self.gateway.list_devices(session, Some(&ids)).await?;

        let mut reads = Vec::with_capacity(ids.len());
        for id in &ids {
            let thing = things.iter().find(|t| t.id() == id.as_str());
            reads.push(async move {
                match thing {
                    Some(thing) => {
                        let snapshot =
                            translator::read_state(self.gateway.as_ref(), session, thing).await;
                        (id.clone(), snapshot)
                    }
                    None => {
                        tracing::debug!(device = %id, "queried device not reported by gateway");
                        (id.clone(), StateSnapshot::offline())
                    }
                }
            });
        }

        Ok(QueryPayload {
            devices: future::join_all(reads).await,
        })
    }

    /// EXECUTE: merge each group's steps into one change set, apply it
    /// to every target device, and aggregate one binary result per
    /// group. Groups run concurrently; so do the devices inside a
    /// group. Malformed params fail the whole request before any
    /// device work begins.
    pub async fn execute(
        &self,
        session: &Session,
        commands: &[CommandRequest],
    ) -> Result<ExecutePayload> {
        let mut batches = Vec::with_capacity(commands.len());
        for group in commands {
            let desired = DesiredState::from_params(group.merged_params())
                .map_err(|err| Error::InvalidParams(err.to_string()))?;
            batches.push(CommandBatch {
                device_ids: group.device_ids(),
                desired,
            });
        }

        let groups = batches
            .iter()
            .map(|batch| self.execute_group(session, batch));

        Ok(ExecutePayload {
            commands: future::join_all(groups).await,
        })
    }

    async fn execute_group(&self, session: &Session, batch: &CommandBatch) -> CommandResult {
        let things = match self
            .gateway
            .list_devices(session, Some(&batch.device_ids))
            .await
        {
            Ok(things) => things,
            Err(err) => {
                tracing::warn!(
                    ids = ?batch.device_ids,
                    error = %err,
                    "execute group could not resolve its devices"
                );
                return offline_result(batch);
            }
        };

        let mut writes = Vec::with_capacity(things.len());
        for thing in &things {
            writes.push(async move {
                let snapshot =
                    translator::apply_state(self.gateway.as_ref(), session, thing, &batch.desired)
                        .await;
                (thing, snapshot)
            });
        }
        let outcomes = future::join_all(writes).await;

        if outcomes.iter().any(|(_, snapshot)| !snapshot.online) {
            return offline_result(batch);
        }

        self.report_outcomes(session, &outcomes);

        CommandResult {
            ids: batch.device_ids.clone(),
            status: CommandStatus::Success,
            states: batch.desired.projection(),
            error_code: None,
        }
    }

    /// Hand the post-write snapshots to the reporter on detached tasks.
    /// Never awaited on the request path; failures are logged only.
    fn report_outcomes(&self, session: &Session, outcomes: &[(&GatewayDevice, StateSnapshot)]) {
        let Some(reporter) = &self.reporter else {
            return;
        };

        for (thing, snapshot) in outcomes {
            let reporter = Arc::clone(reporter);
            let agent_user_id = session.agent_user_id.clone();
            let device_id = thing.id().to_string();
            let snapshot = snapshot.clone();

            tokio::spawn(async move {
                if let Err(err) = reporter
                    .report_state(&agent_user_id, &device_id, &snapshot)
                    .await
                {
                    tracing::warn!(device = %device_id, error = %err, "state change report failed");
                }
            });
        }
    }
}

fn offline_result(batch: &CommandBatch) -> CommandResult {
    CommandResult {
        ids: batch.device_ids.clone(),
        status: CommandStatus::Offline,
        states: StateSnapshot::offline(),
        error_code: Some("deviceOffline".to_string()),
    }
}
