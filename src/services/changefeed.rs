//! Change propagation router
//!
//! Entity tables carry a NOTIFY trigger publishing row-level deltas on one
//! Postgres channel. A long-lived task listens on that channel and fans each
//! event out to in-process observers registered per table, optionally narrowed
//! by a filter over the row JSON. Delivery for a given table follows commit
//! order; nothing is promised across tables.
//!
//! The feed is at-most-once: `PgListener` reconnects after a drop, but
//! notifications published during the gap are gone. An observer that needs a
//! consistent projection after a gap must re-fetch.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{postgres::PgListener, Pool, Postgres};
use tokio::sync::mpsc;
use utoipa::ToSchema;

/// Postgres channel the entity triggers publish on
pub const NOTIFY_CHANNEL: &str = "rentdesk_changes";

/// Entity tables covered by the change feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    DeviceTypes,
    Devices,
    Reservations,
    Accessories,
    SubscriptionPayments,
}

/// Change kind, as reported by the trigger's TG_OP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Op {
    Insert,
    Update,
    Delete,
}

/// One row-level delta
///
/// `row` is the new row for inserts/updates and the old row for deletes;
/// `old` is the previous row on updates. Either may be absent when the
/// trigger had to drop an oversized payload, in which case observers
/// re-fetch by id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangeEvent {
    pub table: Table,
    pub op: Op,
    #[serde(default)]
    pub row: Option<Value>,
    #[serde(default)]
    pub old: Option<Value>,
}

type Filter = Box<dyn Fn(&ChangeEvent) -> bool + Send + Sync>;

struct Observer {
    filter: Option<Filter>,
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

/// Per-table observer registry and dispatcher
#[derive(Default)]
pub struct ChangeFeedRouter {
    observers: RwLock<HashMap<Table, Vec<Observer>>>,
}

impl ChangeFeedRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for every change on a table
    pub fn subscribe(&self, table: Table) -> mpsc::UnboundedReceiver<ChangeEvent> {
        self.subscribe_with(table, None)
    }

    /// Register an observer narrowed by a row predicate
    pub fn subscribe_filtered<F>(&self, table: Table, filter: F) -> mpsc::UnboundedReceiver<ChangeEvent>
    where
        F: Fn(&ChangeEvent) -> bool + Send + Sync + 'static,
    {
        self.subscribe_with(table, Some(Box::new(filter)))
    }

    fn subscribe_with(
        &self,
        table: Table,
        filter: Option<Filter>,
    ) -> mpsc::UnboundedReceiver<ChangeEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers
            .write()
            .expect("observer registry poisoned")
            .entry(table)
            .or_default()
            .push(Observer { filter, tx });
        rx
    }

    /// Deliver one event to every matching observer on its table
    ///
    /// Sends are unbounded and never block; observers whose receiver is gone
    /// are pruned here.
    pub fn dispatch(&self, event: &ChangeEvent) {
        let mut registry = self.observers.write().expect("observer registry poisoned");
        if let Some(list) = registry.get_mut(&event.table) {
            list.retain(|observer| {
                if let Some(filter) = &observer.filter {
                    if !filter(event) {
                        return !observer.tx.is_closed();
                    }
                }
                observer.tx.send(event.clone()).is_ok()
            });
        }
    }

    /// Consume the Postgres feed forever, dispatching to observers
    ///
    /// Reconnects with a short pause after any listener error; events
    /// committed during the gap are not replayed.
    pub async fn run(&self, pool: Pool<Postgres>) {
        loop {
            match PgListener::connect_with(&pool).await {
                Ok(mut listener) => {
                    if let Err(e) = listener.listen(NOTIFY_CHANNEL).await {
                        tracing::warn!("change feed LISTEN failed: {}", e);
                    } else {
                        tracing::info!(channel = NOTIFY_CHANNEL, "change feed connected");
                        loop {
                            match listener.recv().await {
                                Ok(notification) => {
                                    match serde_json::from_str::<ChangeEvent>(notification.payload()) {
                                        Ok(event) => self.dispatch(&event),
                                        Err(e) => tracing::warn!(
                                            payload = notification.payload(),
                                            "unparseable change payload: {}",
                                            e
                                        ),
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        "change feed dropped ({}); events during the gap are lost",
                                        e
                                    );
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("change feed connection failed: {}", e);
                }
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    #[cfg(test)]
    fn observer_count(&self, table: Table) -> usize {
        self.observers
            .read()
            .unwrap()
            .get(&table)
            .map(|l| l.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insert_event(table: Table, row: Value) -> ChangeEvent {
        ChangeEvent {
            table,
            op: Op::Insert,
            row: Some(row),
            old: None,
        }
    }

    #[tokio::test]
    async fn test_observer_receives_table_events() {
        let router = ChangeFeedRouter::new();
        let mut rx = router.subscribe(Table::Devices);

        router.dispatch(&insert_event(Table::Devices, json!({"id": 1})));
        router.dispatch(&insert_event(Table::Accessories, json!({"id": 2})));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.table, Table::Devices);
        // nothing else queued: the accessories event went elsewhere
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_filter_narrows_delivery() {
        let router = ChangeFeedRouter::new();
        let mut rx = router.subscribe_filtered(Table::Reservations, |event| {
            event
                .row
                .as_ref()
                .and_then(|r| r.get("device_type_id"))
                .and_then(Value::as_i64)
                == Some(7)
        });

        router.dispatch(&insert_event(Table::Reservations, json!({"id": 1, "device_type_id": 3})));
        router.dispatch(&insert_event(Table::Reservations, json!({"id": 2, "device_type_id": 7})));

        let received = rx.recv().await.unwrap();
        assert_eq!(
            received.row.unwrap().get("id").and_then(Value::as_i64),
            Some(2)
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_events_arrive_in_dispatch_order() {
        let router = ChangeFeedRouter::new();
        let mut rx = router.subscribe(Table::Reservations);

        for id in 1..=5 {
            router.dispatch(&insert_event(Table::Reservations, json!({"id": id})));
        }
        for id in 1..=5 {
            let received = rx.recv().await.unwrap();
            assert_eq!(
                received.row.unwrap().get("id").and_then(Value::as_i64),
                Some(id)
            );
        }
    }

    #[tokio::test]
    async fn test_dropped_observer_is_pruned() {
        let router = ChangeFeedRouter::new();
        let rx = router.subscribe(Table::Devices);
        let mut rx2 = router.subscribe(Table::Devices);
        assert_eq!(router.observer_count(Table::Devices), 2);

        drop(rx);
        router.dispatch(&insert_event(Table::Devices, json!({"id": 1})));

        assert_eq!(router.observer_count(Table::Devices), 1);
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_dispatch_without_observers_is_noop() {
        let router = ChangeFeedRouter::new();
        router.dispatch(&insert_event(Table::SubscriptionPayments, json!({"id": 1})));
    }

    #[test]
    fn test_trigger_payload_parses() {
        let payload = r#"{"table": "reservations", "op": "INSERT", "row": {"id": 9, "status": 0}}"#;
        let event: ChangeEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.table, Table::Reservations);
        assert_eq!(event.op, Op::Insert);
        assert!(event.old.is_none());
    }
}
