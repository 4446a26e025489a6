//! Live change feed endpoint (SSE)

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Deserialize;
use tokio_stream::{wrappers::UnboundedReceiverStream, Stream, StreamExt};
use utoipa::IntoParams;

use crate::services::changefeed::Table;

#[derive(Debug, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// Entity table to follow (snake_case table name)
    pub table: Table,
}

/// Follow row-level changes on one entity table as server-sent events
///
/// Delivery is at-most-once: events published while a client is reconnecting
/// are not replayed, so clients should re-fetch after a gap.
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(EventsQuery),
    responses(
        (status = 200, description = "SSE stream of change events")
    )
)]
pub async fn subscribe(
    State(state): State<crate::AppState>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.changefeed.subscribe(query.table);

    let stream = UnboundedReceiverStream::new(rx).map(|change| {
        let event = match serde_json::to_string(&change) {
            Ok(json) => Event::default().data(json),
            Err(e) => {
                tracing::warn!("unserializable change event: {}", e);
                Event::default().comment("serialization error")
            }
        };
        Ok::<_, Infallible>(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
