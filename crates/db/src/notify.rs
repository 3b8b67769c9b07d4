use sqlx::postgres::PgListener;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{DbError, DbResult};

pub const OUTBOX_CHANNEL: &str = "draft_outbox_events";

/// Dedicated, auto-reconnecting LISTEN connection for the outbox
/// notification channel. A trigger on `draft_outbox` insert NOTIFYs this
/// channel with the new row's id as payload. The dispatcher uses this to
/// react in real time; a periodic sweep over unsent rows remains the
/// fallback in case a notification is dropped.
pub struct OutboxListener {
    database_url: String,
    listener: PgListener,
}

impl OutboxListener {
    pub async fn connect(database_url: &str) -> DbResult<Self> {
        let mut listener = PgListener::connect(database_url).await.map_err(DbError::from)?;
        listener.listen(OUTBOX_CHANNEL).await.map_err(DbError::from)?;

        Ok(Self {
            database_url: database_url.to_string(),
            listener,
        })
    }

    /// Waits for the next notification, reconnecting and re-subscribing on
    /// connection loss. Returns `None` only if the payload cannot be parsed
    /// as a uuid (logged and skipped, never fatal). `PgListener` holds its
    /// own connection open across calls; there is no separate keepalive
    /// step, so a dropped connection only surfaces here, on the next recv.
    pub async fn recv(&mut self) -> DbResult<Option<Uuid>> {
        loop {
            match self.listener.recv().await {
                Ok(notification) => {
                    return match notification.payload().parse::<Uuid>() {
                        Ok(id) => Ok(Some(id)),
                        Err(e) => {
                            warn!(error = %e, payload = notification.payload(), "outbox notification payload was not a uuid");
                            Ok(None)
                        }
                    };
                }
                Err(e) => {
                    warn!(error = %e, "outbox listener connection lost, reconnecting");
                    self.reconnect().await?;
                }
            }
        }
    }

    async fn reconnect(&mut self) -> DbResult<()> {
        let mut listener = PgListener::connect(&self.database_url).await.map_err(DbError::from)?;
        listener.listen(OUTBOX_CHANNEL).await.map_err(DbError::from)?;
        self.listener = listener;
        info!("outbox listener reconnected");
        Ok(())
    }
}
