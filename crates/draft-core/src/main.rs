use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use db::notify::OutboxListener;
use db::repositories::{SqlxDraftRepository, SqlxOutboxRepository};
use domain::repositories::InMemoryPlayerPool;
use domain::services::{DraftStoreService, UniformRandomStrategy};
use eventbus::{connect_jetstream, NatsEventConsumer, NatsEventPublisher};
use orchestrator::Orchestrator;
use outbox_dispatcher::OutboxDispatcher;

mod config;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "draft_core=info,orchestrator=info,outbox_dispatcher=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("starting draft control core");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("database connection pool created");
    db::run_migrations(&pool).await?;
    tracing::info!("schema migrations applied");

    let synthetic_players: Vec<Uuid> = (0..config.synthetic_player_pool_size)
        .map(|_| Uuid::new_v4())
        .collect();
    let player_pool = Arc::new(InMemoryPlayerPool::new(synthetic_players));

    let draft_repo = Arc::new(SqlxDraftRepository::new(pool.clone(), player_pool));
    let outbox_repo: Arc<dyn domain::repositories::OutboxRepository> =
        Arc::new(SqlxOutboxRepository::new(pool.clone()));
    let store = Arc::new(DraftStoreService::new(draft_repo.clone()));
    let strategy = Arc::new(UniformRandomStrategy::new(draft_repo));

    let bus_config = config.event_bus_config();
    let publisher_jetstream = connect_jetstream(&config.nats_url).await?;
    let publisher = Arc::new(NatsEventPublisher::new(
        publisher_jetstream,
        bus_config.subject_prefix.clone(),
    ));
    let consumer = Box::new(NatsEventConsumer::connect(&bus_config).await?);
    tracing::info!("connected to NATS JetStream");

    let listener = OutboxListener::connect(&config.database_url).await?;
    tracing::info!("outbox NOTIFY listener connected");

    let root_shutdown = CancellationToken::new();

    let dispatcher = Arc::new(OutboxDispatcher::new(
        outbox_repo.clone(),
        publisher,
        config.dispatcher_config(),
    ));
    let dispatcher_shutdown = root_shutdown.child_token();
    let dispatcher_handle = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.run(listener, dispatcher_shutdown).await }
    });

    let orchestrator = Arc::new(Orchestrator::new(
        store,
        outbox_repo,
        strategy,
        config.orchestrator_config(),
    ));
    let orchestrator_shutdown = root_shutdown.child_token();
    let orchestrator_handle = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.run(consumer, orchestrator_shutdown).await }
    });

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, cancelling subsystems");
    root_shutdown.cancel();

    let shutdown_deadline = config.shutdown_deadline;
    if tokio::time::timeout(shutdown_deadline, async {
        let _ = dispatcher_handle.await;
        let _ = orchestrator_handle.await;
    })
    .await
    .is_err()
    {
        tracing::warn!(
            deadline_secs = shutdown_deadline.as_secs(),
            "subsystems did not finish shutting down within the deadline, abandoning"
        );
    }

    tracing::info!("draft control core shut down");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
