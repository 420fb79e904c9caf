//! # Gateway Bootstrap
//!
//! Builds every component from a [`GatewayConfig`], starts the health loop, the
//! worker pool and the web server, and returns a [`GatewayHandle`] that owns
//! their shutdown.
//!
//! ```rust,no_run
//! use payment_gateway::bootstrap::GatewayBootstrap;
//!
//! # async fn run() -> payment_gateway::error::Result<()> {
//! let handle = GatewayBootstrap::bootstrap().await?;
//! // ... wait for a signal ...
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{ConfigManager, GatewayConfig};
use crate::coordinator::{HttpPeerHealthClient, LeaderCoordinator, PeerHealthClient, ReplicaRole};
use crate::error::{GatewayError, Result};
use crate::gateway::{HttpProcessorGateway, ProcessorGateway};
use crate::health::HealthMonitor;
use crate::models::ProcessorRole;
use crate::persistence::InMemoryPaymentStore;
use crate::queue::TaskQueue;
use crate::services::DispatchService;
use crate::web::{create_app, AppState};
use crate::worker::{TaskDispatcher, WorkerPool};

/// Collaborators the bootstrap would otherwise build from configuration
#[derive(Debug, Clone)]
pub struct GatewayCollaborators {
    pub default_gateway: Arc<dyn ProcessorGateway>,
    pub fallback_gateway: Arc<dyn ProcessorGateway>,
    pub peer: Option<Arc<dyn PeerHealthClient>>,
    pub store: Arc<InMemoryPaymentStore>,
}

impl GatewayCollaborators {
    /// HTTP processor gateways, and a peer client when a leader URL is set
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("payment-gateway/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let processors = &config.processors;
        let default_gateway = HttpProcessorGateway::new(
            ProcessorRole::Default,
            client.clone(),
            &processors.default_url,
            processors.submit_timeout(),
            processors.probe_timeout(),
        )?;
        let fallback_gateway = HttpProcessorGateway::new(
            ProcessorRole::Fallback,
            client.clone(),
            &processors.fallback_url,
            processors.submit_timeout(),
            processors.probe_timeout(),
        )?;

        let peer = match config.replica.leader_url.as_deref() {
            Some(url) => Some(Arc::new(HttpPeerHealthClient::new(
                client,
                url,
                config.replica.peer_timeout(),
            )?) as Arc<dyn PeerHealthClient>),
            None => None,
        };

        Ok(Self {
            default_gateway: Arc::new(default_gateway),
            fallback_gateway: Arc::new(fallback_gateway),
            peer,
            store: Arc::new(InMemoryPaymentStore::new()),
        })
    }
}

/// Running gateway; dropping it does not stop anything, call [`Self::stop`]
#[derive(Debug)]
pub struct GatewayHandle {
    shutdown: CancellationToken,
    local_addr: SocketAddr,
    coordinator: Arc<LeaderCoordinator>,
    dispatch: DispatchService,
    store: Arc<InMemoryPaymentStore>,
    coordinator_task: JoinHandle<()>,
    server_task: JoinHandle<()>,
    pool: WorkerPool,
}

impl GatewayHandle {
    /// Address the web server actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn coordinator(&self) -> &Arc<LeaderCoordinator> {
        &self.coordinator
    }

    pub fn dispatch(&self) -> &DispatchService {
        &self.dispatch
    }

    pub fn store(&self) -> &Arc<InMemoryPaymentStore> {
        &self.store
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Stop the health loop and web server, then wait for every worker to
    /// finish the task it holds
    pub async fn stop(self) -> Result<()> {
        info!("🛑 Stopping payment gateway");
        self.shutdown.cancel();

        if let Err(e) = self.coordinator_task.await {
            error!(error = %e, "Health coordination task ended abnormally");
        }
        self.pool.join().await;
        if let Err(e) = self.server_task.await {
            error!(error = %e, "Web server task ended abnormally");
        }

        info!("✅ Payment gateway stopped");
        Ok(())
    }
}

pub struct GatewayBootstrap;

impl GatewayBootstrap {
    /// Load configuration from file and environment, then start everything
    pub async fn bootstrap() -> Result<GatewayHandle> {
        let manager = ConfigManager::load()?;
        info!(
            environment = %manager.environment(),
            source = ?manager.source_file(),
            "🔧 BOOTSTRAP: Configuration loaded"
        );
        Self::bootstrap_with_config(manager.config().clone()).await
    }

    pub async fn bootstrap_with_config(config: GatewayConfig) -> Result<GatewayHandle> {
        config.validate()?;
        let collaborators = GatewayCollaborators::from_config(&config)?;
        Self::bootstrap_with(config, collaborators).await
    }

    /// Start the gateway around the given collaborators
    pub async fn bootstrap_with(
        config: GatewayConfig,
        collaborators: GatewayCollaborators,
    ) -> Result<GatewayHandle> {
        if config.health.round_timeout_ms >= config.health.rate_limit_window_ms {
            warn!(
                round_timeout_ms = config.health.round_timeout_ms,
                rate_limit_window_ms = config.health.rate_limit_window_ms,
                "Probe round timeout is not shorter than the rate-limit window"
            );
        }

        let GatewayCollaborators {
            default_gateway,
            fallback_gateway,
            peer,
            store,
        } = collaborators;

        let role = ReplicaRole::from(config.replica.role);
        let monitor = Arc::new(HealthMonitor::new(
            Arc::clone(&default_gateway),
            Arc::clone(&fallback_gateway),
            &config.health,
        ));
        let coordinator = Arc::new(LeaderCoordinator::new(
            role,
            monitor,
            peer,
            &config.health,
            &config.replica,
        )?);

        let queue = Arc::new(TaskQueue::new());
        let dispatcher = Arc::new(TaskDispatcher::new(
            Arc::clone(&queue),
            Arc::clone(&coordinator),
            default_gateway,
            fallback_gateway,
            store.clone(),
            &config.workers,
        ));
        let dispatch = DispatchService::new(
            queue,
            Arc::clone(&coordinator),
            Arc::clone(dispatcher.stats()),
        );

        let shutdown = CancellationToken::new();

        let listener = TcpListener::bind(&config.web.bind_address)
            .await
            .map_err(|e| {
                error!(bind_address = %config.web.bind_address, error = %e, "Failed to bind");
                GatewayError::Io(e)
            })?;
        let local_addr = listener.local_addr()?;

        let coordinator_task = tokio::spawn(Arc::clone(&coordinator).run(shutdown.clone()));
        let pool = WorkerPool::start(dispatcher, config.workers.count, shutdown.clone());

        let app = create_app(Arc::new(AppState::new(dispatch.clone(), store.clone())));
        let server_shutdown = shutdown.clone();
        let server_task = tokio::spawn(async move {
            let server = axum::serve(listener, app)
                .with_graceful_shutdown(async move { server_shutdown.cancelled().await });
            if let Err(e) = server.await {
                error!(error = %e, "Web server error");
            }
        });

        info!(
            role = %role,
            workers = config.workers.count,
            address = %local_addr,
            "🎉 BOOTSTRAP: Payment gateway started"
        );

        Ok(GatewayHandle {
            shutdown,
            local_addr,
            coordinator,
            dispatch,
            store,
            coordinator_task,
            server_task,
            pool,
        })
    }
}
