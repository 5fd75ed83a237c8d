//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::TableRegistry;
use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::RelationsConfig;
use crate::core::module::Module;
use crate::core::query::PaginationConfig;
use crate::core::service::RecordStore;
use anyhow::Result;
use axum::Router;
use axum::extract::Request;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Default name reported by the health endpoints
pub const DEFAULT_SERVICE_NAME: &str = "restaurant-ops";

/// Builder for creating HTTP servers with auto-registered routes
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryStore::new(RestaurantModule.schema()))
///     .register_module(RestaurantModule)?
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn RecordStore>>,
    table_registry: TableRegistry,
    configs: Vec<RelationsConfig>,
    custom_routes: Vec<Router>,
    pagination: PaginationConfig,
    cors: bool,
    service_name: String,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            table_registry: TableRegistry::new(),
            configs: Vec::new(),
            custom_routes: Vec::new(),
            pagination: PaginationConfig::default(),
            cors: false,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    /// Set the record store (required)
    pub fn with_store(mut self, store: impl RecordStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared record store
    pub fn with_shared_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Allow cross-origin requests from any origin
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors = enabled;
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints outside the CRUD pattern, such as reports
    /// or admin hooks.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register a module
    ///
    /// This will:
    /// 1. Load the module's relations
    /// 2. Register all tables from the module
    pub fn register_module(mut self, module: impl Module) -> Result<Self> {
        let config = module.relations_config()?;
        self.configs.push(config);

        module.register_tables(&mut self.table_registry);

        tracing::debug!(
            module = module.name(),
            version = module.version(),
            "registered module"
        );

        Ok(self)
    }

    /// Build the host holding every piece of application state
    pub fn build_host(mut self) -> Result<ServerHost> {
        let merged_config = self.merge_configs();

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("RecordStore is required. Call .with_store()"))?;

        ServerHost::from_builder_components(
            store,
            merged_config,
            self.table_registry,
            self.pagination,
            self.service_name,
        )
    }

    /// Build the final REST router
    ///
    /// This generates:
    /// - CRUD routes for all registered tables
    /// - Relation routes (both directions)
    /// - Introspection and health routes
    ///
    /// Every request is traced inside a span carrying a fresh request id.
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let cors = self.cors;
        let host = Arc::new(self.build_host()?);

        let router = RestExposure::build_router(host, custom_routes)?.layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "request",
                    %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        );

        if cors {
            Ok(router.layer(CorsLayer::permissive()))
        } else {
            Ok(router)
        }
    }

    /// Merge all configurations from registered modules
    fn merge_configs(&self) -> RelationsConfig {
        RelationsConfig::merge(self.configs.clone())
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RelationDefinition, RelationVia};
    use crate::core::schema::{ForeignKey, OnDelete, Schema, TableSchema};
    use crate::storage::InMemoryStore;
    use axum_test::TestServer;

    const SHEDS: TableSchema = TableSchema {
        name: "sheds",
        singular: "shed",
        fields: &["name"],
        date_field: None,
        foreign_keys: &[],
        unique_keys: &[],
    };

    const TOOLS: TableSchema = TableSchema {
        name: "tools",
        singular: "tool",
        fields: &["name", "shed_id"],
        date_field: None,
        foreign_keys: &[ForeignKey {
            field: "shed_id",
            table: "sheds",
            on_delete: OnDelete::Restrict,
        }],
        unique_keys: &[],
    };

    /// A minimal Module implementation for builder tests
    struct StubModule {
        relations: RelationsConfig,
    }

    impl StubModule {
        fn plain() -> Self {
            Self {
                relations: RelationsConfig::default(),
            }
        }

        fn with_relation() -> Self {
            Self {
                relations: RelationsConfig {
                    relations: vec![RelationDefinition {
                        name: "shed_tools".to_string(),
                        source: "sheds".to_string(),
                        target: "tools".to_string(),
                        forward_route_name: "tools".to_string(),
                        reverse_route_name: "shed".to_string(),
                        description: None,
                        via: RelationVia::ForeignKey {
                            field: "shed_id".to_string(),
                        },
                    }],
                },
            }
        }
    }

    impl Module for StubModule {
        fn name(&self) -> &str {
            "stub"
        }

        fn tables(&self) -> Vec<TableSchema> {
            vec![SHEDS, TOOLS]
        }

        fn relations_config(&self) -> Result<RelationsConfig> {
            Ok(self.relations.clone())
        }

        fn register_tables(&self, _registry: &mut TableRegistry) {}
    }

    /// A module whose relations_config() returns an error
    struct FailingModule;

    impl Module for FailingModule {
        fn name(&self) -> &str {
            "failing"
        }

        fn tables(&self) -> Vec<TableSchema> {
            vec![]
        }

        fn relations_config(&self) -> Result<RelationsConfig> {
            Err(anyhow::anyhow!("config load failed"))
        }

        fn register_tables(&self, _registry: &mut TableRegistry) {}
    }

    fn stub_store() -> InMemoryStore {
        InMemoryStore::new(StubModule::plain().schema())
    }

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.store.is_none());
        assert!(builder.configs.is_empty());
        assert!(builder.table_registry.table_names().is_empty());
        assert!(builder.custom_routes.is_empty());
        assert!(!builder.cors);
        assert_eq!(builder.service_name, DEFAULT_SERVICE_NAME);
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new()
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    #[test]
    fn test_register_module_collects_relations() {
        let builder = ServerBuilder::new()
            .register_module(StubModule::with_relation())
            .expect("register should succeed")
            .register_module(StubModule::plain())
            .expect("register should succeed");
        assert_eq!(builder.configs.len(), 2);
        assert!(builder.table_registry.table_names().is_empty());
    }

    #[test]
    fn test_register_module_failing_config_returns_error() {
        let result = ServerBuilder::new().register_module(FailingModule);
        let err_msg = format!("{}", result.err().expect("should be Err"));
        assert!(err_msg.contains("config load failed"));
    }

    #[test]
    fn test_build_host_without_store_fails() {
        let result = ServerBuilder::new()
            .register_module(StubModule::plain())
            .expect("register should succeed")
            .build_host();
        let err_msg = format!("{}", result.err().expect("should be Err"));
        assert!(err_msg.contains("RecordStore is required"));
    }

    #[test]
    fn test_build_host_resolves_relation_routes() {
        let host = ServerBuilder::new()
            .with_store(stub_store())
            .register_module(StubModule::with_relation())
            .expect("register should succeed")
            .build_host()
            .expect("build_host should succeed");

        assert!(host.registry.resolve_route("sheds", "tools").is_ok());
        assert!(host.registry.resolve_route("tools", "shed").is_ok());
    }

    #[test]
    fn test_build_host_rejects_relation_on_missing_table() {
        let store = InMemoryStore::new(Schema::new().with_table(SHEDS));
        let result = ServerBuilder::new()
            .with_store(store)
            .register_module(StubModule::with_relation())
            .expect("register should succeed")
            .build_host();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_build_serves_health_routes() {
        let app = ServerBuilder::new()
            .with_store(stub_store())
            .with_service_name("stub-service")
            .with_cors(true)
            .build()
            .expect("build should succeed");

        let server = TestServer::try_new(app).expect("test server");
        for path in ["/health", "/healthz"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            let body: serde_json::Value = response.json();
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "stub-service");
        }
    }
}
