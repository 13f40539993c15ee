//! Host protocol and the provider service trait.
//!
//! A host drives the provider through [`ProviderService`]. The binary speaks
//! to its host over stdio: it prints the handshake
//! `HW_PROVIDER|<version>|stdio`, then answers one JSON [`Request`] per line
//! with one JSON [`Response`] per line.
//!
//! # Shutdown
//!
//! The loop ends when the host closes stdin, sends a `stop` request, or the
//! process receives SIGTERM/SIGINT (CTRL+C on Windows). Unless the host
//! already sent `stop`, the provider's `stop()` is then called, bounded by
//! [`ServeOptions::shutdown_timeout`].

use std::future::Future;
use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{
    ImportedResource, PlanResult, ProviderMetadata, HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};

/// The lifecycle surface a host calls.
///
/// # Example
///
/// ```
/// use hw_provider::testing::ProviderTester;
/// use hw_provider::HwProvider;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let tester = ProviderTester::new(HwProvider::new());
/// tester.configure(json!({"upcharge": 1})).await.unwrap();
///
/// let state = tester
///     .lifecycle_create("hw_bread", json!({"kind": "rye"}))
///     .await
///     .unwrap();
/// assert_eq!(state["id"], "bread-rye-3");
/// # });
/// ```
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        ProviderMetadata {
            resources: schema.resources.keys().cloned().collect(),
            data_sources: schema.data_sources.keys().cloned().collect(),
            capabilities: Default::default(),
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider. Returns diagnostics (errors and warnings).
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Upgrade resource state from an older schema version.
    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let _ = (resource_type, version);
        Ok(state)
    }

    /// Plan changes for a resource. A null `proposed_state` plans a delete.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Read the current state of a resource.
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Import an existing resource by id.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "import of {} (id '{}')",
            resource_type, id
        )))
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Read a data source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let _ = config;
        Err(ProviderError::UnknownResource(format!(
            "data source {}",
            data_source_type
        )))
    }
}

/// One host request, tagged by `method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    /// Resource and data source names.
    GetMetadata,
    /// Full provider schema.
    GetSchema,
    /// Check a provider block without applying it.
    ValidateProviderConfig {
        /// The provider block.
        #[serde(default)]
        config: Value,
    },
    /// Apply a provider block.
    Configure {
        /// The provider block.
        #[serde(default)]
        config: Value,
    },
    /// Stop serving.
    Stop,
    /// Check a resource block.
    ValidateResourceConfig {
        /// Resource type name.
        type_name: String,
        /// The resource block.
        #[serde(default)]
        config: Value,
    },
    /// Bring stored state up to the current schema version.
    UpgradeResourceState {
        /// Resource type name.
        type_name: String,
        /// Schema version the state was written with.
        #[serde(default)]
        version: i64,
        /// Stored state.
        state: Value,
    },
    /// Plan a create, update or delete.
    Plan {
        /// Resource type name.
        type_name: String,
        /// State before the change; absent when creating.
        #[serde(default)]
        prior_state: Option<Value>,
        /// Desired state; null when deleting.
        #[serde(default)]
        proposed_state: Value,
        /// The resource block as written.
        #[serde(default)]
        config: Value,
    },
    /// Create a resource from its planned state.
    Create {
        /// Resource type name.
        type_name: String,
        /// Planned state.
        planned_state: Value,
    },
    /// Refresh a resource.
    Read {
        /// Resource type name.
        type_name: String,
        /// Stored state.
        current_state: Value,
    },
    /// Update a resource in place.
    Update {
        /// Resource type name.
        type_name: String,
        /// Stored state.
        prior_state: Value,
        /// Planned state.
        planned_state: Value,
    },
    /// Delete a resource.
    Delete {
        /// Resource type name.
        type_name: String,
        /// Stored state.
        current_state: Value,
    },
    /// Import a resource by id.
    ImportResourceState {
        /// Resource type name.
        type_name: String,
        /// Id to import.
        id: String,
    },
    /// Check a data source block.
    ValidateDataSourceConfig {
        /// Data source type name.
        type_name: String,
        /// The data source block.
        #[serde(default)]
        config: Value,
    },
    /// Read a data source.
    ReadDataSource {
        /// Data source type name.
        type_name: String,
        /// The data source block.
        #[serde(default)]
        config: Value,
    },
}

impl Request {
    /// The `method` tag of this request.
    pub fn method(&self) -> &'static str {
        match self {
            Request::GetMetadata => "get_metadata",
            Request::GetSchema => "get_schema",
            Request::ValidateProviderConfig { .. } => "validate_provider_config",
            Request::Configure { .. } => "configure",
            Request::Stop => "stop",
            Request::ValidateResourceConfig { .. } => "validate_resource_config",
            Request::UpgradeResourceState { .. } => "upgrade_resource_state",
            Request::Plan { .. } => "plan",
            Request::Create { .. } => "create",
            Request::Read { .. } => "read",
            Request::Update { .. } => "update",
            Request::Delete { .. } => "delete",
            Request::ImportResourceState { .. } => "import_resource_state",
            Request::ValidateDataSourceConfig { .. } => "validate_data_source_config",
            Request::ReadDataSource { .. } => "read_data_source",
        }
    }
}

/// Answer to one [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Operation result, null when the operation returns nothing or failed.
    pub result: Value,
    /// Errors and warnings.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Response {
    fn from_result<T: Serialize>(result: Result<T, ProviderError>) -> Self {
        match result.and_then(|value| Ok(serde_json::to_value(value)?)) {
            Ok(result) => Self {
                result,
                diagnostics: Vec::new(),
            },
            Err(e) => Self::error(e),
        }
    }

    fn from_diagnostics(result: Result<Vec<Diagnostic>, ProviderError>) -> Self {
        match result {
            Ok(diagnostics) => Self {
                result: Value::Null,
                diagnostics,
            },
            Err(e) => Self::error(e),
        }
    }

    fn error(err: ProviderError) -> Self {
        Self {
            result: Value::Null,
            diagnostics: vec![err.into_diagnostic()],
        }
    }

    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Route one request to the provider.
#[instrument(skip_all, fields(method = request.method()))]
pub async fn handle_request<P: ProviderService>(provider: &P, request: Request) -> Response {
    let response = match request {
        Request::GetMetadata => Response::from_result(Ok(provider.metadata())),
        Request::GetSchema => Response::from_result(Ok(provider.schema())),
        Request::ValidateProviderConfig { config } => {
            Response::from_diagnostics(provider.validate_provider_config(config).await)
        },
        Request::Configure { config } => {
            Response::from_diagnostics(provider.configure(config).await)
        },
        Request::Stop => Response::from_result(provider.stop().await),
        Request::ValidateResourceConfig { type_name, config } => Response::from_diagnostics(
            provider.validate_resource_config(&type_name, config).await,
        ),
        Request::UpgradeResourceState {
            type_name,
            version,
            state,
        } => Response::from_result(
            provider
                .upgrade_resource_state(&type_name, version, state)
                .await,
        ),
        Request::Plan {
            type_name,
            prior_state,
            proposed_state,
            config,
        } => Response::from_result(
            provider
                .plan(&type_name, prior_state, proposed_state, config)
                .await,
        ),
        Request::Create {
            type_name,
            planned_state,
        } => Response::from_result(provider.create(&type_name, planned_state).await),
        Request::Read {
            type_name,
            current_state,
        } => Response::from_result(provider.read(&type_name, current_state).await),
        Request::Update {
            type_name,
            prior_state,
            planned_state,
        } => Response::from_result(
            provider
                .update(&type_name, prior_state, planned_state)
                .await,
        ),
        Request::Delete {
            type_name,
            current_state,
        } => Response::from_result(provider.delete(&type_name, current_state).await),
        Request::ImportResourceState { type_name, id } => {
            Response::from_result(provider.import_resource(&type_name, &id).await)
        },
        Request::ValidateDataSourceConfig { type_name, config } => Response::from_diagnostics(
            provider
                .validate_data_source_config(&type_name, config)
                .await,
        ),
        Request::ReadDataSource { type_name, config } => {
            Response::from_result(provider.read_data_source(&type_name, config).await)
        },
    };

    if response.has_errors() {
        warn!(diagnostics = response.diagnostics.len(), "Request completed with errors");
    } else {
        debug!("Request completed");
    }
    response
}

/// Options for serving the provider.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// How long the provider's `stop()` may take once the loop ends.
    /// Default: 30 seconds.
    pub shutdown_timeout: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServeOptions {
    /// Create new serve options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT, CTRL+C on Windows).
///
/// If the handlers cannot be installed this never resolves, and the loop
/// ends on EOF or `stop` instead.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                    _ = sigint.recv() => info!("Received SIGINT, shutting down"),
                }
            },
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to install signal handlers");
                std::future::pending::<()>().await;
            },
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received CTRL+C, shutting down");
    }
}

/// Serve a provider over stdin/stdout until the host is done with it.
///
/// For custom configuration, use [`serve_with_options`].
pub async fn serve<P: ProviderService>(provider: P) -> Result<(), ProviderError> {
    serve_with_options(provider, ServeOptions::default()).await
}

/// Serve a provider over stdin/stdout with custom options.
pub async fn serve_with_options<P: ProviderService>(
    provider: P,
    options: ServeOptions,
) -> Result<(), ProviderError> {
    serve_io(
        provider,
        tokio::io::stdin(),
        tokio::io::stdout(),
        options,
        wait_for_shutdown_signal(),
    )
    .await
}

/// Serve a provider over any byte stream pair.
///
/// Writes the handshake, then answers requests until `reader` hits EOF, a
/// `stop` request arrives or `shutdown` resolves. Malformed lines, including
/// ones that are not UTF-8, are answered with an error diagnostic and the loop continues.
pub async fn serve_io<P, R, W, S>(
    provider: P,
    reader: R,
    mut writer: W,
    options: ServeOptions,
    shutdown: S,
) -> Result<(), ProviderError>
where
    P: ProviderService,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let handshake = format!("{}|{}|stdio\n", HANDSHAKE_PREFIX, PROTOCOL_VERSION);
    writer.write_all(handshake.as_bytes()).await?;
    writer.flush().await?;
    info!(protocol = PROTOCOL_VERSION, "Provider serving on stdio");

    let mut lines = LinesStream::new(BufReader::new(reader).lines());
    tokio::pin!(shutdown);

    let mut stopped = false;
    loop {
        let line = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            line = lines.next() => line,
        };
        let decoded = match line {
            Some(Ok(line)) if line.trim().is_empty() => continue,
            Some(Ok(line)) => serde_json::from_str::<Request>(&line).map_err(|e| e.to_string()),
            // The reader has already skipped past the offending line.
            Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData => Err(e.to_string()),
            Some(Err(e)) => return Err(e.into()),
            None => {
                debug!("Host closed the request stream");
                break;
            },
        };

        let response = match decoded {
            Ok(request) => {
                stopped = matches!(request, Request::Stop);
                handle_request(&provider, request).await
            },
            Err(e) => {
                warn!(error = %e, "Malformed request");
                Response::error(ProviderError::InvalidRequest(e))
            },
        };

        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;

        if stopped {
            break;
        }
    }

    if !stopped {
        debug!("Calling provider stop()");
        match tokio::time::timeout(options.shutdown_timeout, provider.stop()).await {
            Ok(Ok(())) => {},
            Ok(Err(e)) => warn!(error = %e, "Provider stop() returned error"),
            Err(_) => error!(
                timeout = ?options.shutdown_timeout,
                "Provider stop() exceeded the shutdown timeout"
            ),
        }
    }

    info!("Provider shutdown complete");
    Ok(())
}
