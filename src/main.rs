use jsonrpc_mock_server::{
    build_app,
    config::Config,
    domain::default_dispatcher,
    logging::{self, DEFAULT_LOG_FILTER},
    AppState, RPC_PATH,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging(DEFAULT_LOG_FILTER);

    let config = Config::from_env()?;
    let dispatcher = default_dispatcher()?;
    let methods = dispatcher.methods().join(",");
    let bind_socket = config.bind_socket()?;
    let state = AppState::new(dispatcher, config.request_timeout);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(bind_socket)
        .await
        .inspect_err(|err| error!(%bind_socket, error = %err, "failed to bind listener"))?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        path = RPC_PATH,
        methods = %methods,
        request_timeout_secs = config.request_timeout.map(|limit| limit.as_secs()),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
