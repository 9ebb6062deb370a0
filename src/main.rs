use std::net::SocketAddr;

use hogword_backend::config::Config;
use hogword_backend::logging::init_tracing;
use hogword_backend::{build_state, create_app};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log_level, config.log_dir.as_deref());

    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, "failed to initialise backend");
            std::process::exit(1);
        }
    };

    let app = create_app(state, &config.allowed_origins);

    let addr = config.bind_addr();
    tracing::info!(%addr, "hogword backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
