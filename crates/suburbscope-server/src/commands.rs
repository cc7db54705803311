use std::net::SocketAddr;
use std::process::ExitCode;

use suburbscope_core::{PropertyType, ResolveOptions, ResourceKind, Settings, SuburbId};
use tracing::{info, warn};

use crate::cli::{ResolveArgs, ServeArgs};
use suburbscope_server::{router, AppState, ServerError};

pub async fn serve(mut settings: Settings, args: ServeArgs) -> Result<ExitCode, ServerError> {
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    let raw_addr = format!("{}:{}", settings.host, settings.port);
    let addr: SocketAddr = raw_addr
        .parse()
        .map_err(|_| ServerError::Address(raw_addr.clone()))?;

    let state = AppState::from_settings(&settings)?;
    let app = router(state, &settings.cors_origins);

    info!(%addr, mock_data = settings.use_mock_data, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(ExitCode::SUCCESS)
}

pub async fn resolve(settings: Settings, args: ResolveArgs) -> Result<ExitCode, ServerError> {
    let suburb = SuburbId::parse(&args.suburb_id)?;
    let kind = args.kind.parse::<ResourceKind>()?;
    let property_type = args
        .property_type
        .as_deref()
        .map(str::parse::<PropertyType>)
        .transpose()?;
    let options = ResolveOptions::default()
        .with_geojson(!args.no_geojson)
        .with_property_type(property_type)
        .with_metric(args.metric);

    let state = AppState::from_settings(&settings)?;
    let resolution = match state.resolver().resolve_with(&suburb, kind, &options).await {
        Ok(resolution) => resolution,
        Err(error) if error.is_not_found() => {
            eprintln!("error: {error}");
            return Ok(ExitCode::from(3));
        }
        Err(error) => return Err(error.into()),
    };

    info!(
        origin = resolution.origin.as_str(),
        latency_ms = resolution.latency_ms,
        recovered = resolution.recovered.len(),
        "resolved"
    );

    let body = resolution.body.to_value()?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{rendered}");
    Ok(ExitCode::SUCCESS)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(error = %error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
