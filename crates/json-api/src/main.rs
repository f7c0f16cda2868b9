//! Bazaar JSON API Server

use std::process::ExitCode;

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use bazaar_app::{
    auth::{IdentityClient, IdentityConfig},
    context::AppContext,
};

use crate::{config::ServerConfig, state::State};

mod auth;
mod cart;
mod checkout;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod orders;
mod retry_hint;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Bazaar JSON API Server entry point
#[tokio::main]
pub async fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(source) => {
            // Lets clap render help and version output with its own exit code
            if let Err(print_error) = source.print() {
                #[expect(
                    clippy::print_stderr,
                    reason = "logging not initialized yet, must use eprintln for config errors"
                )]
                {
                    eprintln!("Configuration error: {print_error}");
                }
            }

            return if source.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(source) = observability::init(&config) {
        #[expect(
            clippy::print_stderr,
            reason = "subscriber failed to install, nothing else can report this"
        )]
        {
            eprintln!("{source}");
        }

        return ExitCode::FAILURE;
    }

    let identity = IdentityClient::new(IdentityConfig {
        addr: config.identity.addr.clone(),
        api_key: config.identity.api_key.clone(),
    });

    let app = match AppContext::from_database_url(
        &config.database.database_url,
        identity,
        config.checkout.retry_policy(),
    )
    .await
    {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            return ExitCode::FAILURE;
        }
    };

    let addr = config.socket_addr();

    info!(
        %addr,
        max_attempts = config.checkout.max_attempts,
        "starting server"
    );

    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(retry_hint::handler)
        .hoop(remove_slash())
        .hoop(inject(State::from_app_context(app)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(router::app_router());

    let doc = OpenApi::new("Bazaar API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;

    info!("server stopped");

    ExitCode::SUCCESS
}
