use std::{fs::OpenOptions, net::IpAddr, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use finance_tracker_rs::{
    AppState, ClassifierConfig, HttpClassifier, build_router, graceful_shutdown,
};

/// The REST API server for finance_tracker_rs.
///
/// Bearer tokens are signed with the secret in the `JWT_SECRET` environment variable.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: String,

    /// The address to serve the API from.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// The base URL of the transaction classification service.
    #[arg(long, env = "AI_SERVICE_URL", default_value = "http://localhost:5000")]
    ai_service_url: String,

    /// How long to wait for the classification service, in seconds.
    #[arg(long, default_value_t = 10)]
    ai_timeout_secs: u64,

    /// The secret used to verify bearer tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::new(args.host, args.port);

    let classifier = HttpClassifier::new(ClassifierConfig {
        base_url: args.ai_service_url.clone(),
        timeout: Duration::from_secs(args.ai_timeout_secs),
    })
    .expect("Could not create the classification service client");

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(conn, &args.jwt_secret, Arc::new(classifier))
        .expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    tracing::info!("HTTP server listening on {}", addr);
    tracing::info!("Classification service URL: {}", args.ai_service_url);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but errors are
        // already logged when they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
