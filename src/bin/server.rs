use std::{fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sales_insights::{
    AnalyticsConfig, ListingDecemberWrap, LocalTimezone, PaginationConfig, build_router,
    graceful_shutdown, stores::sqlite::create_app_state,
};

/// The REST API server for sales_insights.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// The canonical name of the timezone month windows are built in, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// How long a single database query may run, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    query_timeout_ms: u64,

    /// Where the transactions listing ends its window for December.
    #[arg(long, value_enum, default_value_t = ListingDecemberWrap::SameYear)]
    listing_december_wrap: ListingDecemberWrap,

    /// The number of transactions per page when the client does not ask for one.
    #[arg(long, default_value_t = 10)]
    page_size: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if LocalTimezone::from_name(&args.timezone).is_none() {
        tracing::error!("Invalid timezone {}", args.timezone);
        exit(1);
    }

    if args.page_size == 0 {
        tracing::error!("The page size must be at least 1");
        exit(1);
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let config = AnalyticsConfig {
        local_timezone: args.timezone,
        query_timeout: Duration::from_millis(args.query_timeout_ms),
        listing_december_wrap: args.listing_december_wrap,
        pagination: PaginationConfig {
            default_page_size: args.page_size,
            ..Default::default()
        },
    };

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    let app_state = create_app_state(conn, config).expect("Could not initialize the database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly.");
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
        // Errors are logged where they occur, so `TraceLayer` does not need to
        // log 5xx responses too.
        .on_failure(());

    router.layer(tracing_layer)
}
