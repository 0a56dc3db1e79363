use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stamp::cli;
use stamp::config;
use stamp::hub::client::HubClient;
use stamp::models::approval_request::{ApprovalRequest, Status};
use stamp::services::approval_requests::ApprovalRequestService;
use stamp::services::groups::GroupService;
use stamp::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "stamp=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Approval { command }) => {
            let approvals = ApprovalRequestService::new(Arc::new(hub_client(&cfg)?));
            handle_approval_command(&approvals, command).await
        }
        Some(cli::Commands::Group { command }) => {
            let groups = GroupService::new(Arc::new(hub_client(&cfg)?));
            handle_group_command(&groups, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn hub_client(cfg: &config::Config) -> anyhow::Result<HubClient> {
    HubClient::new(&cfg.hub_url, Duration::from_secs(cfg.hub_timeout_secs))
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to stamp-hub at {}...", cfg.hub_url);
    let hub = Arc::new(hub_client(&cfg)?);

    let state = Arc::new(AppState {
        approvals: ApprovalRequestService::new(hub.clone()),
        groups: GroupService::new(hub),
        config: cfg,
    });

    let app = axum::Router::new()
        // Health endpoints (no auth)
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .nest("/api/v1", api::api_router(state.clone()))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer({
            use axum::http::Method;
            use tower_http::cors::AllowOrigin;
            let dashboard_origin = std::env::var("STAMP_DASHBOARD_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string());
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str == dashboard_origin
                        || origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::HeaderName::from_static("content-type"),
                    axum::http::HeaderName::from_static("authorization"),
                    axum::http::HeaderName::from_static("x-admin-key"),
                    axum::http::HeaderName::from_static("x-request-id"),
                ])
                .allow_credentials(true)
        })
        // X-Request-Id lets clients correlate errors with server logs.
        // Set runs outermost so the id is on the request before tracing sees it.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("stamp listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_approval_command(
    approvals: &ApprovalRequestService,
    cmd: cli::ApprovalCommands,
) -> anyhow::Result<()> {
    match cmd {
        cli::ApprovalCommands::List {
            user_id,
            limit,
            status,
        } => {
            let wanted = match status.as_deref() {
                Some(s) => Some(
                    Status::parse(s).ok_or_else(|| anyhow::anyhow!("unknown status: {}", s))?,
                ),
                None => None,
            };
            let filter = wanted.map(|s| move |r: &ApprovalRequest| r.status == s);
            let requests = approvals
                .list_by_user(
                    &user_id,
                    None,
                    limit,
                    filter
                        .as_ref()
                        .map(|f| f as &(dyn Fn(&ApprovalRequest) -> bool + Send + Sync)),
                )
                .await?;

            if requests.is_empty() {
                println!("No approval requests found.");
            } else {
                println!(
                    "{:<40} {:<25} {:<20} REQUESTED",
                    "ID", "STATUS", "FLOW"
                );
                for r in requests {
                    println!(
                        "{:<40} {:<25} {:<20} {}",
                        r.request_id,
                        r.status.as_str(),
                        r.approval_flow_id,
                        r.request_date.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
        cli::ApprovalCommands::Approve {
            request_id,
            user_id,
            comment,
        } => {
            let result = approvals.approve(&request_id, &user_id, &comment).await?;
            println!("{}", result.message);
        }
        cli::ApprovalCommands::Reject {
            request_id,
            user_id,
            comment,
        } => {
            let result = approvals.reject(&request_id, &user_id, &comment).await?;
            println!("{}", result.message);
        }
        cli::ApprovalCommands::Revoke {
            request_id,
            user_id,
            comment,
        } => {
            let result = approvals.revoke(&request_id, &user_id, &comment).await?;
            println!("{}", result.message);
        }
    }
    Ok(())
}

async fn handle_group_command(
    groups: &GroupService,
    cmd: cli::GroupCommands,
) -> anyhow::Result<()> {
    match cmd {
        cli::GroupCommands::List { limit } => {
            let all = groups.list_groups(limit).await?;
            if all.is_empty() {
                println!("No groups found.");
            } else {
                println!("{:<38} {:<24} DESCRIPTION", "ID", "NAME");
                for g in all {
                    println!("{:<38} {:<24} {}", g.group_id, g.group_name, g.description);
                }
            }
        }
        cli::GroupCommands::Members { group_id, limit } => {
            let members = groups.list_memberships(&group_id, limit).await?;
            if members.is_empty() {
                println!("No members found.");
            } else {
                println!("{:<38} ROLE", "USER");
                for m in members {
                    println!("{:<38} {:?}", m.user_id, m.role);
                }
            }
        }
    }
    Ok(())
}
