use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use env_logger::{Builder, Target};
use fieldnotes_scanner::{
    ApiClient, CameraRuntime, ChannelNavigator, DetailView, FacingMode,
    Flashlight, MachineDetails, PermissionGate, QrDecoder,
    ReplayCameraRuntime, Route, ScanController, ScanSession, ScannerSettings,
    SubmitOutcome,
};
use log::{LevelFilter, info, warn};

/// Scan a machine label from replayed camera frames and optionally log a
/// service against it.
#[derive(Debug, Parser)]
#[command(name = "fieldnotes-scan", version)]
struct Args {
    /// Base URL of the Fieldnotes API server
    #[arg(long, env = "FIELDNOTES_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Bearer session token (see `fieldnotes-server sessions issue`)
    #[arg(long, env = "FIELDNOTES_TOKEN")]
    token: Option<String>,

    /// Directory of still images replayed as camera frames
    #[arg(long)]
    frames: PathBuf,

    /// Report a torch on the replayed camera
    #[arg(long)]
    torch: bool,

    /// Switch the torch on once sampling starts
    #[arg(long)]
    flashlight: bool,

    /// Decode tick cadence in milliseconds
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// Spare part search; the first match is attached to the service
    #[arg(long)]
    part: Option<String>,

    /// Service notes; submits a service when given together with --part
    #[arg(long, requires = "part")]
    notes: Option<String>,
}

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("fieldnotes_scanner", LevelFilter::Info)
        .filter_module("fieldnotes_scan", LevelFilter::Info)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let args = Args::parse();

    let api = Arc::new(ApiClient::new(&args.server)?);
    api.set_token(args.token.clone()).await;

    let runtime = Arc::new(
        ReplayCameraRuntime::from_dir(&args.frames)
            .with_context(|| format!("loading frames from {}", args.frames.display()))?
            .with_torch(args.torch),
    );

    let mut session = ScanSession::new();
    let gate = PermissionGate::new(runtime.clone());
    gate.check_existing(&mut session).await;
    if session.needs_permission_request() {
        gate.request_access(&mut session).await?;
    }
    info!(
        "camera ready (torch {})",
        if session.flashlight_supported { "available" } else { "unavailable" }
    );

    let settings = ScannerSettings {
        tick_interval: Duration::from_millis(args.interval_ms),
        ..ScannerSettings::default()
    };
    let (navigator, mut routes) = ChannelNavigator::new();
    let navigator = Arc::new(navigator);

    let mut controller = ScanController::new(
        settings,
        Arc::new(QrDecoder::new()),
        navigator.clone(),
        api.clone(),
    );
    controller.arm()?;
    let stream = runtime.open_stream(FacingMode::Environment).await?;
    controller.attach(stream.clone())?;

    if args.flashlight {
        Flashlight::new(stream).toggle(&mut session).await;
    }

    let identifier = tokio::select! {
        route = routes.recv() => match route {
            Some(Route::Machine { id }) => id,
            Some(other) => bail!("unexpected navigation to {other}"),
            None => bail!("navigation channel closed"),
        },
        _ = tokio::signal::ctrl_c() => {
            let report = controller.cancel().await;
            println!(
                "Scan cancelled: {} camera track(s) stopped, session {}",
                report.tracks_stopped,
                if report.session_ended { "ended" } else { "left open" },
            );
            return Ok(());
        }
    };

    session.observe(&controller.state());
    let released = controller.teardown().await;
    info!("decoded {identifier:?}; released {released} track(s)");

    let mut details = MachineDetails::new(
        identifier,
        api.clone(),
        api.clone(),
        api.clone(),
        navigator,
        &settings,
    );

    match details.load().await {
        DetailView::Found(summary) => {
            println!("{} [{}]", summary.brand, summary.category);
            println!("  ID:           {}", summary.machine_code);
            println!("  Model:        {}", summary.model);
            println!("  Arrived:      {}", summary.arrived);
            println!("  Location:     {}", summary.location);
            println!("  Last updated: {}", summary.last_updated);
        }
        DetailView::NotFound { identifier } => {
            println!("Machine {identifier} not found");
            return Ok(());
        }
        DetailView::Failed { message } => bail!("machine lookup failed: {message}"),
        DetailView::Loading => return Ok(()),
    }

    let Some(query) = args.part.as_deref() else {
        return Ok(());
    };
    let Some(option) = details.search_parts(query).await.first().cloned() else {
        println!("No spare parts found");
        return Ok(());
    };
    println!("Spare part: {} ({}, {})", option.code, option.detail, option.stock);
    details.select_part(option.id);

    let Some(notes) = args.notes else {
        return Ok(());
    };
    details.confirm();
    details.set_notes(notes);

    let outcome = details.submit().await;
    for notification in details.notifications() {
        println!("{}: {}", notification.title, notification.description);
    }
    match outcome {
        SubmitOutcome::Created(record) => {
            if let Ok(route) = routes.try_recv() {
                info!("returning to {route}");
            }
            println!("Service {} logged", record.id);
            Ok(())
        }
        SubmitOutcome::Invalid => {
            let reason = details
                .form()
                .and_then(|form| form.error.clone())
                .unwrap_or_default();
            bail!("service form rejected: {reason}")
        }
        SubmitOutcome::Failed => bail!("service submission failed"),
        SubmitOutcome::NoForm => {
            warn!("no service form was opened");
            Ok(())
        }
    }
}
