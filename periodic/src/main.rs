// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::{self, System};
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use periodic::app_state::AppState;
use periodic::bootstrap;
use periodic::config::ValidatedConfig;
use periodic::iam::BasicAuthMiddleware;
use periodic::public;
use periodic::runtime_paths::RuntimePaths;
use periodic::util;

const HELP_TEXT: &str = "\
Usage: periodic [-C <root>] [-h|--help]

  -C <root>    Runtime directory holding config.yaml, template.html and public/ (default: .)
  -h, --help   Show this help
";

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if parsed_args.help {
        print!("{}", HELP_TEXT);
        return 0;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    if let Err(error) = util::init_logger(bootstrap.validated_config.log_level_filter()) {
        eprintln!("❌ Failed to initialize logger: {}", error);
        return 1;
    }

    let result = System::new().block_on(async move {
        serve(bootstrap.validated_config, bootstrap.runtime_paths).await
    });

    match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server error: {}", error);
            1
        }
    }
}

async fn serve(
    validated_config: ValidatedConfig,
    runtime_paths: RuntimePaths,
) -> std::io::Result<()> {
    log_startup_info(&validated_config, &runtime_paths);

    let app_state = web::Data::new(AppState::from_runtime(&runtime_paths, &validated_config));
    let auth = Arc::new(validated_config.auth.clone());
    let host = validated_config.server.host.clone();
    let port = validated_config.server.port;
    let workers = validated_config.server.workers;
    let config_data = web::Data::new(validated_config);

    let factory_state = app_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(factory_state.clone())
            .wrap(BasicAuthMiddleware::new(auth.clone()))
            .wrap(Logger::default())
            .configure(public::configure)
    })
    .workers(workers)
    .bind((host.as_str(), port))?
    .disable_signals()
    .run();

    // Writes run on the worker runtimes, so they are settled before the workers stop.
    let handle = server.handle();
    let shutdown_state = app_state.clone();
    rt::spawn(async move {
        if let Err(error) = shutdown_signal().await {
            warn!("Failed to listen for shutdown signal: {}", error);
            return;
        }
        info!("Shutdown requested");
        handle.pause().await;
        settle_pending(&shutdown_state).await;
        handle.stop(true).await;
    });

    let result = server.await;
    settle_pending(&app_state).await;
    info!("Shutdown complete");
    result
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use rt::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = rt::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    rt::signal::ctrl_c().await
}

async fn settle_pending(app_state: &AppState) {
    let pending = app_state.elements.pending().len();
    if pending > 0 {
        info!("Waiting for {} pending writes", pending);
    }
    app_state.elements.settle().await;
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {}", config.app.name);
    info!("Workers: {}", config.server.workers);
    info!(
        "Listening on http://{}:{}",
        config.server.host, config.server.port
    );
    info!("Runtime root: {}", runtime_paths.root.display());
    info!("Config file: {}", runtime_paths.config_file.display());
    info!("Public directory: {}", runtime_paths.public_dir.display());
    info!("Template: {}", runtime_paths.template_file.display());

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

struct ParsedArgs {
    runtime_root: PathBuf,
    help: bool,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            help: true,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            return Err(format!("Unexpected argument: {}", arg));
        }
    }

    Ok(ParsedArgs {
        runtime_root: make_runtime_root_absolute(runtime_root)?,
        help: false,
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
