use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use ascii_reel::cli::{self, Args, Command};
use ascii_reel::config::Config;
use ascii_reel::service::ArchiveService;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config: an explicit `--config` must exist, the default path may not.
fn load_config(args: &Args) -> Config {
    let mut cfg = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) if args.config.is_some() => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config file: {}", e);
            eprintln!("Using default settings.\n");
            Config::default()
        }
    };

    // CLI args > config file > built-in defaults
    if let Some(dir) = &args.dir {
        cfg.storage.dir = dir.clone();
    }
    cfg
}

fn start_service(cfg: &Config) -> ArchiveService {
    match ArchiveService::new(cfg) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    let mut cfg = load_config(&args);

    let result = match args.command {
        Command::Config { action } => {
            cli::handle_config_action(action, &cfg, args.config.as_deref())
        }
        Command::Convert {
            video,
            width,
            name,
            palette,
            invert,
        } => {
            if let Some(palette) = palette {
                cfg.render.palette = ascii_reel::ascii::Palette::from(palette).name().to_string();
            }
            cfg.render.invert |= invert;
            let service = start_service(&cfg);
            let result = cli::run_convert(&service, &video, width, name.as_deref());
            service.shutdown();
            result
        }
        Command::Info { name } => {
            let service = start_service(&cfg);
            cli::run_info(&service, &name)
        }
        Command::Frames { name, start, count } => {
            let service = start_service(&cfg);
            cli::run_frames(&service, &name, start, count)
        }
        Command::Play { name, batch } => {
            if let Err(e) = cli::setup_ctrlc_handler() {
                log::warn!("Failed to install Ctrl+C handler: {}", e);
            }
            let service = start_service(&cfg);
            let result = cli::run_play(&service, &name, batch);
            service.shutdown();
            result
        }
        Command::List => {
            let service = start_service(&cfg);
            cli::run_list(&service)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
