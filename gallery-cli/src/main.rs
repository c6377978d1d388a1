// SPDX-License-Identifier: MIT
//
// Gallery Gate: Question-Gated Access for Image Collections
//
// https://github.com/yourusername/gallery-gate

//! Gallery console presenter
//!
//! Interactive front end over `gallery-core`: lists collection tiles, relays
//! gate events as console messages, reads challenge answers from stdin, and
//! drives the slide-show viewer once access is granted.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   request/submit   ┌──────────────┐   get/set    ┌──────────────┐
//! │   Console    │ ──────────────────>│  AccessGate  │ ────────────>│  FileStore   │
//! │  Presenter   │<────────────────── │   (core)     │              │ (state.json) │
//! └──────────────┘    GateEvent       └──────────────┘              └──────────────┘
//! ```
//!
//! The presenter owns no decision logic; every outcome it prints is a typed
//! event emitted by the gate.

use anyhow::{Context, Result};
use clap::Parser;
use gallery_core::{
    viewer::{self, SlideShow},
    AccessGate, Collection, CollectionStatus, FileStore, GateEvent, Registry,
};
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gallery-cli")]
#[command(about = "Gallery Gate - question-gated access to image collections", long_about = None)]
struct Args {
    /// Path to the gallery registry document (JSON or YAML)
    #[arg(short, long, default_value = "data/gallery-config.json")]
    registry: PathBuf,

    /// Path to the durable access-state file
    #[arg(short, long, default_value = "data/gallery-state.json")]
    store: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

/// Environment overrides for the path arguments, prefix `GALLERY_`
#[derive(Debug, Deserialize)]
struct EnvOverrides {
    registry: Option<PathBuf>,
    store: Option<PathBuf>,
}

fn main() -> Result<()> {
    let mut args = Args::parse();

    let log_level = args
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::WARN);

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let overrides: EnvOverrides = envy::prefixed("GALLERY_")
        .from_env()
        .context("Failed to parse GALLERY_* environment variables")?;
    if let Some(registry) = overrides.registry {
        args.registry = registry;
    }
    if let Some(store) = overrides.store {
        args.store = store;
    }

    info!("Gallery Gate v{}", gallery_core::VERSION);
    info!("Registry document: {:?}", args.registry);
    info!("State file: {:?}", args.store);

    let registry = Arc::new(
        Registry::from_file(&args.registry)
            .with_context(|| format!("Failed to load registry from {:?}", args.registry))?,
    );
    if registry.is_empty() {
        println!("No valid collections in {:?}.", args.registry);
        return Ok(());
    }

    let store = FileStore::open(&args.store);
    let mut gate = AccessGate::new(Arc::clone(&registry), store);

    print_collections(&gate, &registry);
    print_help();

    let stdin = io::stdin();
    loop {
        prompt("> ");
        let line = match read_line(&stdin) {
            Some(line) => line,
            None => break,
        };
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("open", id) if !id.trim().is_empty() => {
                open_collection(&mut gate, &registry, &stdin, id.trim())
            }
            ("reset", id) if !id.trim().is_empty() => match gate.reset_collection(id.trim()) {
                Ok(()) => println!("Cleared access state for '{}'.", id.trim()),
                Err(e) => println!("{}", e),
            },
            ("list", _) => print_collections(&gate, &registry),
            ("metrics", _) => match serde_json::to_string_pretty(&gate.metrics().snapshot()) {
                Ok(s) => println!("{}", s),
                Err(e) => println!("{}", e),
            },
            ("help", _) => print_help(),
            ("quit", _) | ("exit", _) => break,
            ("", _) => {}
            (other, _) => println!("Unknown command '{}'. Type 'help'.", other),
        }
    }

    Ok(())
}

/// Run one access request, relaying gate events until a terminal outcome
fn open_collection(
    gate: &mut AccessGate,
    registry: &Registry,
    stdin: &io::Stdin,
    id: &str,
) {
    let event = match gate.request_access(id) {
        Ok(event) => event,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    println!("{}", event);
    let granted = match event {
        GateEvent::AccessGranted { .. } => true,
        GateEvent::ChallengeReady { .. } => challenge_loop(gate, stdin),
        _ => false,
    };

    if granted {
        if let Some(collection) = registry.get(id) {
            browse(collection, stdin);
        }
    }
}

/// Read answers until the gate reaches a terminal event or the dialog is
/// dismissed with `:q` (the abandon path: progress lost, counter kept)
fn challenge_loop(gate: &mut AccessGate, stdin: &io::Stdin) -> bool {
    loop {
        prompt("answer> ");
        let line = match read_line(stdin) {
            Some(line) => line,
            None => {
                gate.abandon();
                println!("Challenge dismissed.");
                return false;
            }
        };

        if line.trim() == ":q" {
            gate.abandon();
            println!("Challenge dismissed.");
            return false;
        }

        let event = match gate.submit_answer(&line) {
            Ok(event) => event,
            Err(e) => {
                println!("{}", e);
                return false;
            }
        };

        println!("{}", event);
        match event {
            GateEvent::AccessGranted { .. } => return true,
            GateEvent::LockedOut | GateEvent::AccessDenied { .. } => return false,
            _ => {}
        }
    }
}

/// Slide-show navigation for an opened collection
fn browse(collection: &Collection, stdin: &io::Stdin) {
    let mut viewer = SlideShow::from_collection(collection);
    if !viewer.open(0) {
        println!("'{}' has no images yet.", collection.name);
        return;
    }

    println!("Viewing '{}'. Commands: n(ext), p(rev), j <index>, d(ownload), q(uit).", collection.name);
    show_current(&viewer);

    loop {
        prompt("view> ");
        let line = match read_line(stdin) {
            Some(line) => line,
            None => break,
        };

        match line.trim().split_once(' ').unwrap_or((line.trim(), "")) {
            ("n", _) => {
                viewer.next();
                show_current(&viewer);
            }
            ("p", _) => {
                viewer.previous();
                show_current(&viewer);
            }
            ("j", index) => {
                let jumped = index
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| i.checked_sub(1))
                    .map(|i| viewer.jump(i))
                    .unwrap_or(false);
                if jumped {
                    show_current(&viewer);
                } else {
                    println!("No image at that index.");
                }
            }
            ("d", _) => {
                if let Some(image) = viewer.current() {
                    println!(
                        "Download started: {} ({})",
                        viewer::download_name(&image.source),
                        image.source
                    );
                }
            }
            ("q", _) | ("", _) => break,
            (other, _) => println!("Unknown viewer command '{}'.", other),
        }
    }

    viewer.close();
}

fn show_current(viewer: &SlideShow) {
    if let (Some(image), Some((position, total))) = (viewer.current(), viewer.position()) {
        println!("[{} / {}] {}", position, total, image.source);
    }
}

fn print_collections(gate: &AccessGate, registry: &Registry) {
    println!();
    for collection in registry.iter() {
        let status = match gate.status(&collection.id) {
            Ok(status) => status,
            Err(_) => continue,
        };
        let badge = match status {
            CollectionStatus::Open => "open",
            CollectionStatus::ChallengeRequired => "protected",
            CollectionStatus::Granted => "granted",
            CollectionStatus::LockedOut => "locked out",
        };
        println!(
            "  {:12} {:<20} [{}] {} photo(s)",
            collection.id,
            collection.name,
            badge,
            collection.image_count()
        );
        if !collection.description.is_empty() {
            println!("  {:12} {}", "", collection.description);
        }
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  open <id>    Request access to a collection");
    println!("  reset <id>   Clear persisted access state (unlocks a lockout)");
    println!("  list         Show collections and their access status");
    println!("  metrics      Show gate activity counters");
    println!("  help         Show this help");
    println!("  quit         Exit");
}

fn prompt(text: &str) {
    print!("{}", text);
    let _ = io::stdout().flush();
}

fn read_line(stdin: &io::Stdin) -> Option<String> {
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(_) => None,
    }
}
