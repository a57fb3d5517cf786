/// Deck shell: drive a decision card deck by hand on a virtual clock.
///
/// Usage: deck_shell --options <path> [--config <path>] [--node <id>]
///
/// Commands:
///   enter <id>               pointer or focus enters a card
///   leave <id>               pointer or focus leaves a card
///   click <id>               activate a card
///   key <id> enter|space     keyboard activation
///   wait <ms>                advance the clock and fire due timers
///   anchor <id> l t w h      report a card's bounding box
///   viewport <w> <h>         resize the viewport
///   disable | enable         toggle the deck's disabled flag
///   state                    show controller state
///   help                     list commands
///   quit                     exit

use stakeholder_narrative::core::bridge::{
    dispatch, Cue, CueError, InteractionEvent, InteractionLogger, Millis, SceneHost,
};
use stakeholder_narrative::core::config::SceneConfig;
use stakeholder_narrative::core::deck::{DeckController, DeckKey};
use stakeholder_narrative::core::placement::{Rect, Viewport};
use stakeholder_narrative::core::session_log::SessionLog;
use stakeholder_narrative::schema::action::{load_offer_from_ron, ActionCandidate, AmbientEffects};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

struct ShellHost {
    log: SessionLog,
    ambient: Option<AmbientEffects>,
    selected: Option<String>,
}

impl SceneHost for ShellHost {
    fn on_option_selected(&mut self, candidate: &ActionCandidate) {
        println!("  >> selected '{}' ({})", candidate.id, candidate.label);
        self.selected = Some(candidate.id.clone());
    }

    fn on_hover_effects(&mut self, effects: Option<&AmbientEffects>) {
        match effects {
            Some(e) => {
                let pairs: Vec<String> = e.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                println!("  ~ ambient: {}", pairs.join(", "));
            }
            None => println!("  ~ ambient cleared"),
        }
        self.ambient = effects.cloned();
    }

    fn log_interaction(&mut self, event: &InteractionEvent) {
        println!(
            "  . {} {}={} @{}",
            event.kind.as_str(),
            event.target.metadata_key(),
            event.target.id(),
            event.at
        );
        self.log.record(event);
    }

    fn play_cue(&mut self, cue: Cue) -> Result<(), CueError> {
        println!("  ♪ {:?}", cue);
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut options_path = None;
    let mut config_path = None;
    let mut node_id = "shell".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--options" if i + 1 < args.len() => {
                i += 1;
                options_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--node" if i + 1 < args.len() => {
                i += 1;
                node_id = args[i].clone();
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(options_path) = options_path else {
        eprintln!("ERROR: --options is required");
        print_usage();
        process::exit(1);
    };

    let offer = match load_offer_from_ron(Path::new(&options_path)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("ERROR: Failed to load options: {}", e);
            process::exit(1);
        }
    };

    let config = match config_path {
        Some(ref path) => match SceneConfig::load_from_ron(Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };

    println!("Loaded {} options", offer.len());
    for option in &offer {
        let lock = if option.locked { " [locked]" } else { "" };
        println!("  {} {}  {}{}", option.icon(), option.id, option.label, lock);
    }
    println!("Seed: {}", config.deck.seed);
    println!("Type 'help' for commands.\n");

    let mut now: Millis = 0;
    let mut deck = DeckController::new(config.deck);
    let mut host = ShellHost {
        log: SessionLog::new(),
        ambient: None,
        selected: None,
    };
    host.log.start(node_id.clone(), now);
    let effects = deck.set_options(offer);
    dispatch(effects, &mut host);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("deck[{}ms]> ", now);
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                deck.teardown();
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "enter" | "leave" | "click" | "activate" => {
                let Some(id) = parts.get(1) else {
                    println!("Usage: {} <id>", cmd);
                    continue;
                };
                let effects = match cmd.as_str() {
                    "enter" => deck.enter(id, now),
                    "leave" => deck.leave(id, now),
                    _ => deck.activate(id, now),
                };
                dispatch(effects, &mut host);
            }
            "key" => {
                if parts.len() < 3 {
                    println!("Usage: key <id> enter|space");
                    continue;
                }
                let key = match parts[2].to_lowercase().as_str() {
                    "enter" => DeckKey::Enter,
                    "space" => DeckKey::Space,
                    _ => DeckKey::Other,
                };
                let effects = deck.key_down(parts[1], key, now);
                dispatch(effects, &mut host);
            }
            "wait" => {
                let Some(ms) = parts.get(1).and_then(|s| s.parse::<Millis>().ok()) else {
                    println!("Usage: wait <ms>");
                    continue;
                };
                now = now.saturating_add(ms);
                let effects = deck.advance(now);
                dispatch(effects, &mut host);
            }
            "anchor" => {
                let nums: Vec<f64> = parts.iter().skip(2).filter_map(|s| s.parse().ok()).collect();
                if parts.len() < 6 || nums.len() != 4 {
                    println!("Usage: anchor <id> <left> <top> <width> <height>");
                    continue;
                }
                deck.set_anchor(parts[1], Some(Rect::new(nums[0], nums[1], nums[2], nums[3])));
            }
            "viewport" => {
                let nums: Vec<f64> = parts.iter().skip(1).filter_map(|s| s.parse().ok()).collect();
                if nums.len() != 2 {
                    println!("Usage: viewport <width> <height>");
                    continue;
                }
                deck.on_viewport_change(Viewport::new(nums[0], nums[1]));
            }
            "disable" => deck.set_disabled(true),
            "enable" => deck.set_disabled(false),
            "state" => print_state(&deck, &host),
            _ => println!("Unknown command '{}'. Type 'help' for commands.", cmd),
        }

        if let Some(choice) = host.selected.take() {
            if let Some(entry) = host.log.finalize(choice, now) {
                println!(
                    "Session '{}' closed after {}ms with {} events.",
                    entry.node_id,
                    entry.total_duration,
                    entry.events.len()
                );
            }
            host.log.start(node_id.clone(), now);
        }
    }
}

fn print_state(deck: &DeckController, host: &ShellHost) {
    println!("  state: {:?}", deck.state());
    println!("  armed: {}", deck.is_armed());
    if let Some(preview) = deck.preview() {
        println!("  preview: {}", preview.preview_text());
    }
    if let Some(p) = deck.placement() {
        println!(
            "  placement: left={} bottom={} width={} min_height={}",
            p.left, p.bottom, p.width, p.min_height
        );
    }
    if let Some(dir) = deck.throw_direction() {
        println!("  throw: {:?}", dir);
    }
    let dimmed: Vec<&str> = deck
        .options()
        .iter()
        .filter(|o| deck.is_dimmed(&o.id))
        .map(|o| o.id.as_str())
        .collect();
    if !dimmed.is_empty() {
        println!("  dimmed: {}", dimmed.join(", "));
    }
    match deck.next_deadline() {
        Some(t) => println!("  next deadline: {}ms", t),
        None => println!("  no pending timers"),
    }
    println!("  ambient slot: {:?}", host.ambient);
}

fn print_help() {
    println!("Commands:");
    println!("  enter <id>               pointer or focus enters a card");
    println!("  leave <id>               pointer or focus leaves a card");
    println!("  click <id>               activate a card");
    println!("  key <id> enter|space     keyboard activation");
    println!("  wait <ms>                advance the clock and fire due timers");
    println!("  anchor <id> l t w h      report a card's bounding box");
    println!("  viewport <w> <h>         resize the viewport");
    println!("  disable | enable         toggle the deck's disabled flag");
    println!("  state                    show controller state");
    println!("  quit                     exit");
}

fn print_usage() {
    eprintln!("Usage: deck_shell --options <path> [--config <path>] [--node <id>]");
}
