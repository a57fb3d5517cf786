/// Annotate: resolve entity mentions in dialogue text against a roster.
///
/// Usage: annotate --roster <path> [--config <path>] [--ron] [text...]
///
/// With no text arguments, each line of stdin is resolved separately.

use stakeholder_narrative::core::config::SceneConfig;
use stakeholder_narrative::core::resolver::EntityResolver;
use stakeholder_narrative::schema::entity::Roster;
use stakeholder_narrative::schema::segment::TextSegment;
use std::io::{self, BufRead};
use std::path::Path;
use std::process;

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

    let mut roster_path = None;
    let mut config_path = None;
    let mut ron_output = false;
    let mut words = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--roster" if i + 1 < args.len() => {
                i += 1;
                roster_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--ron" => ron_output = true,
            other => words.push(other.to_string()),
        }
        i += 1;
    }

    let Some(roster_path) = roster_path else {
        eprintln!("ERROR: --roster is required");
        print_usage();
        process::exit(1);
    };

    let roster = match Roster::load_from_ron(Path::new(&roster_path)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: Failed to load roster: {}", e);
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

    let resolver = EntityResolver::new(config.resolver);

    if !words.is_empty() {
        let text = words.join(" ");
        print_segments(&resolver.resolve(&text, &roster), &roster, ron_output);
        return;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        print_segments(&resolver.resolve(&line, &roster), &roster, ron_output);
    }
}

fn print_segments(segments: &[TextSegment], roster: &Roster, ron_output: bool) {
    if ron_output {
        match ron::to_string(segments) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("ERROR: {}", e),
        }
        return;
    }

    for segment in segments {
        match segment {
            TextSegment::Literal { text, span } => {
                println!("  {:>4}..{:<4} text    {:?}", span.start, span.end, text);
            }
            TextSegment::EntityRef {
                entity_id,
                display_text,
                span,
            } => {
                let role = roster.get(entity_id).map(|e| e.role.as_str()).unwrap_or("?");
                println!(
                    "  {:>4}..{:<4} entity  {:?} -> {} ({})",
                    span.start, span.end, display_text, entity_id, role
                );
            }
        }
    }
    println!();
}

fn print_usage() {
    println!("Usage: annotate --roster <path> [--config <path>] [--ron] [text...]");
    println!();
    println!("Resolves entity mentions in the given text, or in each stdin line.");
    println!("  --roster <path>   RON list of entities in the scene");
    println!("  --config <path>   RON scene config (tag prefix, honorifics, ...)");
    println!("  --ron             print segments as RON instead of a table");
}
