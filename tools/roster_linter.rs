/// Roster Linter: reports name-matching problems in a scene roster.
///
/// Usage: roster_linter <roster.ron> [--config <path>]

use rustc_hash::FxHashMap;
use stakeholder_narrative::core::config::{ResolverConfig, SceneConfig};
use stakeholder_narrative::core::normalize::fold_key;
use stakeholder_narrative::core::resolver::name_tokens;
use stakeholder_narrative::schema::entity::Roster;
use std::path::Path;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: roster_linter <roster.ron> [--config <path>]");
        process::exit(0);
    }

    let roster_path = &args[1];
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            i += 1;
            config_path = Some(args[i].clone());
        }
        i += 1;
    }

    let roster = match Roster::load_from_ron(Path::new(roster_path)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: Failed to load roster: {}", e);
            process::exit(1);
        }
    };

    let config = match config_path {
        Some(ref path) => match SceneConfig::load_from_ron(Path::new(path)) {
            Ok(c) => c.resolver,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => ResolverConfig::default(),
    };

    println!("Loaded {} entities", roster.len());

    let (errors, warnings) = lint_roster(&roster, &config);

    println!("\n=== Roster Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_roster(roster: &Roster, config: &ResolverConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Folded token -> entity ids that produce it, in roster order
    let mut owners: FxHashMap<String, Vec<&str>> = FxHashMap::default();

    for entity in roster.iter() {
        if entity.name.trim().is_empty() {
            errors.push(format!("Entity '{}' has an empty name", entity.id));
            continue;
        }

        let tokens = name_tokens(&entity.name, config);
        if tokens.is_empty() {
            warnings.push(format!(
                "Entity '{}' ('{}') has no matchable name token; use explicit tags",
                entity.id, entity.name
            ));
        }

        let mut seen_keys = Vec::new();
        for token in &tokens {
            let key = fold_key(token);
            if seen_keys.contains(&key) {
                continue;
            }
            owners.entry(key.clone()).or_default().push(entity.id.as_str());
            seen_keys.push(key);
        }

        if entity.role.trim().is_empty() {
            warnings.push(format!("Entity '{}' has no role for its tooltip", entity.id));
        }
    }

    let mut shared: Vec<(&String, &Vec<&str>)> =
        owners.iter().filter(|(_, ids)| ids.len() > 1).collect();
    shared.sort_by(|a, b| a.0.cmp(b.0));
    for (token, ids) in shared {
        warnings.push(format!(
            "Token '{}' is shared by {:?}; mentions resolve to '{}'",
            token, ids, ids[0]
        ));
    }

    (errors, warnings)
}
