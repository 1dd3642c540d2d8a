/// Template Linter: validates a news template bank.
///
/// Usage: template_linter [<templates.ron>...] [--strict]
///
/// With no files, lints the bank built into the crate. Later files override
/// earlier ones, the same way the engine merges `templates_path`.

use revelation_engine::core::narrative::TemplateBank;
use revelation_engine::core::template::Template;
use revelation_engine::schema::event::GameEventType;
use revelation_engine::schema::evidence::ConfidenceLevel;
use revelation_engine::schema::traits::Trait;
use std::path::Path;
use std::process;

/// Keys the engine always fills in.
const ENGINE_METADATA_KEYS: [&str; 2] = ["season", "week"];

/// Levels every trait is expected to have written out explicitly.
const EXPECTED_LEVELS: [ConfidenceLevel; 3] = [
    ConfidenceLevel::Suspected,
    ConfidenceLevel::Strong,
    ConfidenceLevel::Confirmed,
];

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        println!("Usage: template_linter [<templates.ron>...] [--strict]");
        process::exit(0);
    }

    let strict = args.iter().any(|a| a == "--strict");
    let files: Vec<&String> = args[1..].iter().filter(|a| !a.starts_with("--")).collect();

    let bank = if files.is_empty() {
        println!("Linting built-in template bank");
        match TemplateBank::default_bank() {
            Ok(bank) => bank,
            Err(e) => {
                eprintln!("ERROR: Built-in bank failed to load: {}", e);
                process::exit(1);
            }
        }
    } else {
        load_banks(&files)
    };

    let (errors, warnings) = lint_bank(&bank);

    println!("\n=== Template Lint Report ===\n");

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

    if errors.is_empty() && !(strict && !warnings.is_empty()) {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_banks(files: &[&String]) -> TemplateBank {
    let mut merged: Option<TemplateBank> = None;
    for file in files {
        let path = Path::new(file.as_str());
        match TemplateBank::load_from_ron(path) {
            Ok(bank) => {
                println!("  Loaded: {}", path.display());
                match merged.as_mut() {
                    Some(existing) => existing.merge(bank),
                    None => merged = Some(bank),
                }
            }
            Err(e) => {
                eprintln!("ERROR: Failed to load {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }
    match merged {
        Some(bank) => bank,
        None => {
            eprintln!("ERROR: No template files given");
            process::exit(1);
        }
    }
}

/// Returns the first forbidden word found in the template's literal text.
fn disclosure(template: &Template) -> Option<String> {
    let text = template.literal_text().to_lowercase();
    if text.contains("trait") {
        return Some("trait".to_string());
    }
    Trait::ALL.iter().find_map(|t| {
        [t.name(), t.label()]
            .into_iter()
            .map(str::to_lowercase)
            .find(|word| text.contains(word.as_str()))
    })
}

fn lint_bank(bank: &TemplateBank) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Coverage: every trait must resolve at its weakest newsworthy level
    for t in Trait::ALL {
        if bank.find_trait_template(t, ConfidenceLevel::Suspected).is_none() {
            errors.push(format!("'{}' has no template at suspected or above", t.name()));
        }
        if bank.find_trait_template(t, ConfidenceLevel::Confirmed).is_none() {
            errors.push(format!("'{}' has no confirmed template", t.name()));
        }
    }
    for (t, level) in bank.missing_levels(&EXPECTED_LEVELS) {
        warnings.push(format!(
            "'{}' has no {} template (falls back to a stronger one)",
            t.name(),
            level.name()
        ));
    }

    for event_type in GameEventType::ALL {
        if !bank.has_event_template(event_type) {
            warnings.push(format!("'{}' uses the generic event template", event_type.name()));
        }
    }

    let mut trait_templates: Vec<_> = bank.trait_templates().collect();
    trait_templates.sort_by_key(|t| (t.trait_kind, t.confidence));

    for tt in trait_templates {
        let key = format!("{}/{}", tt.trait_kind.name(), tt.confidence.name());

        if tt.headlines.len() < 2 || tt.bodies.len() < 2 {
            warnings.push(format!(
                "'{}' has {} headlines and {} bodies (minimum 2 each recommended)",
                key,
                tt.headlines.len(),
                tt.bodies.len()
            ));
        }

        for template in tt.headlines.iter().chain(tt.bodies.iter()) {
            if let Some(word) = disclosure(template) {
                errors.push(format!("'{}' names '{}' in its text", key, word));
            }
            for meta in template.metadata_keys() {
                if !ENGINE_METADATA_KEYS.contains(&meta) {
                    warnings.push(format!(
                        "'{}' reads metadata '{}', which the engine never supplies",
                        key, meta
                    ));
                }
            }
        }
    }

    for template in bank
        .event_templates()
        .flat_map(|e| e.headlines.iter().chain(e.bodies.iter()))
    {
        if let Some(word) = disclosure(template) {
            errors.push(format!("an event template names '{}' in its text", word));
        }
    }

    (errors, warnings)
}
