/// Table Linter — validates a data directory: tables, domains and locales.
///
/// Usage: table_linter <data_dir> [--default-locale <tag>]
///
/// Errors are the structural problems a generator build rejects. Warnings
/// are legal but suspicious: thin tables, tables no domain can reach,
/// keys a locale leaves to the default bundle, and locale texts nothing uses.

use clap::Parser;
use maze_rats_lab::core::composer::DEFAULT_LOCALE;
use maze_rats_lab::core::localizer::Locales;
use maze_rats_lab::core::registry::FrozenRegistry;
use maze_rats_lab::data::DataSet;
use maze_rats_lab::schema::domain::DomainSchema;
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "table_linter")]
#[command(about = "Validate Maze Rats Lab table, domain and locale data")]
struct Args {
    /// Data directory with tables/, domains.ron and locales/
    data_dir: PathBuf,

    /// Locale every other locale falls back to
    #[arg(long, default_value = DEFAULT_LOCALE)]
    default_locale: String,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !args.data_dir.is_dir() {
        eprintln!("ERROR: Path '{}' is not a directory", args.data_dir.display());
        process::exit(1);
    }

    let data = match DataSet::load_dir(&args.data_dir) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("ERROR: Failed to load data directory: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} tables, {} domains, {} locales",
        data.tables.len(),
        data.domains.len(),
        data.bundles.len()
    );

    let (errors, warnings) = lint(data, &args.default_locale);

    println!("\n=== Table Lint Report ===\n");

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

    if !errors.is_empty() {
        process::exit(1);
    }
}

fn lint(data: DataSet, default_locale: &str) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let registry = match data.tables.freeze() {
        Ok(registry) => registry,
        Err(e) => {
            // Nothing past this point is meaningful on a broken registry.
            errors.push(e.to_string());
            return (errors, warnings);
        }
    };

    for schema in &data.domains {
        if let Err(e) = registry.check_schema(schema) {
            errors.push(e.to_string());
        }
    }

    for table in registry.tables() {
        // Single-entry tables are fixed values, not thin ones.
        if table.entries.len() == 2 {
            warnings.push(format!(
                "Table '{}' has only 2 entries (minimum 3 recommended)",
                table.name
            ));
        }
    }

    let reachable = reachable_tables(&registry, &data.domains);
    for table in registry.tables() {
        if !reachable.contains(table.name.as_str()) {
            warnings.push(format!(
                "Table '{}' is not reachable from any domain",
                table.name
            ));
        }
    }

    let locales = match Locales::new(default_locale, data.bundles) {
        Ok(locales) => locales,
        Err(e) => {
            errors.push(e.to_string());
            return (errors, warnings);
        }
    };
    if let Err(e) = locales.check_registry(&registry) {
        errors.push(e.to_string());
    }

    let used: FxHashSet<&str> = registry
        .tables()
        .flat_map(|t| t.localization_keys())
        .collect();

    for bundle in locales.bundles() {
        if bundle.tag() != locales.default_bundle().tag() {
            for key in locales.fallback_keys(bundle.tag(), &registry) {
                warnings.push(format!(
                    "Locale '{}' has no text for '{}', falls back to '{}'",
                    bundle.tag(),
                    key,
                    locales.default_bundle().tag()
                ));
            }
        }

        let mut unused: Vec<&str> = bundle.keys().filter(|k| !used.contains(k)).collect();
        unused.sort_unstable();
        for key in unused {
            warnings.push(format!(
                "Locale '{}' defines '{}' but no table uses it",
                bundle.tag(),
                key
            ));
        }
    }

    (errors, warnings)
}

fn reachable_tables<'a>(registry: &'a FrozenRegistry, domains: &'a [DomainSchema]) -> FxHashSet<&'a str> {
    let mut seen = FxHashSet::default();
    let mut stack: Vec<&str> = domains
        .iter()
        .flat_map(|d| d.fields.iter().map(|f| f.table.as_str()))
        .collect();
    while let Some(name) = stack.pop() {
        if !seen.insert(name) {
            continue;
        }
        if let Ok(table) = registry.get(name) {
            stack.extend(table.references());
        }
    }
    seen
}
