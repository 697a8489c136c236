//! corpusconf CLI - Command-line interface for the corpus registry
//!
//! Usage:
//!   corpusconf check corpora.ini
//!   corpusconf list corpora.ini --format json
//!   corpusconf get corpora.ini Russian --field sessions
//!   corpusconf dump corpora.ini --resolve
//!   corpusconf sessions corpora.ini Russian

use clap::{Parser, Subcommand};
use colored::Colorize;
use corpusconf_core::{CorpusEntry, CorpusRegistry, RawStore, RegistryOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// corpusconf - Corpus metadata registry with placeholder resolution
#[derive(Parser, Debug)]
#[command(name = "corpusconf")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Name of the global defaults section
    #[arg(long, global = true, default_value = ".global")]
    global_section: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve and validate configuration files
    Check {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List registered corpora
    List {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show one corpus entry
    Get {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Corpus identifier (e.g., Russian)
        corpus: String,

        /// Print a single field instead of the whole entry
        #[arg(long)]
        field: Option<String>,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the merged configuration
    Dump {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Resolve placeholders
        #[arg(short, long)]
        resolve: bool,

        /// Output format: ini, json, yaml
        #[arg(short, long, default_value = "ini")]
        format: String,
    },

    /// List the session files matched by a corpus's pattern
    Sessions {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Corpus identifier (e.g., Russian)
        corpus: String,

        /// Also print the derived metadata file next to each session
        #[arg(long)]
        metadata: bool,
    },
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    execute(Cli::parse())
}

fn execute(cli: Cli) -> ExitCode {
    let options = RegistryOptions::default().with_global_section(cli.global_section);

    match cli.command {
        Commands::Check { files } => cmd_check(files, &options),
        Commands::List { files, format } => cmd_list(files, &options, &format),
        Commands::Get {
            files,
            corpus,
            field,
            format,
        } => cmd_get(files, &options, &corpus, field.as_deref(), &format),
        Commands::Dump {
            files,
            resolve,
            format,
        } => cmd_dump(files, resolve, &format),
        Commands::Sessions {
            files,
            corpus,
            metadata,
        } => cmd_sessions(files, &options, &corpus, metadata),
    }
}

fn load_store(files: &[PathBuf]) -> Result<RawStore, String> {
    if files.is_empty() {
        return Err("No configuration files specified".to_string());
    }
    RawStore::load_merged(files).map_err(|e| format!("Failed to load configuration: {}", e))
}

fn load_registry(files: &[PathBuf], options: &RegistryOptions) -> Result<CorpusRegistry, ExitCode> {
    let raw = load_store(files).map_err(|e| {
        eprintln!("{}", e.red());
        ExitCode::from(2)
    })?;

    CorpusRegistry::from_raw(&raw, options).map_err(|e| {
        eprintln!("{} Invalid configuration\n", "✗".red());
        eprintln!("{}", e);
        ExitCode::from(1)
    })
}

fn cmd_check(files: Vec<PathBuf>, options: &RegistryOptions) -> ExitCode {
    match load_registry(&files, options) {
        Ok(registry) => {
            let files_str: Vec<_> = files.iter().map(|f| f.display().to_string()).collect();
            println!(
                "{} {} is valid ({} corpora)",
                "✓".green(),
                files_str.join(", "),
                registry.len()
            );
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn cmd_list(files: Vec<PathBuf>, options: &RegistryOptions, format: &str) -> ExitCode {
    let registry = match load_registry(&files, options) {
        Ok(r) => r,
        Err(code) => return code,
    };

    match format {
        "json" => match serde_json::to_string_pretty(registry.entries()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                return ExitCode::from(1);
            }
        },
        _ => {
            let width = registry.names().map(str::len).max().unwrap_or(0);
            for entry in &registry {
                println!(
                    "{:<width$}  {:<8}  {}",
                    entry.id.bold(),
                    entry.format,
                    entry.sessions,
                    width = width
                );
            }
        }
    }
    ExitCode::SUCCESS
}

fn cmd_get(
    files: Vec<PathBuf>,
    options: &RegistryOptions,
    corpus: &str,
    field: Option<&str>,
    format: &str,
) -> ExitCode {
    let registry = match load_registry(&files, options) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let entry = match registry.get(corpus) {
        Ok(entry) => entry,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(1);
        }
    };

    if let Some(field) = field {
        return match entry.attribute(field) {
            Some(value) => {
                println!("{}", value);
                ExitCode::SUCCESS
            }
            None => {
                eprintln!(
                    "{}: Corpus '{}' has no field '{}'",
                    "Error".red(),
                    entry.id,
                    field
                );
                ExitCode::from(1)
            }
        };
    }

    let rendered = match format {
        "json" => serde_json::to_string_pretty(entry).map_err(|e| e.to_string()),
        "yaml" => serde_yaml::to_string(entry).map_err(|e| e.to_string()),
        _ => Ok(render_entry(entry)),
    };

    match rendered {
        Ok(text) => {
            println!("{}", text.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn render_entry(entry: &CorpusEntry) -> String {
    let mut lines = vec![format!("[{}]", entry.id)];
    let optional = [
        ("acronym", entry.acronym.as_deref()),
        ("metadata_dir", entry.metadata_dir.as_deref()),
    ];
    let fields = [
        ("iso_639_3", Some(entry.iso_639_3.as_str())),
        ("glottolog_code", Some(entry.glottolog_code.as_str())),
        ("language", Some(entry.language.as_str())),
        ("corpus", Some(entry.corpus.as_str())),
        ("owner", Some(entry.owner.as_str())),
        ("name", Some(entry.name.as_str())),
        ("license", Some(entry.license.as_str())),
        ("format", Some(entry.format.as_str())),
        ("sessions", Some(entry.sessions.as_str())),
    ];
    for (key, value) in fields.into_iter().chain(optional) {
        if let Some(value) = value {
            lines.push(format!("{} = {}", key, value));
        }
    }
    for (key, value) in &entry.extra {
        lines.push(format!("{} = {}", key, value));
    }
    lines.join("\n")
}

fn cmd_dump(files: Vec<PathBuf>, resolve: bool, format: &str) -> ExitCode {
    let raw = match load_store(&files) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    let result = if resolve {
        raw.resolve().map_err(|e| e.to_string()).and_then(|resolved| match format {
            "json" => serde_json::to_string_pretty(&resolved).map_err(|e| e.to_string()),
            "yaml" => serde_yaml::to_string(&resolved).map_err(|e| e.to_string()),
            _ => Ok(resolved.to_ini_string()),
        })
    } else {
        match format {
            "json" => serde_json::to_string_pretty(&raw).map_err(|e| e.to_string()),
            "yaml" => serde_yaml::to_string(&raw).map_err(|e| e.to_string()),
            _ => Ok(raw.to_ini_string()),
        }
    };

    match result {
        Ok(content) => {
            println!("{}", content.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn cmd_sessions(
    files: Vec<PathBuf>,
    options: &RegistryOptions,
    corpus: &str,
    metadata: bool,
) -> ExitCode {
    let registry = match load_registry(&files, options) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let entry = match registry.get(corpus) {
        Ok(entry) => entry,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(1);
        }
    };

    let sessions = match discover_sessions(&entry.sessions) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(1);
        }
    };

    if sessions.is_empty() {
        eprintln!(
            "{} No session files match {}",
            "!".yellow(),
            entry.sessions
        );
    }

    for session in sessions {
        let shown = session.display().to_string();
        match (metadata, entry.metadata_path_for(&shown)) {
            (true, Some(meta)) => println!("{}\t{}", shown, meta),
            _ => println!("{}", shown),
        }
    }
    ExitCode::SUCCESS
}

/// Expand a session pattern against the filesystem, sorted by path
pub(crate) fn discover_sessions(pattern: &str) -> Result<Vec<PathBuf>, String> {
    let paths = glob::glob(pattern).map_err(|e| format!("Invalid pattern '{}': {}", pattern, e))?;
    let mut sessions = Vec::new();
    for path in paths {
        match path {
            Ok(p) if p.is_file() => sessions.push(p),
            Ok(_) => {}
            Err(e) => eprintln!("{} {}", "!".yellow(), e),
        }
    }
    sessions.sort();
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const CORPORA: &str = r#"
[.global]
corpora_dir = CORPORA_DIR

[Russian]
iso_639_3 = rus
glottolog_code = russ1263
language = Russian
corpus = Russian
owner = Stoll, Sabine
name = Stoll Corpus
license = restricted
format = toolbox
sessions = ${.global:corpora_dir}/Russian/${format}/*.txt
metadata_dir = ${.global:corpora_dir}/Russian/imdi/*.imdi
"#;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get_with_field() {
        let cli = Cli::try_parse_from([
            "corpusconf",
            "get",
            "a.ini",
            "b.ini",
            "Russian",
            "--field",
            "sessions",
        ])
        .unwrap();

        match cli.command {
            Commands::Get {
                files,
                corpus,
                field,
                format,
            } => {
                assert_eq!(files, vec![PathBuf::from("a.ini"), PathBuf::from("b.ini")]);
                assert_eq!(corpus, "Russian");
                assert_eq!(field.as_deref(), Some("sessions"));
                assert_eq!(format, "text");
            }
            other => panic!("Expected Get, got {:?}", other),
        }
        assert_eq!(cli.global_section, ".global");
    }

    #[test]
    fn test_parse_global_section_override() {
        let cli =
            Cli::try_parse_from(["corpusconf", "check", "a.ini", "--global-section", "DEFAULT"])
                .unwrap();
        assert_eq!(cli.global_section, "DEFAULT");
    }

    #[test]
    fn test_check_requires_files() {
        assert!(Cli::try_parse_from(["corpusconf", "check"]).is_err());
    }

    #[test]
    fn test_discover_sessions_sorted() {
        let temp_dir = std::env::temp_dir().join("corpusconf_cli_sessions");
        let toolbox = temp_dir.join("Russian").join("toolbox");
        std::fs::create_dir_all(&toolbox).unwrap();
        std::fs::write(toolbox.join("b.txt"), "").unwrap();
        std::fs::write(toolbox.join("a.txt"), "").unwrap();
        std::fs::write(toolbox.join("notes.md"), "").unwrap();

        let config_path = temp_dir.join("corpora.ini");
        std::fs::write(
            &config_path,
            CORPORA.replace("CORPORA_DIR", &temp_dir.display().to_string()),
        )
        .unwrap();

        let registry = CorpusRegistry::load(&config_path).unwrap();
        let entry = registry.get("Russian").unwrap();
        let sessions = discover_sessions(&entry.sessions).unwrap();

        assert_eq!(sessions, vec![toolbox.join("a.txt"), toolbox.join("b.txt")]);
        assert_eq!(
            entry
                .metadata_path_for(&sessions[0].display().to_string())
                .unwrap(),
            format!("{}/Russian/imdi/a.imdi", temp_dir.display())
        );

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_discover_sessions_bad_pattern() {
        assert!(discover_sessions("corpora/[").is_err());
    }

    #[test]
    fn test_render_entry() {
        let registry =
            CorpusRegistry::from_ini_str(&CORPORA.replace("CORPORA_DIR", "corpora")).unwrap();
        let text = render_entry(registry.get("Russian").unwrap());

        assert!(text.starts_with("[Russian]\niso_639_3 = rus\n"));
        assert!(text.contains("sessions = corpora/Russian/toolbox/*.txt"));
        assert!(text.ends_with("metadata_dir = corpora/Russian/imdi/*.imdi"));
    }

    #[test]
    fn test_execute_check_exit_codes() {
        let temp_dir = std::env::temp_dir().join("corpusconf_cli_check");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let good = temp_dir.join("good.ini");
        let bad = temp_dir.join("bad.ini");
        std::fs::write(&good, CORPORA.replace("CORPORA_DIR", "corpora")).unwrap();
        std::fs::write(&bad, "[Cree]\nsessions = ${missing}\n").unwrap();

        let run = |path: &PathBuf| {
            let code = execute(
                Cli::try_parse_from(["corpusconf", "check", path.to_str().unwrap()]).unwrap(),
            );
            format!("{:?}", code)
        };
        assert_eq!(run(&good), format!("{:?}", ExitCode::SUCCESS));
        assert_eq!(run(&bad), format!("{:?}", ExitCode::from(1)));
        assert_eq!(
            run(&temp_dir.join("absent.ini")),
            format!("{:?}", ExitCode::from(2))
        );

        std::fs::remove_dir_all(&temp_dir).ok();
    }
}
