//! Compendium CLI
//!
//! Command-line tool for inspecting, merging and editing XML game
//! compendium files.

use clap::{Parser, Subcommand};
use compendium_core::{
    decode_file, encode, reconcile, scan_roots, Category, Entry, ImportPolicy,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "compendium-cli")]
#[command(about = "XML game compendium toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories for compendium XML files
    Scan {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,
    },

    /// Parse a compendium file and report its contents
    Parse {
        /// Path to the XML file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List the entries of one category
    Show {
        /// Path to the XML file
        #[arg(short, long)]
        file: PathBuf,

        /// Category to list (items, spells, monsters, classes, races, feats, backgrounds)
        #[arg(short, long)]
        category: String,

        /// Maximum number of entries to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print each entry's body text as well
        #[arg(short, long)]
        detail: bool,
    },

    /// Merge one or more compendium files into a base file
    Merge {
        /// Base compendium file
        #[arg(short, long)]
        base: PathBuf,

        /// Incoming compendium files, applied in order
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Root directories whose XML files are applied after --file, in path order
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Import policy (merge or replace)
        #[arg(long, default_value = "merge")]
        policy: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export a compendium to XML or JSON
    Export {
        /// Path to the XML file
        #[arg(short, long)]
        file: PathBuf,

        /// Output format (xml or json)
        #[arg(long, default_value = "xml")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Add an entry described by a JSON file
    Add {
        /// Path to the XML file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to a JSON entry file (category-tagged)
        #[arg(short, long)]
        entry: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Delete an entry by category and exact name
    Delete {
        /// Path to the XML file
        #[arg(short, long)]
        file: PathBuf,

        /// Category holding the entry
        #[arg(short, long)]
        category: String,

        /// Exact entry name
        #[arg(short, long)]
        name: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> compendium_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { root } => cmd_scan(&root),
        Commands::Parse { file } => cmd_parse(&file),
        Commands::Show {
            file,
            category,
            limit,
            detail,
        } => cmd_show(&file, &category, limit, detail),
        Commands::Merge {
            base,
            file,
            root,
            policy,
            output,
        } => cmd_merge(&base, &file, &root, &policy, &output),
        Commands::Export {
            file,
            format,
            output,
        } => cmd_export(&file, &format, &output),
        Commands::Add {
            file,
            entry,
            output,
        } => cmd_add(&file, &entry, &output),
        Commands::Delete {
            file,
            category,
            name,
            output,
        } => cmd_delete(&file, &category, &name, &output),
    }
}

/// Resolve a category argument or exit with the accepted spellings
fn parse_category(arg: &str) -> Category {
    match Category::from_key(arg) {
        Some(category) => category,
        None => {
            let keys: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
            eprintln!("Unknown category: {}. Supported: {}", arg, keys.join(", "));
            std::process::exit(1);
        }
    }
}

/// Resolve a policy argument or exit
fn parse_policy(arg: &str) -> ImportPolicy {
    match arg.to_lowercase().as_str() {
        "merge" => ImportPolicy::Merge,
        "replace" => ImportPolicy::Replace,
        _ => {
            eprintln!("Unknown policy: {}. Supported policies: merge, replace", arg);
            std::process::exit(1);
        }
    }
}

fn cmd_scan(roots: &[PathBuf]) -> compendium_core::Result<()> {
    let result = scan_roots(roots)?;

    println!("Scanned {} root(s):", result.roots.len());
    for root in &result.roots {
        println!("  {}", root.display());
    }
    println!();
    println!("Found {} compendium file(s)", result.total_files());
    for file in &result.files {
        println!("  {}", file.display());
    }

    Ok(())
}

fn cmd_parse(file: &Path) -> compendium_core::Result<()> {
    let compendium = decode_file(file)?;

    println!("File: {}", file.display());
    println!();
    for category in Category::ALL {
        println!("{:>12}: {}", category.display_name(), compendium.count(category));
    }
    println!();
    println!("Total entries: {}", compendium.len());

    Ok(())
}

fn cmd_show(
    file: &Path,
    category: &str,
    limit: Option<usize>,
    detail: bool,
) -> compendium_core::Result<()> {
    let category = parse_category(category);
    let compendium = decode_file(file)?;

    let names = compendium.names(category);
    println!("{} ({} entries)", category.display_name(), names.len());
    println!("{}", "-".repeat(40));

    let shown = limit.unwrap_or(names.len()).min(names.len());
    for (i, name) in names.iter().take(shown).enumerate() {
        println!("{}", name);
        if detail {
            if let Some(text) = compendium.entry_text(category, i) {
                if !text.is_empty() {
                    println!("{}", text);
                    println!();
                }
            }
        }
    }

    if names.len() > shown {
        println!("... ({} more entries)", names.len() - shown);
    }

    Ok(())
}

fn cmd_merge(
    base: &Path,
    files: &[PathBuf],
    roots: &[PathBuf],
    policy: &str,
    output: &Path,
) -> compendium_core::Result<()> {
    let policy = parse_policy(policy);
    let mut live = decode_file(base)?;

    let mut incoming_files: Vec<PathBuf> = files.to_vec();
    if !roots.is_empty() {
        incoming_files.extend(scan_roots(roots)?.files);
    }

    if incoming_files.is_empty() {
        eprintln!("Nothing to merge: pass --file or --root");
        std::process::exit(1);
    }

    for path in &incoming_files {
        let incoming = decode_file(path)?;
        println!("Applying {} ({} entries)", path.display(), incoming.len());
        reconcile(&mut live, incoming, policy);
    }

    fs::write(output, encode(&live))?;
    println!("Wrote {} entries to {}", live.len(), output.display());

    Ok(())
}

fn cmd_export(file: &Path, format: &str, output: &Path) -> compendium_core::Result<()> {
    let compendium = decode_file(file)?;

    let content = match format.to_lowercase().as_str() {
        "xml" => encode(&compendium),
        "json" => {
            let mut json = serde_json::to_string_pretty(&compendium)?;
            json.push('\n');
            json
        }
        _ => {
            eprintln!("Unknown format: {}. Supported formats: xml, json", format);
            std::process::exit(1);
        }
    };

    fs::write(output, content)?;
    println!("Exported {} entries to {}", compendium.len(), output.display());

    Ok(())
}

fn cmd_add(file: &Path, entry_path: &Path, output: &Path) -> compendium_core::Result<()> {
    let mut compendium = decode_file(file)?;

    let entry_json =
        fs::read_to_string(entry_path).map_err(|e| compendium_core::Error::FileRead {
            path: entry_path.to_path_buf(),
            source: e,
        })?;
    let entry: Entry = serde_json::from_str(&entry_json)?;

    let name = entry.name().to_string();
    let category = entry.category();
    compendium.add(entry)?;

    fs::write(output, encode(&compendium))?;
    println!("Added '{}' to {}; wrote {}", name, category, output.display());

    Ok(())
}

fn cmd_delete(
    file: &Path,
    category: &str,
    name: &str,
    output: &Path,
) -> compendium_core::Result<()> {
    let category = parse_category(category);
    let mut compendium = decode_file(file)?;

    if compendium.remove(category, name) {
        println!("Deleted '{}' from {}", name, category);
    } else {
        println!("No entry named '{}' in {}; output is unchanged", name, category);
    }

    fs::write(output, encode(&compendium))?;
    println!("Wrote {} entries to {}", compendium.len(), output.display());

    Ok(())
}
