//! b3dkit CLI - Command-line tool for B3D scene and RES resource archives.
//!
//! This is the main entry point for the b3dkit command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use b3dkit::prelude::*;

/// b3dkit - split, prune and merge B3D scene and RES resource archives
#[derive(Parser)]
#[command(name = "b3dkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the node tree of a B3D archive as JSON
    B3dList {
        /// Path to the B3D file
        #[arg(short, long, env = "B3DKIT_B3D")]
        b3d: PathBuf,

        /// Print materials, roots, references and natural roots instead of the full tree
        #[arg(short, long)]
        summary: bool,
    },

    /// Extract roots from a B3D archive
    B3dExtract {
        /// Path to the B3D file
        #[arg(short, long, env = "B3DKIT_B3D")]
        b3d: PathBuf,

        /// Roots to extract; natural roots when none are given
        #[arg(short, long)]
        root: Vec<String>,

        /// Extract every root
        #[arg(long, conflicts_with = "root")]
        all: bool,

        /// Do not pull in referenced roots
        #[arg(long)]
        no_references: bool,

        /// Write one archive per selected root
        #[arg(long)]
        split: bool,

        /// Order of the object roots
        #[arg(long, value_enum, default_value_t = Order::Source)]
        order: Order,

        /// Keep the whole materials list
        #[arg(long)]
        keep_materials: bool,

        /// Output file (default: <stem>_extract.b3d)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Companion RES file; its materials used by each output are extracted alongside
        #[arg(long)]
        res: Option<PathBuf>,

        #[command(flatten)]
        sections: SectionArgs,
    },

    /// Remove roots from a B3D archive
    B3dRemove {
        /// Path to the B3D file
        #[arg(short, long, env = "B3DKIT_B3D")]
        b3d: PathBuf,

        /// Wildcard patterns of roots to remove
        #[arg(short, long, required = true)]
        pattern: Vec<String>,

        /// Order of the object roots
        #[arg(long, value_enum, default_value_t = Order::Source)]
        order: Order,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge the roots of one B3D archive into another
    B3dMerge {
        /// Archive merged into
        #[arg(short, long)]
        into: PathBuf,

        /// Archive whose roots are added
        #[arg(short, long)]
        from: PathBuf,

        /// Incoming roots replace existing ones with the same name
        #[arg(long)]
        replace: bool,

        /// Order of the object roots
        #[arg(long, value_enum, default_value_t = Order::Source)]
        order: Order,

        /// Output file (default: overwrite the into-file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the sections and records of a RES archive
    ResList {
        /// Path to the RES file
        #[arg(short, long, env = "B3DKIT_RES")]
        res: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract records from a RES archive
    ResExtract {
        /// Path to the RES file
        #[arg(short, long, env = "B3DKIT_RES")]
        res: PathBuf,

        #[command(flatten)]
        sections: SectionArgs,

        /// Output file (default: <stem>_extract.res)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove records from a RES archive
    ResRemove {
        /// Path to the RES file
        #[arg(short, long, env = "B3DKIT_RES")]
        res: PathBuf,

        /// Records to remove, as SECTION=PATTERN[,PATTERN...]
        #[arg(short, long, required = true)]
        pattern: Vec<String>,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge the records of one RES archive into another
    ResMerge {
        /// Archive merged into
        #[arg(short, long)]
        into: PathBuf,

        /// Archive whose records are added
        #[arg(short, long)]
        from: PathBuf,

        /// Incoming records replace existing ones with the same name
        #[arg(long)]
        replace: bool,

        /// Output file (default: overwrite the into-file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Source,
    Ascending,
    Descending,
}

impl From<Order> for RootOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Source => RootOrder::Source,
            Order::Ascending => RootOrder::Ascending,
            Order::Descending => RootOrder::Descending,
        }
    }
}

/// Per-section controls for RES extraction.
#[derive(Args)]
struct SectionArgs {
    /// Keep matching records, as SECTION=PATTERN[,PATTERN...]
    #[arg(short, long)]
    select: Vec<String>,

    /// Keep only the records the kept MATERIALS or SOUNDS refer to
    #[arg(long = "ref")]
    by_reference: Vec<String>,

    /// Write only these sections; the others are written empty
    #[arg(long)]
    only: Vec<String>,
}

impl SectionArgs {
    fn apply(&self, mut options: ResExtractOptions) -> Result<ResExtractOptions> {
        for arg in &self.select {
            let (kind, patterns) = parse_patterns(arg)?;
            options = options.select(kind, Selection::patterns(patterns)?);
        }
        for name in &self.by_reference {
            options = options.select(parse_section(name)?, Selection::Ref);
        }
        if !self.only.is_empty() {
            let only = self.only.iter().map(|name| parse_section(name)).collect::<Result<Vec<_>>>()?;
            options = options.only(only);
        }
        Ok(options)
    }
}

fn parse_section(name: &str) -> Result<SectionKind> {
    SectionKind::from_name(&name.to_uppercase())
        .with_context(|| format!("Unknown RES section: {name}"))
}

fn parse_patterns(arg: &str) -> Result<(SectionKind, Vec<&str>)> {
    let Some((section, patterns)) = arg.split_once('=') else {
        bail!("Expected SECTION=PATTERN[,PATTERN...], got {arg:?}");
    };
    Ok((parse_section(section)?, patterns.split(',').collect()))
}

/// `<stem><suffix>.<ext>` next to `path`.
fn sibling(path: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    path.with_file_name(format!("{stem}{suffix}.{ext}"))
}

fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        pretty_env_logger::init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::B3dList { b3d, summary } => {
            cmd_b3d_list(&b3d, summary)?;
        }
        Commands::B3dExtract {
            b3d,
            root,
            all,
            no_references,
            split,
            order,
            keep_materials,
            output,
            res,
            sections,
        } => {
            let roots = if all {
                RootSelection::All
            } else if root.is_empty() {
                RootSelection::Natural
            } else {
                RootSelection::Named(root)
            };
            let options = B3dExtractOptions {
                roots,
                follow_references: !no_references,
                split,
                order: order.into(),
                keep_materials,
            };
            cmd_b3d_extract(&b3d, &options, output, res.as_deref(), &sections)?;
        }
        Commands::B3dRemove { b3d, pattern, order, output } => {
            cmd_b3d_remove(&b3d, &pattern, order, output)?;
        }
        Commands::B3dMerge { into, from, replace, order, output } => {
            cmd_b3d_merge(&into, &from, replace, order, output)?;
        }
        Commands::ResList { res, json } => {
            cmd_res_list(&res, json)?;
        }
        Commands::ResExtract { res, sections, output } => {
            cmd_res_extract(&res, &sections, output)?;
        }
        Commands::ResRemove { res, pattern, output } => {
            cmd_res_remove(&res, &pattern, output)?;
        }
        Commands::ResMerge { into, from, replace, output } => {
            cmd_res_merge(&into, &from, replace, output)?;
        }
    }

    Ok(())
}

fn cmd_b3d_list(path: &Path, summary: bool) -> Result<()> {
    let archive = B3dArchive::open(path).context("Failed to open B3D archive")?;

    let json = if summary {
        serde_json::to_string_pretty(&Summary::new(&archive))?
    } else {
        let tree = archive.read_tree().context("Failed to read node tree")?;
        serde_json::to_string_pretty(&tree)?
    };
    println!("{json}");

    Ok(())
}

fn cmd_b3d_extract(
    path: &Path,
    options: &B3dExtractOptions,
    output: Option<PathBuf>,
    res: Option<&Path>,
    sections: &SectionArgs,
) -> Result<()> {
    let start = Instant::now();
    let archive = B3dArchive::open(path).context("Failed to open B3D archive")?;
    log::info!(
        "Loaded {} roots, {} materials in {:?}",
        archive.roots().len(),
        archive.materials().len(),
        start.elapsed()
    );

    let extracted = extract_b3d(&archive, options).context("Failed to extract roots")?;
    let output = output.unwrap_or_else(|| sibling(path, "_extract", "b3d"));

    let resources = res
        .map(|res| ResArchive::open(res).context("Failed to open RES archive"))
        .transpose()?;

    // Build everything before writing anything.
    let mut files: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    for item in extracted {
        let b3d_path = match &item.root {
            Some(root) if options.split => sibling(&output, &format!("_{root}"), "b3d"),
            _ => output.clone(),
        };
        if let Some(resources) = &resources {
            let res_options = sections.apply(
                ResExtractOptions::default()
                    .select(SectionKind::Materials, Selection::exact(&item.materials))
                    .select(SectionKind::TextureFiles, Selection::Ref)
                    .select(SectionKind::MaskFiles, Selection::Ref),
            )?;
            let companion = extract_res(resources, &res_options)
                .with_context(|| format!("Failed to extract resources for {}", b3d_path.display()))?;
            files.push((b3d_path.with_extension("res"), companion.data));
        }
        println!(
            "{}: {} spaces, {} roots, {} materials",
            b3d_path.display(),
            item.spaces.len(),
            item.roots.len(),
            item.materials.len()
        );
        files.push((b3d_path, item.data));
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    for (file, data) in &files {
        fs::write(file, data).with_context(|| format!("Failed to write {}", file.display()))?;
        pb.inc(1);
    }
    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());

    Ok(())
}

fn cmd_b3d_remove(path: &Path, patterns: &[String], order: Order, output: Option<PathBuf>) -> Result<()> {
    let archive = B3dArchive::open(path).context("Failed to open B3D archive")?;
    let options = B3dRemoveOptions {
        patterns: NameFilter::patterns(patterns)?,
        order: order.into(),
    };
    let removed = remove_b3d(&archive, &options).context("Failed to remove roots")?;

    let output = output.unwrap_or_else(|| path.to_path_buf());
    fs::write(&output, &removed.data).context("Failed to write output file")?;
    println!(
        "Removed {} roots, kept {}: {}",
        removed.removed.len(),
        removed.kept.len(),
        output.display()
    );

    Ok(())
}

fn cmd_b3d_merge(
    into: &Path,
    from: &Path,
    replace: bool,
    order: Order,
    output: Option<PathBuf>,
) -> Result<()> {
    let into_archive = B3dArchive::open(into).context("Failed to open into-archive")?;
    let from_archive = B3dArchive::open(from).context("Failed to open from-archive")?;
    let options = B3dMergeOptions {
        replace,
        order: order.into(),
    };
    let merged = merge_b3d(&into_archive, &from_archive, &options).context("Failed to merge archives")?;

    let output = output.unwrap_or_else(|| into.to_path_buf());
    fs::write(&output, &merged.data).context("Failed to write output file")?;
    println!(
        "Added {}, replaced {}, skipped {} roots; {} materials: {}",
        merged.added.len(),
        merged.replaced.len(),
        merged.skipped.len(),
        merged.materials.len(),
        output.display()
    );

    Ok(())
}

fn cmd_res_list(path: &Path, json: bool) -> Result<()> {
    let archive = ResArchive::open(path).context("Failed to open RES archive")?;

    if json {
        let sections: Vec<_> = archive.sections().collect();
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    for section in archive.sections() {
        println!("{} {}", section.kind, section.records.len());
        for record in &section.records {
            println!("    {}", record.name);
        }
    }

    Ok(())
}

fn cmd_res_extract(path: &Path, sections: &SectionArgs, output: Option<PathBuf>) -> Result<()> {
    let archive = ResArchive::open(path).context("Failed to open RES archive")?;
    let options = sections.apply(ResExtractOptions::default())?;
    let extracted = extract_res(&archive, &options).context("Failed to extract records")?;

    let output = output.unwrap_or_else(|| sibling(path, "_extract", "res"));
    fs::write(&output, &extracted.data).context("Failed to write output file")?;
    print_counts(&extracted);
    println!("Written: {}", output.display());

    Ok(())
}

fn cmd_res_remove(path: &Path, patterns: &[String], output: Option<PathBuf>) -> Result<()> {
    let archive = ResArchive::open(path).context("Failed to open RES archive")?;
    let mut options = ResRemoveOptions::default();
    for arg in patterns {
        let (kind, patterns) = parse_patterns(arg)?;
        options = options.with(kind, NameFilter::patterns(patterns)?);
    }
    let removed = remove_res(&archive, &options).context("Failed to remove records")?;

    let output = output.unwrap_or_else(|| path.to_path_buf());
    fs::write(&output, &removed.data).context("Failed to write output file")?;
    print_counts(&removed);
    println!("Written: {}", output.display());

    Ok(())
}

fn cmd_res_merge(into: &Path, from: &Path, replace: bool, output: Option<PathBuf>) -> Result<()> {
    let into_archive = ResArchive::open(into).context("Failed to open into-archive")?;
    let from_archive = ResArchive::open(from).context("Failed to open from-archive")?;
    let merged = merge_res(&into_archive, &from_archive, &ResMergeOptions { replace })
        .context("Failed to merge archives")?;

    let output = output.unwrap_or_else(|| into.to_path_buf());
    fs::write(&output, &merged.data).context("Failed to write output file")?;
    print_counts(&merged);
    println!("Written: {}", output.display());

    Ok(())
}

fn print_counts(output: &ResOutput) {
    for (kind, records) in &output.records {
        let dropped = output.dropped.get(kind).map_or(0, Vec::len);
        if records.is_empty() && dropped == 0 {
            continue;
        }
        println!("{:>14} {:>6} kept {:>6} dropped", kind.to_string(), records.len(), dropped);
    }
}
