//! arch subcommand - class structure analysis

use arch::{
    render_diagram, write_artifacts, Analysis, AnalyzerConfig, CommandRenderer, DiagramFormat,
    StructureAnalyzer,
};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ArchCommands {
    /// Write <output>.json and a class diagram description
    Diagram {
        /// Project path
        path: String,
        /// Output base name
        #[arg(short, long, default_value = "diagram")]
        output: String,
        /// Diagram format (plantuml, mermaid)
        #[arg(short, long, default_value = "plantuml")]
        format: DiagramFormat,
        /// Skip rendering the diagram to an image
        #[arg(long)]
        no_render: bool,
        /// Parse files on a single thread
        #[arg(long)]
        sequential: bool,
    },
    /// List classes and their relationships
    Classes {
        /// Project path
        path: String,
        /// JSON output
        #[arg(long)]
        json: bool,
        /// Parse files on a single thread
        #[arg(long)]
        sequential: bool,
    },
}

pub async fn run(cmd: ArchCommands) -> anyhow::Result<()> {
    match cmd {
        ArchCommands::Diagram { path, output, format, no_render, sequential } => {
            cmd_diagram(&path, &output, format, no_render, sequential).await
        }
        ArchCommands::Classes { path, json, sequential } => {
            cmd_classes(&path, json, sequential)
        }
    }
}

fn analyze(path: &str, sequential: bool) -> anyhow::Result<(StructureAnalyzer, Analysis)> {
    let mut config = AnalyzerConfig::from_env();
    if sequential {
        config.parallel = false;
    }
    let analyzer = StructureAnalyzer::new(config);
    let analysis = analyzer.analyze(Path::new(path))?;
    Ok((analyzer, analysis))
}

fn report_skipped(analysis: &Analysis) {
    if analysis.skipped.is_empty() {
        return;
    }
    eprintln!("\nWarning: {} files skipped:", analysis.skipped.len());
    for skipped in &analysis.skipped {
        eprintln!("  {}: {}", skipped.path.display(), skipped.reason);
    }
}

async fn cmd_diagram(
    path: &str,
    output: &str,
    format: DiagramFormat,
    no_render: bool,
    sequential: bool,
) -> anyhow::Result<()> {
    println!("Analyzing: {}", path);
    let (analyzer, analysis) = analyze(path, sequential)?;
    report_skipped(&analysis);

    let artifacts = write_artifacts(&analysis.model, Path::new(output), format);
    for result in [&artifacts.json, &artifacts.diagram] {
        match result {
            Ok(file) => println!("Saved to: {}", file.display()),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    if let (Ok(diagram), false) = (&artifacts.diagram, no_render) {
        let renderer = CommandRenderer::for_format(format, analyzer.config());
        if let Some(image) = render_diagram(&renderer, diagram).await {
            println!("Rendered: {}", image.display());
        }
    }

    if !artifacts.is_ok() {
        anyhow::bail!("Failed to write output files");
    }
    Ok(())
}

fn cmd_classes(path: &str, json: bool, sequential: bool) -> anyhow::Result<()> {
    let (_, analysis) = analyze(path, sequential)?;
    let root = PathBuf::from(path).canonicalize()?;
    let model = &analysis.model;

    if json {
        #[derive(serde::Serialize)]
        struct ClassItem<'a> {
            name: &'a str,
            package: &'a str,
            file: &'a str,
            line: u32,
            bases: &'a [String],
            composition: Vec<&'a str>,
            uses: Vec<&'a str>,
        }

        let items: Vec<_> = model.classes.values().map(|class| ClassItem {
            name: &class.name,
            package: &class.package,
            file: &class.file_path,
            line: class.line,
            bases: &class.base_classes,
            composition: class.composition.iter().map(String::as_str).collect(),
            uses: class.uses.iter().map(String::as_str).collect(),
        }).collect();

        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("\nFound {} classes:\n", model.classes.len());
        for class in model.classes.values() {
            let rel_path = Path::new(&class.file_path)
                .strip_prefix(&root)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| class.file_path.clone());
            let qualified = if class.package.is_empty() {
                class.name.clone()
            } else {
                format!("{}.{}", class.package, class.name)
            };
            println!("  {}  ({}:{})", qualified, rel_path, class.line);
            print_list("inherits", class.base_classes.iter());
            print_list("composes", class.composition.iter());
            print_list("uses", class.uses.iter());
            println!();
        }
    }

    report_skipped(&analysis);
    Ok(())
}

fn print_list<'a>(label: &str, items: impl Iterator<Item = &'a String>) {
    let items: Vec<&str> = items.map(String::as_str).collect();
    if !items.is_empty() {
        println!("    {}: {}", label, items.join(", "));
    }
}
