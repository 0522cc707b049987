use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pdf_fields::{
    ConfirmTemplate, ConfirmTextEntry, ConsistencyReport, EngineOptions, MatchStatus,
    SessionContext, SigningSession, Template, TemplateRecord, Verdict, VerifiedIdentity,
    load_document_info,
};
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthChar;

mod logger;

#[derive(Parser)]
#[command(name = "pdfsign", about = "PDF signing field tools", version)]
struct Cli {
    /// Log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page information of a PDF
    Inspect {
        /// Input PDF file
        pdf: PathBuf,

        /// Template record to check against the PDF's pages
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Report completion and cross-document consistency of templates
    Check {
        /// Template record files, in any order
        #[arg(required = true, num_args = 1..)]
        templates: Vec<PathBuf>,

        /// Name of the signer the templates were sent to
        #[arg(long)]
        signer: Option<String>,

        /// Name confirmed by identity verification
        #[arg(long)]
        verified_name: Option<String>,

        /// Verified birth date (YYYYMMDD)
        #[arg(long, requires = "verified_name")]
        birth_date: Option<String>,

        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Approve and seal the session if every check passes
        #[arg(long)]
        finalize: bool,

        /// Approve despite consistency conflicts
        #[arg(long, requires = "finalize")]
        allow_override: bool,
    },

    /// Render a confirm-text template and check typed input against it
    ConfirmText {
        /// Template text, e.g. "I am the {buyer/seller}"
        template: String,

        /// Choice per option group as GROUP=CHOICE (zero-based)
        #[arg(short, long, value_parser = parse_selection)]
        select: Vec<(usize, usize)>,

        /// Text typed by the signer
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Write the default engine configuration
    InitConfig {
        /// Output JSON file
        output: PathBuf,
    },
}

fn parse_selection(raw: &str) -> Result<(usize, usize), String> {
    let (group, choice) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected GROUP=CHOICE, got {raw:?}"))?;
    let group = group.trim().parse().map_err(|e| format!("bad group: {e}"))?;
    let choice = choice.trim().parse().map_err(|e| format!("bad choice: {e}"))?;
    Ok((group, choice))
}

/// Terminal columns taken by the first `chars` characters of `text`
fn display_column(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(|c| c.width().unwrap_or(0)).sum()
}

async fn load_template(path: &Path) -> Result<Template> {
    let record = TemplateRecord::load(path)
        .await
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    Ok(Template::try_from(record)?)
}

fn print_report(report: &ConsistencyReport) {
    if report.classes.is_empty() {
        println!("  No classified fields");
    }
    for class_report in &report.classes {
        let label = class_report.class.label();
        match &class_report.verdict {
            Verdict::Consistent { value, occurrences } => {
                println!("  {}: consistent ({:?} in {} field(s))", label, value, occurrences.len());
            }
            Verdict::Inconsistent { groups } => {
                println!("  {}: {} different values", label, groups.len());
                for group in groups {
                    println!("    {:?}", group.normalized);
                    for o in &group.occurrences {
                        println!(
                            "      {} page {} {}: {:?}",
                            o.template_name, o.page, o.field, o.value
                        );
                    }
                }
            }
        }
    }
    for mismatch in &report.identity_mismatches {
        let o = &mismatch.occurrence;
        println!(
            "  {} differs from verified identity: {} page {} {}: {:?}",
            mismatch.class.label(),
            o.template_name,
            o.page,
            o.field,
            o.value
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::StderrLogger::new(cli.verbose).init()?;

    match cli.command {
        Commands::Inspect { pdf, template } => {
            let info = load_document_info(&pdf).await?;
            println!("{}: {} page(s)", pdf.display(), info.page_count);
            for (i, size) in info.page_sizes.iter().enumerate() {
                match size {
                    Some(size) => println!("  Page {}: {} x {} pt", i + 1, size.width, size.height),
                    None => println!("  Page {}: inherited size", i + 1),
                }
            }

            if let Some(path) = template {
                let template = load_template(&path).await?;
                template.fields.check_pages(info.page_count)?;
                println!("Template {:?}: {} field(s)", template.name, template.fields.len());
                for page in template.fields.pages() {
                    println!("  Page {}:", page);
                    for field in template.fields.fields_on_page(page) {
                        let r = field.rect;
                        println!(
                            "    {} {:<12} x={:.4} y={:.4} w={:.4} h={:.4}{}",
                            field.id,
                            field.field_type().name(),
                            r.x,
                            r.y,
                            r.width,
                            r.height,
                            if field.is_filled() { " (filled)" } else { "" }
                        );
                    }
                }
            }
        }

        Commands::Check {
            templates: paths,
            signer,
            verified_name,
            birth_date,
            config,
            finalize,
            allow_override,
        } => {
            let options = match config {
                Some(path) => EngineOptions::load(&path).await?,
                None => EngineOptions::default(),
            };

            let mut templates = Vec::with_capacity(paths.len());
            for path in &paths {
                templates.push(load_template(path).await?);
            }

            let expected = signer.or_else(|| verified_name.clone()).unwrap_or_default();
            let mut session = SigningSession::new(SessionContext::new(expected), options, templates);
            if let Some(name) = verified_name {
                let identity = VerifiedIdentity::new(name, birth_date.unwrap_or_default());
                session.apply_authentication(Ok(identity))?;
            }

            println!("Templates:");
            for p in session.progress() {
                println!(
                    "  {}. {} {}/{} filled{}",
                    p.index + 1,
                    p.name,
                    p.filled,
                    p.total,
                    if p.complete { "" } else { " (incomplete)" }
                );
            }

            if !session.sequencer().all_complete() {
                println!("Consistency check skipped until every template is complete");
                if finalize {
                    bail!("Cannot finalize: templates are incomplete");
                }
                return Ok(());
            }

            println!("Consistency:");
            if finalize {
                let report = session.finalize(true, allow_override)?;
                print_report(&report);
                println!("Session sealed");
            } else {
                print_report(&session.validate()?);
            }
        }

        Commands::ConfirmText {
            template,
            select,
            input,
        } => {
            let mut entry = ConfirmTextEntry::new(ConfirmTemplate::parse(&template));
            for (group, choice) in select {
                entry.select(group, choice)?;
            }

            for (i, group) in entry.template().groups().iter().enumerate() {
                println!("Group {}: {} -> {:?}", i, group.choices.join(" / "), group.selected_choice());
            }
            let expected = entry.template().render();
            println!("Expected: {}", expected);

            if let Some(input) = input {
                let verification = entry.set_input(input);
                if let MatchStatus::Mismatch { position } = verification.status {
                    let column = display_column(&expected, position);
                    println!("          {}^", " ".repeat(column));
                }
                let value = entry.submit()?;
                println!("Accepted: {}", value);
            }
        }

        Commands::InitConfig { output } => {
            EngineOptions::default().save(&output).await?;
            println!("Wrote default configuration → {}", output.display());
        }
    }

    Ok(())
}
