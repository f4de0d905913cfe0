use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use formpdf::config::FormConfig;
use formpdf::form::load_form;
use formpdf::generator::FormGenerator;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formpdf")]
#[command(about = "Lay out a JSON form description as a fillable PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    #[arg(env = "JSON_INPUT_PATH", default_value = "form.json", help = "Input JSON form")]
    input: PathBuf,
    #[arg(long, help = "JSON file overriding the default layout configuration")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Render the form to a PDF")]
    Render {
        #[command(flatten)]
        args: InputArgs,
        #[arg(
            short,
            long,
            env = "PDF_OUTPUT_PATH",
            default_value = "generated_form.pdf",
            help = "Output PDF file"
        )]
        output: PathBuf,
    },
    #[command(about = "Run the measurement pass and print the page count")]
    Pages {
        #[command(flatten)]
        args: InputArgs,
    },
    #[command(about = "Print the normalized field list")]
    Inspect {
        #[command(flatten)]
        args: InputArgs,
    },
}

fn load_config(path: Option<&Path>) -> Result<FormConfig> {
    match path {
        Some(path) => FormConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(FormConfig::default()),
    }
}

fn generator(args: &InputArgs) -> Result<FormGenerator> {
    let config = load_config(args.config.as_deref())?;
    let document = load_form(&args.input)
        .with_context(|| format!("loading form {}", args.input.display()))?;
    Ok(FormGenerator::new(document, config))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render { args, output } => {
            let document = generator(&args)?.generate_pdf(&output)?;
            let widgets: usize = document.fields.iter().map(|f| f.widget_count()).sum();
            println!(
                "Successfully generated {} ({} pages, {} fields, {} widgets)",
                output.display(),
                document.page_count(),
                document.fields.len(),
                widgets
            );
        }
        Commands::Pages { args } => {
            println!("{}", generator(&args)?.count_pages());
        }
        Commands::Inspect { args } => {
            let generator = generator(&args)?;
            let document = generator.document();
            println!("Title: {}", document.title);
            for (i, field) in document.fields.iter().enumerate() {
                println!("{:>3}. {:<12} {:<28} {}", i + 1, field.kind.as_str(), field.name, field.label);
                for option in field.option_list() {
                    println!("       - {} => {}", option.key, option.label);
                }
            }
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
