use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use sikority::{
    Config,
    api::{Category, DynBackend, Rating, create_backend},
    clipboard::TerminalClipboard,
    generation::GenerationForm,
    library::ImageLibrary,
    render::{StatusView, TemplateEngine},
    session::Session,
    setup::SetupWizard,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Overrides `app.log_level` from the config file
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Overrides `api.base_url` from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse, rate and generate interactively (default if no command specified)
    Browse,

    /// Show whether the unclassified folder is configured
    Status,

    /// List images, excluding the deleted folder unless asked for
    List {
        /// unclassified, S, A, B, C, D or deleted
        #[arg(long)]
        category: Option<Category>,
    },

    /// Rate an image
    Classify { filename: String, rating: Rating },

    /// Move an image to the deleted folder, or remove it for good from there
    Delete {
        filename: String,
        /// Folder the image is in now
        #[arg(long, default_value = "unclassified")]
        category: Category,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Move an image out of the deleted folder
    Restore {
        filename: String,
        #[arg(short, long)]
        yes: bool,
    },

    /// Permanently remove everything in the deleted folder
    Purge {
        #[arg(short, long)]
        yes: bool,
    },

    /// List the models the backend can generate with
    Models,

    /// Generate an image from a prompt
    Generate {
        #[arg(short, long)]
        prompt: String,
        #[arg(long)]
        negative: Option<String>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long)]
        steps: Option<u32>,
        #[arg(long)]
        cfg_scale: Option<f32>,
        #[arg(long)]
        sampler: Option<String>,
        /// -1 lets the backend pick
        #[arg(long, allow_negative_numbers = true)]
        seed: Option<i64>,
        /// Model id; defaults to the first one the backend lists
        #[arg(long)]
        model: Option<String>,
    },

    /// Point the backend at the folder new images arrive in
    Setup { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    // Logs go to stderr so they never interleave with rendered views
    let log_level = cli.log_level.unwrap_or_else(|| config.app.log_level.clone());
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let backend = create_backend(&config.api)?;
    info!("Using {} at {}", backend.name(), config.api.base_url);

    match cli.command.unwrap_or(Commands::Browse) {
        Commands::Browse => browse(&config, backend).await,
        Commands::Status => status(&config, backend).await,
        Commands::List { category } => list(backend, category).await,
        Commands::Classify { filename, rating } => {
            let mut library = ImageLibrary::new(backend);
            library.classify(&filename, rating).await?;
            println!("{} rated {}", filename, rating);
            Ok(())
        }
        Commands::Delete {
            filename,
            category,
            yes,
        } => {
            let mut library = ImageLibrary::new(backend);
            library.request_delete(filename, category);
            confirm_pending(&mut library, yes).await
        }
        Commands::Restore { filename, yes } => {
            let mut library = ImageLibrary::new(backend);
            library.request_restore(filename);
            confirm_pending(&mut library, yes).await
        }
        Commands::Purge { yes } => {
            let mut library = ImageLibrary::new(backend);
            library.request_purge();
            confirm_pending(&mut library, yes).await
        }
        Commands::Models => models(&config, backend).await,
        Commands::Generate {
            prompt,
            negative,
            width,
            height,
            steps,
            cfg_scale,
            sampler,
            seed,
            model,
        } => {
            let mut form = GenerationForm::new(backend, &config.generation);
            if form.load_models().await.is_err() {
                info!("Generating without a model list");
            }
            if let Some(model) = model {
                form.select_model(&model)?;
            }

            let fields = [
                ("prompt", Some(prompt)),
                ("negative", negative),
                ("width", width.map(|v| v.to_string())),
                ("height", height.map(|v| v.to_string())),
                ("steps", steps.map(|v| v.to_string())),
                ("cfg", cfg_scale.map(|v| v.to_string())),
                ("sampler", sampler),
                ("seed", seed.map(|v| v.to_string())),
            ];
            for (field, value) in fields {
                if let Some(value) = value {
                    form.params.set(field, &value)?;
                }
            }

            let generated = form.submit().await?;
            println!("Generated {}", generated.filename);
            if let Some(url) = form.generated_image_url() {
                println!("{}", url);
            }
            Ok(())
        }
        Commands::Setup { path } => {
            let mut wizard = SetupWizard::new(backend);
            wizard.submit(&path).await?;
            if let Some(message) = wizard.message() {
                println!("{}", message);
            }
            Ok(())
        }
    }
}

async fn browse(config: &Config, backend: DynBackend) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(config, backend, Arc::new(TerminalClipboard::new()))?;
    session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}

async fn status(config: &Config, backend: DynBackend) -> Result<(), Box<dyn std::error::Error>> {
    let engine = TemplateEngine::new()?;
    let name = backend.name().to_string();
    let mut wizard = SetupWizard::new(backend);
    wizard.check_status().await;
    print!(
        "{}",
        engine.render(&StatusView::new(&config.app.name, &name, &wizard))?
    );
    Ok(())
}

async fn list(
    backend: DynBackend,
    category: Option<Category>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut library = ImageLibrary::new(backend);
    library.fetch_all().await?;
    library.set_filter(category);

    for record in library.visible() {
        println!(
            "{}\t{}\t{}",
            record.filename,
            record.category,
            library.image_url(record)
        );
    }
    Ok(())
}

async fn models(config: &Config, backend: DynBackend) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = GenerationForm::new(backend, &config.generation);
    form.load_models().await?;

    if form.models().is_empty() {
        println!("No models available");
    }
    for model in form.models() {
        let marker = if form.selected_model() == Some(model.id.as_str()) {
            "*"
        } else {
            " "
        };
        match &model.description {
            Some(description) => println!("{} {}\t{}\t{}", marker, model.id, model.name, description),
            None => println!("{} {}\t{}", marker, model.id, model.name),
        }
    }
    Ok(())
}

/// Asks on stdin before running a destructive action, unless `--yes` was given.
async fn confirm_pending(
    library: &mut ImageLibrary,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(pending) = library.pending() else {
        return Ok(());
    };

    if !yes {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{} [y/N] ", pending.prompt()).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut answer = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut answer)
            .await?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            library.cancel();
            println!("Cancelled");
            return Ok(());
        }
    }

    library.confirm().await?;
    println!("Done");
    Ok(())
}
