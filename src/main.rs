use drawbatch::{
    config::{default_downloads_dir, draw_things_models_dir, parse_var},
    logger::{self, LoggerConfig},
    BatchReport, BatchRunner, DescriptionGenerator, ImageClient, InteractiveNotifier,
    LogNotifier, OperatorNotifier, Pipeline, PipelineConfig, PipelineItem, PromptSource,
    ServiceClients,
};
use std::{env, io, path::PathBuf};

const DEFAULT_PROMPT: &str = "Generate an Image of a dog.";
const DEFAULT_SEED_COUNT: usize = 99;

fn default_prompts() -> Vec<String> {
    vec![
        "Flat color illustration of a lighthouse keeper feeding seagulls at dawn, warm palette".to_string(),
        "Cartoon of a small fox reading a map in a dense autumn forest, long shadows, uneasy mood".to_string(),
        "A giant house built from colourful toy bricks in the rain, whimsical, soft light".to_string(),
    ]
}

/// Which prompt source and preset the binary runs with.
enum FrontEnd {
    Chained { prompts: Vec<String> },
    Numbered { dir: PathBuf, prompt: String, count: usize },
    Slides { pptx: PathBuf, seed_dir: PathBuf },
}

impl FrontEnd {
    fn from_env() -> drawbatch::Result<Self> {
        let mode = env::var("DRAWTHINGS_MODE").unwrap_or_else(|_| "chained".to_string());
        let seed_dir = env::var("DRAWTHINGS_SEED_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_downloads_dir());

        match mode.trim().to_ascii_lowercase().as_str() {
            "chained" => {
                let prompts = env::var("DRAWTHINGS_PROMPTS")
                    .map(|raw| {
                        raw.split('|')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(String::from)
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_else(|_| default_prompts());
                Ok(FrontEnd::Chained { prompts })
            }
            "numbered" => Ok(FrontEnd::Numbered {
                dir: seed_dir,
                prompt: env::var("DRAWTHINGS_PROMPT").unwrap_or_else(|_| DEFAULT_PROMPT.to_string()),
                count: parse_var("DRAWTHINGS_COUNT", env::var("DRAWTHINGS_COUNT").ok())?
                    .unwrap_or(DEFAULT_SEED_COUNT),
            }),
            "slides" => Ok(FrontEnd::Slides {
                pptx: env::var("DRAWTHINGS_PPTX")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| seed_dir.join("powerpoint.pptx")),
                seed_dir,
            }),
            other => Err(drawbatch::BatchError::ConfigError(format!(
                "unknown DRAWTHINGS_MODE '{}', expected chained, numbered or slides",
                other
            ))),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FrontEnd::Chained { .. } => "chained",
            FrontEnd::Numbered { .. } => "numbered",
            FrontEnd::Slides { .. } => "slides",
        }
    }

    fn preset(&self) -> PipelineConfig {
        match self {
            FrontEnd::Chained { .. } => PipelineConfig::chained(),
            FrontEnd::Numbered { .. } => PipelineConfig::numbered(),
            FrontEnd::Slides { .. } => PipelineConfig::slides(),
        }
    }

    fn source(&self) -> PromptSource {
        match self {
            FrontEnd::Chained { prompts } => PromptSource::fixed(prompts.clone()),
            FrontEnd::Numbered { dir, prompt, count } => {
                PromptSource::numbered(dir.clone(), prompt.clone(), *count)
            }
            FrontEnd::Slides { pptx, seed_dir } => {
                PromptSource::presentation(pptx.clone(), seed_dir.clone())
            }
        }
    }
}

async fn run_batch<N: OperatorNotifier>(
    pipeline: Pipeline<ImageClient>,
    notifier: N,
    describer: Option<Box<dyn DescriptionGenerator>>,
    items: Vec<PipelineItem>,
) -> BatchReport {
    let mut runner = BatchRunner::new(pipeline, notifier);
    if let Some(describer) = describer {
        runner = runner.with_describer(describer);
    }
    runner.run(items).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    let front_end = FrontEnd::from_env()?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), front_end.name());

    let config = front_end.preset().with_env_overrides()?;
    config.validate()?;
    logger::log_config_info(&config);

    let source = front_end.source();
    let items = match source.items() {
        Ok(items) => items,
        Err(e) => {
            log::error!("❌ Could not read prompts: {}", e);
            return Err(e.into());
        }
    };

    let clients = ServiceClients::new(&config)?;
    let describer: Option<Box<dyn DescriptionGenerator>> = if source.needs_description() {
        Some(Box::new(clients.text().clone()))
    } else {
        None
    };
    let pipeline = Pipeline::new(clients.image().clone(), config);

    let interactive = env::var("DRAWTHINGS_INTERACTIVE").map_or(false, |v| v == "true");
    let report = if interactive {
        let notifier = InteractiveNotifier::new(io::stdin().lock(), io::stdout(), draw_things_models_dir());
        run_batch(pipeline, notifier, describer, items).await
    } else {
        run_batch(pipeline, LogNotifier, describer, items).await
    };

    log::debug!(
        "Batch report: {}",
        serde_json::to_string_pretty(&report).unwrap_or_default()
    );
    if report.succeeded() == 0 && !report.outcomes.is_empty() {
        log::warn!("⚠️  No images were generated. Is Draw Things running with the HTTP API enabled?");
    }

    Ok(())
}
