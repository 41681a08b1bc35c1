use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use text_similarity::{fetch_source, Analysis, AppendOutcome, MarkerConfig, Pipeline, StopWords};
use tracing_subscriber::EnvFilter;

/// Accumulate plain-text documents and compare them with TF-IDF similarity
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory holding the corpus and label artifacts
    #[arg(long, global = true, env = "TEXT_SIMILARITY_STORE_DIR", default_value = ".")]
    store_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download a source text to a local file
    Fetch {
        url: String,
        file: PathBuf,
    },
    /// Normalize a file and add it to the corpus
    Add(AddArgs),
    /// Compare every stored document and print the 2-D map
    Analyze(AnalyzeArgs),
    /// Add a file, then analyze the corpus
    Run {
        #[command(flatten)]
        add: AddArgs,
        #[command(flatten)]
        analyze: AnalyzeArgs,
    },
    /// Documents most similar to the one at INDEX
    Similar {
        index: usize,
        #[arg(long, default_value_t = 5)]
        top: usize,
        #[arg(long, value_enum, default_value_t = StopWordsArg::None)]
        stop_words: StopWordsArg,
    },
    /// Print the stored titles
    List,
}

#[derive(Args, Debug)]
struct AddArgs {
    file: PathBuf,
    /// Label shown for this document
    #[arg(long)]
    title: String,
    /// Substring of the line just before the text (default "***")
    #[arg(long)]
    begin: Option<String>,
    /// Substring of the line just after the text (default "*** END OF")
    #[arg(long)]
    end: Option<String>,
}

impl AddArgs {
    fn markers(&self) -> MarkerConfig {
        MarkerConfig::new(self.begin.as_deref(), self.end.as_deref())
    }
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[arg(long, value_enum, default_value_t = StopWordsArg::None)]
    stop_words: StopWordsArg,
    /// Also write the scatter plot as SVG
    #[arg(long)]
    svg: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StopWordsArg {
    None,
    English,
}

impl From<StopWordsArg> for StopWords {
    fn from(arg: StopWordsArg) -> Self {
        match arg {
            StopWordsArg::None => StopWords::None,
            StopWordsArg::English => StopWords::English,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("text_similarity=info".parse()?))
        .init();

    let cli = Cli::parse();
    let pipeline = Pipeline::in_dir(&cli.store_dir);

    match cli.command {
        Commands::Fetch { url, file } => {
            let bytes = fetch_source(&url, &file).with_context(|| format!("fetching {url}"))?;
            println!("wrote {bytes} bytes to {}", file.display());
        }
        Commands::Add(args) => {
            let (_, outcome) = pipeline
                .add(&args.file, &args.title, &args.markers())
                .with_context(|| format!("adding {}", args.file.display()))?;
            report_outcome(&args.title, outcome);
        }
        Commands::Analyze(args) => {
            let analysis = pipeline.analyze(args.stop_words.into()).context("analyzing corpus")?;
            report_analysis(&analysis, args.svg)?;
        }
        Commands::Run { add, analyze } => {
            let (outcome, analysis) = pipeline
                .run(&add.file, &add.title, &add.markers(), analyze.stop_words.into())
                .with_context(|| format!("running analysis with {}", add.file.display()))?;
            report_outcome(&add.title, outcome);
            report_analysis(&analysis, analyze.svg)?;
        }
        Commands::Similar { index, top, stop_words } => {
            let analysis = pipeline.analyze(stop_words.into()).context("analyzing corpus")?;
            let hits = analysis.similarity.neighbours(index)?;
            println!("most similar to [{index}] {}:", analysis.store.label(index).unwrap_or_default());
            for (doc, score) in hits.top(top) {
                println!("{score:>8.4}  [{doc}] {}", analysis.store.label(*doc).unwrap_or_default());
            }
        }
        Commands::List => {
            let store = pipeline.load().context("loading corpus")?;
            for (idx, label, text) in store.iter() {
                println!("{idx:>4}  {label}  ({} chars)", text.chars().count());
            }
        }
    }
    Ok(())
}

fn report_outcome(title: &str, outcome: AppendOutcome) {
    match outcome {
        AppendOutcome::Inserted { index } => println!("added {title:?} as document {index}"),
        AppendOutcome::Duplicate { index } => println!("{title:?} is already stored as document {index}"),
    }
}

fn report_analysis(analysis: &Analysis, svg: Option<PathBuf>) -> Result<()> {
    let plot = analysis.plot()?;
    print!("{}", plot.render_table());
    if let Some(path) = svg {
        plot.write_svg(&path).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
