use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use discharge_letter_lib::config::{self, AppConfig};
use discharge_letter_lib::models::PatientRecord;
use discharge_letter_lib::pipeline::audit::AuditLog;
use discharge_letter_lib::pipeline::extraction::{load_instruction_text, PdfTextExtractor};
use discharge_letter_lib::pipeline::generation::OpenAiClient;
use discharge_letter_lib::pipeline::prompt::{instruction_guidance, PiiMode};
use discharge_letter_lib::pipeline::records::RecordStore;
use discharge_letter_lib::pipeline::summarizer::{AuditStatus, DischargeSummarizer, SummaryError};

#[derive(Parser)]
#[command(name = "discharge-letter")]
#[command(version, about = "Draft hospital discharge letters from patient records")]
struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded patients
    List,
    /// Show a patient's demographic summary
    Show {
        #[command(flatten)]
        patient: PatientSelector,
    },
    /// Generate a discharge letter
    Generate {
        #[command(flatten)]
        patient: PatientSelector,
        /// Strip name, age, gender and patient id before sending
        #[arg(long)]
        without_pii: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PatientSelector {
    /// Patient name (first match wins when names repeat)
    #[arg(long)]
    name: Option<String>,
    /// Patient identifier
    #[arg(long)]
    id: Option<String>,
}

impl PatientSelector {
    fn find<'a>(&self, store: &'a RecordStore) -> Option<&'a PatientRecord> {
        match (&self.id, &self.name) {
            (Some(id), _) => store.find_by_id(id),
            (None, Some(name)) => store.find_by_name(name),
            (None, None) => None,
        }
    }
}

fn main() -> ExitCode {
    discharge_letter_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let store = RecordStore::load(&config.patient_sources)?;

    match cli.command {
        Commands::List => {
            if store.is_empty() {
                println!("No patients loaded.");
            }
            for listing in store.listings() {
                println!("{listing}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show { patient } => {
            let Some(record) = patient.find(&store) else {
                println!("Patient not found.");
                return Ok(ExitCode::FAILURE);
            };
            println!("Patient Information:");
            print!("{}", record.info());
            if !record.is_discharge_ready() {
                println!("This patient is not safe to discharge!");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate {
            patient,
            without_pii,
        } => {
            // Ingest everything up front so a bad input stops us before any request.
            let instructions =
                load_instruction_text(&config.instruction_document, &PdfTextExtractor)?;
            let api_key = config::load_api_key(&config.credentials_path)?;

            let Some(record) = patient.find(&store) else {
                println!("Patient not found.");
                return Ok(ExitCode::FAILURE);
            };

            let client = OpenAiClient::from_config(&config, api_key)?;
            let summarizer = DischargeSummarizer::new(
                Arc::new(client),
                &config.model,
                Arc::new(AuditLog::new(&config.audit_log_path)),
            );

            let mode = if without_pii {
                PiiMode::Without
            } else {
                PiiMode::With
            };

            match summarizer.generate(record, &instruction_guidance(&instructions), mode) {
                Ok(outcome) => {
                    println!("Generated Summary:\n");
                    println!("{}", outcome.summary);
                    if let AuditStatus::Failed(reason) = outcome.audit {
                        eprintln!("warning: summary was not written to the audit log: {reason}");
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(SummaryError::NotDischargeReady) => {
                    println!("This patient is not safe to discharge!");
                    Ok(ExitCode::FAILURE)
                }
                Err(SummaryError::Generation(e)) => {
                    eprintln!("Summary unavailable: {e}");
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
