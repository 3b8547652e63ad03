mod error;
mod prepare;
mod session;
mod transport;


use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use workflow::mode::DEFAULT_SUBJECT;
use workflow::{AnalysisClient, AnalysisMode, Deadlines, Endpoints, ProbeOutcome};

use crate::error::CliError;
use crate::transport::ReqwestTransport;

#[derive(Parser, Debug)]
#[command(name = "snap", about = "Snap & Analyze tutoring API CLI")]
struct Cli {
    #[arg(long, env = "SNAP_BASE_URL", default_value = "http://127.0.0.1:5000")]
    base_url: String,

    /// Session cookie, either `name=value` or a bare session token.
    #[arg(long, env = "SNAP_SESSION_COOKIE")]
    session_cookie: Option<String>,

    /// Analyze deadline in seconds for explanation-only requests.
    #[arg(long, env = "SNAP_QUESTION_TIMEOUT")]
    question_timeout: Option<u64>,

    /// Analyze deadline in seconds for answer-feedback requests.
    #[arg(long, env = "SNAP_ANSWER_TIMEOUT")]
    answer_timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the AI service is reachable.
    Status,
    /// Show the current AI consent state.
    Consent,
    /// Analyze an image of a question or worked answer.
    Analyze {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ModeArg::AnswerFeedback)]
        mode: ModeArg,
        #[arg(long, default_value = DEFAULT_SUBJECT)]
        subject: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    #[value(alias = "question-only")]
    ExplanationOnly,
    AnswerFeedback,
}

impl From<ModeArg> for AnalysisMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::ExplanationOnly => Self::ExplanationOnly,
            ModeArg::AnswerFeedback => Self::AnswerFeedback,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();
    let cli = Cli::parse();

    let transport = ReqwestTransport::new(&cli.base_url, cli.session_cookie.as_deref())?;
    let client = AnalysisClient::new(transport.clone(), Endpoints::default())
        .with_deadlines(deadlines(cli.question_timeout, cli.answer_timeout));

    match cli.command {
        Command::Status => run_status(&client).await,
        Command::Consent => run_consent(&client).await,
        Command::Analyze {
            file,
            mode,
            subject,
        } => run_analyze(&client, &transport, file, mode.into(), &subject).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn deadlines(question_timeout: Option<u64>, answer_timeout: Option<u64>) -> Deadlines {
    let defaults = Deadlines::default();
    Deadlines {
        explanation_only: question_timeout
            .filter(|secs| *secs > 0)
            .map_or(defaults.explanation_only, Duration::from_secs),
        answer_feedback: answer_timeout
            .filter(|secs| *secs > 0)
            .map_or(defaults.answer_feedback, Duration::from_secs),
    }
}

async fn run_status(client: &AnalysisClient<ReqwestTransport>) -> Result<(), CliError> {
    let value = match client.probe_service().await {
        ProbeOutcome::Available => json!({ "available": true }),
        ProbeOutcome::Unavailable { details } => {
            tracing::warn!(details = details.as_deref().unwrap_or("none"), "AI service unavailable");
            json!({ "available": false, "details": details })
        }
    };
    print_json(&value)
}

async fn run_consent(client: &AnalysisClient<ReqwestTransport>) -> Result<(), CliError> {
    let state = client.check_consent_within(tokio::time::sleep).await?;
    print_json(&json!({
        "granted": state.granted,
        "reason": state.reason,
    }))
}

async fn run_analyze(
    client: &AnalysisClient<ReqwestTransport>,
    transport: &ReqwestTransport,
    file: PathBuf,
    mode: AnalysisMode,
    subject: &str,
) -> Result<(), CliError> {
    let image = prepare::load_upload(&file)?;
    let view = match session::analyze_image(client, mode, subject, image, tokio::time::sleep).await {
        Ok(view) => view,
        Err(CliError::AuthRequired { login_url }) => {
            return Err(CliError::AuthRequired {
                login_url: transport.url(&login_url),
            });
        }
        Err(error) => return Err(error),
    };

    tracing::info!(mode = mode.display_name(), subject = %view.subject, "analysis complete");
    print_json(&json!({
        "mode": mode.as_str(),
        "subject": view.subject,
        "score": view.score_badge,
        "explanation": view.explanation_html,
        "feedback": view.feedback_html,
        "tips": view.tips_html,
    }))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
