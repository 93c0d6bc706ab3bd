use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use solvency::api::{ApiClient, ApiError};
use solvency::badge::badge_for;
use solvency::config::{ConfigError, PortalConfig, normalize_base_url};
use solvency::directory;
use solvency::login::{LoginError, LoginFlow, LoginRequest};
use solvency::model::{
    AuditTransaction, NewSubmission, ReviewDecision, ReviewRequest, Role, Submission, SubmissionRecord, User,
};
use solvency::session::{FileSessionStore, MemorySessionStore, SessionContext, StorageError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Login(#[from] LoginError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("no insurer session; run `solvency-cli login --role insurer` first")]
    NotSignedIn,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "solvency-cli", about = "Insurance solvency portal CLI")]
struct Cli {
    #[arg(long, env = "SOLVENCY_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "SOLVENCY_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Print raw JSON instead of formatted output.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Log at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend is reachable.
    Ping,
    /// Sign in as an insurer, regulator or admin.
    Login(LoginArgs),
    /// Show the persisted session.
    Whoami,
    /// Clear the persisted session.
    Logout,
    Submissions(SubmissionsCommand),
    /// Latest compliance snapshot.
    Status,
    /// Submission history of the signed-in insurer.
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Recompute a submission's fingerprints.
    Verify {
        #[arg(long)]
        id: String,
    },
    /// Audit log of submissions and regulator decisions.
    Audit,
    /// Regulator review; signs in as the regulator for this invocation only.
    Review(ReviewCommand),
    /// List the predefined dev accounts.
    Directory {
        #[arg(long)]
        role: Option<Role>,
    },
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long, default_value = "insurer")]
    role: Role,

    #[arg(long)]
    email: String,

    #[arg(long, env = "SOLVENCY_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct SubmissionsCommand {
    #[command(subcommand)]
    command: SubmissionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SubmissionsSubcommand {
    List,
    Create {
        #[arg(long)]
        capital: f64,
        #[arg(long)]
        liabilities: f64,
        /// Reporting date, `YYYY-MM-DD`.
        #[arg(long)]
        date: String,
    },
}

#[derive(Args, Debug)]
struct ReviewCommand {
    #[arg(long, env = "SOLVENCY_REGULATOR_EMAIL")]
    email: String,

    #[arg(long, env = "SOLVENCY_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: ReviewSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReviewSubcommand {
    /// Submissions awaiting a decision.
    Pending,
    Approve {
        #[arg(long)]
        id: String,
        #[arg(long)]
        comment: Option<String>,
    },
    Reject {
        #[arg(long)]
        id: String,
        #[arg(long)]
        comment: Option<String>,
    },
}

struct CliContext {
    config: PortalConfig,
    api: ApiClient,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = PortalConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = normalize_base_url(url)?;
    }
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }
    let ctx = CliContext { api: ApiClient::new(config.api_base_url.clone()), config, json: cli.json };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Login(args) => run_login(&ctx, args).await,
        Command::Whoami => run_whoami(&ctx),
        Command::Logout => run_logout(&ctx),
        Command::Submissions(cmd) => run_submissions(&ctx, cmd).await,
        Command::Status => run_status(&ctx).await,
        Command::History { limit } => run_history(&ctx, limit).await,
        Command::Verify { id } => run_verify(&ctx, &id).await,
        Command::Audit => run_audit(&ctx).await,
        Command::Review(cmd) => run_review(&ctx, cmd).await,
        Command::Directory { role } => run_directory(&ctx, role),
    }
}

fn session_context(ctx: &CliContext) -> Result<SessionContext, CliError> {
    let store = Arc::new(FileSessionStore::new(ctx.config.session_file.clone()));
    Ok(SessionContext::restore(store)?)
}

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    ctx.api.health().await?;
    println!("ok");
    Ok(())
}

async fn run_login(ctx: &CliContext, args: LoginArgs) -> Result<(), CliError> {
    let mut session = session_context(ctx)?;
    let flow = LoginFlow::from_config(&ctx.config);
    let request = LoginRequest::new(args.email, args.password, args.role);

    let outcome = flow.submit(&request, &mut session).await?;
    if ctx.json {
        print_json(&serde_json::json!({
            "user": outcome.session.user,
            "role": outcome.session.role,
            "destination": outcome.destination.path(),
        }))?;
    } else {
        println!(
            "signed in as {} ({}) -> {}",
            outcome.session.user.username,
            outcome.session.label(),
            outcome.destination.path()
        );
    }
    Ok(())
}

fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let session = session_context(ctx)?;
    let Some(current) = session.current() else {
        println!("not signed in");
        return Ok(());
    };
    if ctx.json {
        print_json(&serde_json::to_value(&current.user)?)?;
    } else {
        print_user(&current.user);
    }
    Ok(())
}

fn run_logout(ctx: &CliContext) -> Result<(), CliError> {
    let mut session = session_context(ctx)?;
    session.sign_out()?;
    println!("signed out");
    Ok(())
}

async fn run_submissions(ctx: &CliContext, cmd: SubmissionsCommand) -> Result<(), CliError> {
    match cmd.command {
        SubmissionsSubcommand::List => {
            let submissions = ctx.api.get_submissions().await?;
            if ctx.json {
                print_json(&serde_json::to_value(&submissions)?)?;
            } else if submissions.is_empty() {
                println!("no submissions");
            } else {
                for submission in &submissions {
                    print_submission(submission);
                }
            }
            Ok(())
        }
        SubmissionsSubcommand::Create { capital, liabilities, date } => {
            let session = session_context(ctx)?;
            let insurer = session
                .current()
                .filter(|s| s.role == Role::Insurer)
                .ok_or(CliError::NotSignedIn)?;

            let mut payload = NewSubmission::new(capital, liabilities, date);
            payload.insurer_id = Some(insurer.user.id.clone());
            let created = ctx.api.create_submission(&payload).await?;
            if ctx.json {
                print_json(&serde_json::to_value(&created)?)?;
            } else {
                print_submission(&created);
            }
            Ok(())
        }
    }
}

async fn run_status(ctx: &CliContext) -> Result<(), CliError> {
    let snapshot = ctx.api.compliance_status().await?;
    if ctx.json {
        print_json(&serde_json::to_value(&snapshot)?)?;
    } else {
        println!(
            "{}  ratio {:.2}%  capital {:.2}  liabilities {:.2}  checked {}",
            badge_for(snapshot.status).paint(),
            snapshot.solvency_ratio,
            snapshot.capital,
            snapshot.liabilities,
            snapshot.last_check
        );
    }
    Ok(())
}

async fn run_history(ctx: &CliContext, limit: Option<usize>) -> Result<(), CliError> {
    let session = session_context(ctx)?;
    let insurer = session
        .current()
        .filter(|s| s.role == Role::Insurer)
        .ok_or(CliError::NotSignedIn)?;

    let records = ctx.api.submission_history(&insurer.user.id, limit).await?;
    print_records(ctx, &records)
}

async fn run_verify(ctx: &CliContext, id: &str) -> Result<(), CliError> {
    let report = ctx.api.verify_submission(id).await?;
    if ctx.json {
        print_json(&serde_json::to_value(&report)?)?;
    } else {
        let verdict = if report.is_verified() { "intact" } else { "TAMPERED" };
        println!("{}  {verdict}", report.submission_id);
        println!("  stored     {}", report.stored_hash);
        println!("  recomputed {}", report.recomputed_hash);
        if let Some(approval) = report.approval_intact {
            println!("  review fingerprint {}", if approval { "intact" } else { "TAMPERED" });
        }
    }
    Ok(())
}

async fn run_audit(ctx: &CliContext) -> Result<(), CliError> {
    let log = ctx.api.audit_transactions().await?;
    if ctx.json {
        print_json(&serde_json::to_value(&log)?)?;
    } else if log.is_empty() {
        println!("no transactions");
    } else {
        for tx in &log {
            print_transaction(tx);
        }
    }
    Ok(())
}

async fn run_review(ctx: &CliContext, cmd: ReviewCommand) -> Result<(), CliError> {
    // Regulator sessions are never persisted; sign in against a throwaway
    // store so the stored insurer session is left alone.
    let mut session = SessionContext::new(Arc::new(MemorySessionStore::new()));
    let flow = LoginFlow::from_config(&ctx.config);
    let outcome = flow
        .submit(&LoginRequest::new(cmd.email, cmd.password, Role::Regulator), &mut session)
        .await?;
    let regulator_id = outcome.session.user.id;

    let (decision, id, comment) = match cmd.command {
        ReviewSubcommand::Pending => {
            let records = ctx.api.pending_submissions().await?;
            return print_records(ctx, &records);
        }
        ReviewSubcommand::Approve { id, comment } => (ReviewDecision::Approve, id, comment),
        ReviewSubcommand::Reject { id, comment } => (ReviewDecision::Reject, id, comment),
    };

    let request = ReviewRequest { submission_id: id, regulator_id: Some(regulator_id), comments: comment };
    let record = match decision {
        ReviewDecision::Approve => ctx.api.approve_submission(&request).await?,
        ReviewDecision::Reject => ctx.api.reject_submission(&request).await?,
    };
    print_records(ctx, std::slice::from_ref(&record))
}

fn run_directory(ctx: &CliContext, role: Option<Role>) -> Result<(), CliError> {
    let users = match role {
        Some(role) => directory::find_by_role(role).into_iter().collect(),
        None => directory::mock_users(),
    };
    if ctx.json {
        print_json(&serde_json::to_value(&users)?)?;
    } else {
        for user in &users {
            print_user(user);
        }
    }
    Ok(())
}

fn print_user(user: &User) {
    let email = user.email.as_deref().unwrap_or("-");
    let business = user.business_name.as_deref().unwrap_or("-");
    println!("{:<10} {:<20} {:<24} {}", user.role, user.username, email, business);
}

fn print_submission(submission: &Submission) {
    let short_hash: String = submission.transaction_hash.chars().take(12).collect();
    println!(
        "{}  capital {:>16.2}  liabilities {:>16.2}  ratio {:>9.2}%  {}  {}",
        submission.date,
        submission.capital,
        submission.liabilities,
        submission.solvency_ratio,
        badge_for(submission.status).paint(),
        short_hash
    );
}

fn print_records(ctx: &CliContext, records: &[SubmissionRecord]) -> Result<(), CliError> {
    if ctx.json {
        return print_json(&serde_json::to_value(records)?);
    }
    if records.is_empty() {
        println!("no submissions");
    }
    for record in records {
        print_submission(&record.submission);
        let insurer = record.insurer_id.as_deref().unwrap_or("-");
        match &record.review {
            Some(review) => println!(
                "    id {}  insurer {insurer}  {}  by {}  {}",
                record.submission.id,
                record.review_state,
                review.regulator_id,
                review.comments.as_deref().unwrap_or("")
            ),
            None => println!("    id {}  insurer {insurer}  {}", record.submission.id, record.review_state),
        }
    }
    Ok(())
}

fn print_transaction(tx: &AuditTransaction) {
    let short_hash: String = tx.transaction_hash.chars().take(12).collect();
    println!(
        "{}  {:<10}  {:<18}  submission {}  ratio {:>9.2}%  {}",
        tx.timestamp,
        tx.kind.as_str(),
        tx.review_state.as_str(),
        tx.submission_id,
        tx.solvency_ratio,
        short_hash
    );
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
