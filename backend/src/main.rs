//! Staffdir CLI - build the staff directory outputs
//!
//! # Main Commands
//!
//! ```bash
//! staffdir retrieve -c staffdir.properties -o persons.json
//! staffdir drupal -c staffdir.properties -i persons.json -o drupal.json
//! staffdir all-staff-list -c staffdir.properties -i persons.json -o AllStaffList.xlsx
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! staffdir memberships "Departmental_Groups:Libraries:Staff_Directory:FTE_50"
//! ```
//!
//! # Group Maintenance
//!
//! ```bash
//! staffdir grouper delete-members -c staffdir.properties \
//!     -g Departmental_Groups:Libraries:Employees:Libraries-Staff-Exempt -s 123456,234567
//! ```

use clap::{ArgAction, Parser, Subcommand};
use staffdir::{
    init_logging, pipeline, Config, DeleteMemberResults, ExcelOptions, GrouperConfig, LogConfig,
    MembershipInfo,
};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "staffdir")]
#[command(about = "Generate the staff directory JSON feed and All Staff List", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Prefix log lines with timestamps
    #[arg(long, global = true)]
    log_timestamps: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch sheets and directory data into a persons file
    Retrieve {
        /// Properties file
        #[arg(short, long)]
        config: PathBuf,

        /// Persons JSON file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate the CMS JSON feed from a persons file
    Drupal {
        /// Properties file
        #[arg(short, long)]
        config: PathBuf,

        /// Persons JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// JSON feed to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate the All Staff List spreadsheet from a persons file
    AllStaffList {
        /// Properties file
        #[arg(short, long)]
        config: PathBuf,

        /// Persons JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// xlsx file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Sheet protection password (overrides excel.password)
        #[arg(short, long)]
        password: Option<String>,

        /// Don't add an autofilter to the header row
        #[arg(long)]
        no_autofilter: bool,
    },

    /// Decode group membership strings and print the result
    Memberships {
        /// Membership strings, as found in memberOf
        #[arg(required = true)]
        memberships: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Grouper group maintenance
    Grouper {
        #[command(subcommand)]
        action: GrouperAction,
    },
}

#[derive(Subcommand)]
enum GrouperAction {
    /// Remove subjects from a group
    DeleteMembers {
        /// Properties file with grouper.url, grouper.user and grouper.password
        #[arg(short, long)]
        config: PathBuf,

        /// Fully qualified group name
        #[arg(short = 'g', long)]
        group_name: String,

        /// Subject ids (employee numbers), comma-separated or repeated
        #[arg(short = 's', long, value_delimiter = ',', num_args = 1.., required = true)]
        subject_ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_timestamps(cli.log_timestamps)
        .with_ansi(std::io::stderr().is_terminal());
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match cli.command {
        Commands::Retrieve { config, output } => cmd_retrieve(&config, &output).await,

        Commands::Drupal {
            config,
            input,
            output,
        } => cmd_drupal(&config, &input, &output).await,

        Commands::AllStaffList {
            config,
            input,
            output,
            password,
            no_autofilter,
        } => cmd_all_staff_list(&config, &input, &output, password, no_autofilter).await,

        Commands::Memberships {
            memberships,
            output,
        } => cmd_memberships(&memberships, output.as_deref()),

        Commands::Grouper {
            action:
                GrouperAction::DeleteMembers {
                    config,
                    group_name,
                    subject_ids,
                },
        } => cmd_grouper_delete_members(&config, &group_name, &subject_ids).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_retrieve(config: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config)?;
    let count = pipeline::retrieve(&config, output).await?;
    eprintln!("Retrieved {} persons into {}", count, output.display());
    Ok(())
}

async fn cmd_drupal(config: &Path, input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config)?;
    let count = pipeline::generate_drupal(&config, input, output).await?;
    eprintln!("Wrote {} persons to {}", count, output.display());
    Ok(())
}

async fn cmd_all_staff_list(
    config: &Path,
    input: &Path,
    output: &Path,
    password: Option<String>,
    no_autofilter: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config)?;
    let options = ExcelOptions {
        password: password.or_else(|| config.excel_password.clone()),
        autofilter: !no_autofilter,
    };
    if options.password.is_none() {
        info!("No sheet password configured, spreadsheet will be unprotected");
    }

    let count = pipeline::generate_all_staff_list(&config, input, output, &options).await?;
    eprintln!("Wrote {} persons to {}", count, output.display());
    Ok(())
}

fn cmd_memberships(memberships: &[String], output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<Option<&str>> = memberships.iter().map(|m| Some(m.as_str())).collect();
    let info = MembershipInfo::decode(Some(entries.as_slice()));

    let json = serde_json::to_string_pretty(&info)?;
    write_output(&json, output)
}

async fn cmd_grouper_delete_members(
    config: &Path,
    group: &str,
    subject_ids: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let grouper = GrouperConfig::load(config)?;
    let results = grouper.client().delete_members(group, subject_ids).await?;
    print_delete_results(&results);

    if !results.result_metadata.is_success() {
        return Err(format!("Failed to delete members from {}", group).into());
    }
    Ok(())
}

fn print_delete_results(results: &DeleteMemberResults) {
    for result in &results.results {
        let meta = &result.result_metadata;
        let subject = result.ws_subject.as_ref().and_then(|s| s.id.as_deref());
        println!("subject: {}", subject.unwrap_or("-"));
        println!("resultCode: {}", meta.result_code.as_deref().unwrap_or(""));
        println!("resultCode2: {}", meta.result_code2.as_deref().unwrap_or(""));
        println!("resultMessage: {}", meta.result_message.as_deref().unwrap_or(""));
        println!("success: {}", meta.success.as_deref().unwrap_or(""));
        println!("-----");
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
