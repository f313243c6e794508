//! Devload CLI - Convert XLSX device workbooks to device-management records
//!
//! # Main Commands
//!
//! ```bash
//! devload convert devices.xlsx     # Convert a workbook to device JSON
//! devload serve                    # Start HTTP server (port 3000)
//! devload push devices.json        # Send converted records to the API
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! devload parse devices.xlsx --sheet Devices   # Dump one sheet as JSON rows
//! devload mapping devices.xlsx                 # Interpret the mapping table
//! devload validate devices.json                # Validate produced records
//! ```

use clap::{Parser, Subcommand};
use devload::{
    convert_file, example_mapping, interpret, validate_device_value, ConvertOptions, Device,
    DeviceApiClient, TableSource, Workbook,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "devload")]
#[command(about = "Convert XLSX device workbooks to device-management records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full conversion pipeline: workbook -> devices with auto-events
    Convert {
        /// Input XLSX workbook
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Protocol name for unmatched device columns
        #[arg(long, default_value = "modbus-rtu")]
        protocol: String,

        /// Record bind errors per row instead of aborting
        #[arg(long)]
        lenient: bool,

        /// Skip validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Parse one sheet of a workbook and output its rows as JSON
    Parse {
        /// Input XLSX workbook
        input: PathBuf,

        /// Sheet to dump
        #[arg(short, long)]
        sheet: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interpret the mapping table and print it as JSON
    Mapping {
        /// Input XLSX workbook (omit to print the built-in example)
        input: Option<PathBuf>,

        /// Mapping sheet name
        #[arg(long, default_value = "MappingTable")]
        sheet: String,
    },

    /// Validate JSON device records against the device schema
    Validate {
        /// Input JSON file (array of device records)
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Push converted device records to the device-management API
    Push {
        /// Input JSON file (array of device records)
        input: PathBuf,

        /// API base URL (default: DEVLOAD_API_URL)
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            protocol,
            lenient,
            no_validate,
        } => cmd_convert(&input, output.as_deref(), &protocol, lenient, no_validate),

        Commands::Parse {
            input,
            sheet,
            output,
        } => cmd_parse(&input, &sheet, output.as_deref()),

        Commands::Mapping { input, sheet } => cmd_mapping(input.as_deref(), &sheet),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Serve { port } => cmd_serve(port).await,

        Commands::Push { input, url } => cmd_push(&input, url.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    protocol: &str,
    lenient: bool,
    no_validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let options = ConvertOptions {
        protocol_name: protocol.to_string(),
        strict_bind: !lenient,
        skip_validation: no_validate,
        ..ConvertOptions::default()
    };

    let report = convert_file(input, &options)?;

    eprintln!("\n⚙️  Converted: {} devices", report.devices.len());
    let linked: usize = report.devices.iter().map(|d| d.auto_events.len()).sum();
    eprintln!("   Linked auto-events: {}", linked);
    if !report.info.completed_columns.is_empty() {
        eprintln!(
            "   Added columns: {}",
            report.info.completed_columns.join(", ")
        );
    }

    if !no_validate {
        eprintln!("\n✔️  Validation:");
        if report.validation_errors.is_empty() {
            eprintln!("   ✅ All {} rows valid!", report.devices.len());
        } else {
            eprintln!("   ✅ Valid: {}", report.devices.len());
            eprintln!("   ❌ Invalid: {}", report.validation_errors.len());
            for failure in report.validation_errors.iter().take(5) {
                eprintln!("\n   {} row {}:", failure.sheet, failure.row);
                for err in failure.errors.iter().take(3) {
                    eprintln!("     - {}", err);
                }
            }
        }
    }

    let json = serde_json::to_string_pretty(&report.devices)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(
    input: &Path,
    sheet: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing workbook: {}", input.display());

    let workbook = Workbook::open(input)?;
    eprintln!("   Sheets: {}", workbook.sheet_names().join(", "));

    let rows = workbook.rows(sheet)?;
    eprintln!("✅ {} rows in '{}'", rows.len(), sheet);

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_mapping(input: Option<&Path>, sheet: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mapping = match input {
        Some(path) => {
            eprintln!("📋 Interpreting mapping table: {}", path.display());
            let workbook = Workbook::open(path)?;
            interpret(&workbook.rows(sheet)?)?
        }
        None => {
            eprintln!("📋 Built-in example mapping (no workbook given)");
            example_mapping()
        }
    };

    eprintln!("✅ {} field mappings", mapping.len());
    println!("{}", serde_json::to_string_pretty(&mapping)?);

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;

    let mut valid = 0;
    let mut invalid = 0;

    for (i, record) in records.iter().enumerate() {
        match validate_device_value(record) {
            Ok(()) => valid += 1,
            Err(errors) => {
                invalid += 1;
                if invalid <= 5 {
                    eprintln!("\n❌ Record {} invalid:", i);
                    for err in errors.iter().take(3) {
                        eprintln!("   - {}", err);
                    }
                }
            }
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    devload::server::start_server(port).await
}

async fn cmd_push(input: &Path, url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📤 Pushing: {}", input.display());

    let content = fs::read_to_string(input)?;
    let devices: Vec<Device> = serde_json::from_str(&content)?;
    eprintln!("   {} device records", devices.len());

    let client = match url {
        Some(url) => DeviceApiClient::new(url),
        None => DeviceApiClient::from_env()?,
    };
    eprintln!("   Target: {}", client.base_url());

    let submitted = client.push_devices(&devices).await?;
    eprintln!("✅ Submitted {} devices", submitted);

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
