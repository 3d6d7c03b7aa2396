use clap::{Args, Parser, Subcommand};
use mockdeck::{
    describe_status_code, known_status_codes, parse_status_code, Error, HttpMethod,
    JsonFileMappingsProvider, MockServer, MockServerConfiguration, PersistableMappingInfo,
    ResponseEditor, Workspace, DEFAULT_URL,
};
use std::{fs, path::PathBuf, process::ExitCode, time::Duration};

#[derive(Parser)]
#[command(
    name = "mockdeck",
    version,
    about = "Configure and run request/response mappings on an HTTP mock server"
)]
struct Cli {
    /// Mappings file (defaults to mappings.json next to the executable)
    #[arg(long, global = true, env = "MOCKDECK_MAPPINGS")]
    mappings: Option<PathBuf>,

    /// Url the mock server listens on
    #[arg(long, global = true, env = "MOCKDECK_URL", default_value = DEFAULT_URL)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the mock server with the saved mappings and print incoming requests
    Serve {
        /// Don't expose the /__admin endpoints
        #[arg(long)]
        no_admin: bool,
    },

    /// List the saved mappings
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Add a mapping
    Add(MappingArgs),

    /// Change an existing mapping
    Edit {
        /// Position of the mapping as shown by `list`
        index: usize,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Drop the existing response headers before adding the given ones
        #[arg(long)]
        clear_headers: bool,
    },

    /// Delete a mapping
    Remove {
        /// Position of the mapping as shown by `list`
        index: usize,
    },

    /// Delete every mapping
    Clear,

    /// List the known response status codes
    StatusCodes,
}

#[derive(Args)]
struct MappingArgs {
    /// Request path, optionally with a query string
    #[arg(long)]
    path: Option<String>,

    /// Request method: GET, POST, PUT, PATCH or DELETE
    #[arg(long)]
    method: Option<String>,

    /// Response status code, e.g. 404 or "404 - Not Found"
    #[arg(long)]
    status: Option<String>,

    /// Response body
    #[arg(long, conflicts_with = "body_file")]
    body: Option<String>,

    /// Read the response body from a file
    #[arg(long)]
    body_file: Option<PathBuf>,

    /// Response header as KEY=VALUE (repeatable)
    #[arg(long = "header", value_name = "KEY=VALUE")]
    headers: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("MOCKDECK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let provider = cli
        .mappings
        .clone()
        .map(JsonFileMappingsProvider::new)
        .unwrap_or_default();

    let mut configuration = MockServerConfiguration::new();
    configuration.set_url(cli.url.clone());
    if let Commands::Serve { no_admin: true } = cli.command {
        configuration.set_admin_interface(false);
    }

    let mut workspace = Workspace::open(MockServer::new(configuration), provider)?;

    match cli.command {
        Commands::Serve { .. } => serve(&mut workspace),
        Commands::List { json } => list(&workspace, json),
        Commands::Add(args) => {
            let index = workspace.add_mapping();
            edit(&mut workspace, index, &args, false)?;
            println!("Added mapping {}", index);
            Ok(())
        }
        Commands::Edit {
            index,
            mapping,
            clear_headers,
        } => {
            edit(&mut workspace, index, &mapping, clear_headers)?;
            println!("Updated mapping {}", index);
            Ok(())
        }
        Commands::Remove { index } => {
            workspace.remove_mapping(index)?;
            workspace.apply()?;
            println!("Removed mapping {}", index);
            Ok(())
        }
        Commands::Clear => {
            workspace.clear();
            workspace.apply()?;
            println!("Removed all mappings");
            Ok(())
        }
        Commands::StatusCodes => {
            for code in known_status_codes() {
                println!("{}", describe_status_code(code));
            }
            Ok(())
        }
    }
}

fn serve(workspace: &mut Workspace<JsonFileMappingsProvider>) -> Result<(), Error> {
    workspace.server().update_mappings(workspace.mappings())?;
    workspace.start_server()?;

    println!(
        "Mock server listening on {} with {} mapping(s). Press Ctrl-C to stop.",
        workspace
            .server()
            .base_url()
            .unwrap_or_else(|| workspace.server_url().to_string()),
        workspace.mappings().len()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(Duration::from_millis(100));

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = ticker.tick() => {
                    workspace.pump_events();
                    let logs = workspace.take_logs();
                    if !logs.is_empty() {
                        print!("{}", logs);
                    }
                }
            }
        }
    });

    workspace.stop_server()
}

fn list(workspace: &Workspace<JsonFileMappingsProvider>, json: bool) -> Result<(), Error> {
    if json {
        let records: Vec<PersistableMappingInfo> = workspace
            .mappings()
            .iter()
            .map(PersistableMappingInfo::from)
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if workspace.mappings().is_empty() {
        println!("No mappings configured.");
        return Ok(());
    }

    println!(
        "{:<4} {:<7} {:<32} {:<28} BODY",
        "#", "METHOD", "PATH", "STATUS"
    );
    for (index, mapping) in workspace.mappings().iter().enumerate() {
        println!(
            "{:<4} {:<7} {:<32} {:<28} {}",
            index,
            mapping.request_http_method,
            mapping.path.as_deref().unwrap_or(""),
            describe_status_code(mapping.response_status_code),
            mapping.minified_response_body().unwrap_or_default()
        );
        for (key, value) in &mapping.response_headers {
            println!("     {}: {}", key, value);
        }
    }

    Ok(())
}

fn edit(
    workspace: &mut Workspace<JsonFileMappingsProvider>,
    index: usize,
    args: &MappingArgs,
    clear_headers: bool,
) -> Result<(), Error> {
    let method = args
        .method
        .as_deref()
        .map(str::parse::<HttpMethod>)
        .transpose()?;
    let status = args.status.as_deref().map(parse_status_code).transpose()?;
    let body = match (&args.body, &args.body_file) {
        (Some(body), _) => Some(body.clone()),
        (None, Some(file)) => Some(fs::read_to_string(file)?),
        (None, None) => None,
    };

    let mut editor = if clear_headers {
        ResponseEditor::new()
    } else {
        workspace.edit_response(index)?
    };
    if clear_headers {
        editor.set_body(workspace.mapping(index)?.response_body.clone());
    }
    if body.is_some() {
        editor.set_body(body);
    }
    for header in &args.headers {
        let (key, value) = split_header(header);
        match editor
            .headers()
            .iter()
            .position(|row| row.key.as_deref() == Some(key.as_str()))
        {
            Some(row) => {
                editor.set_header_value(row, Some(value));
            }
            None => editor.add_header(Some(key), Some(value)),
        }
    }

    let mapping = workspace.mapping_mut(index)?;
    if let Some(path) = &args.path {
        mapping.path = Some(path.clone());
    }
    if let Some(method) = method {
        mapping.request_http_method = method;
    }
    if let Some(status) = status {
        mapping.response_status_code = status;
    }

    workspace.commit_response(index, &editor)?;
    workspace.apply()
}

/// `KEY=VALUE` or `KEY: VALUE`; a bare key gets an empty value.
fn split_header(header: &str) -> (String, String) {
    let separator = header
        .find('=')
        .into_iter()
        .chain(header.find(':'))
        .min();

    match separator {
        Some(pos) => (
            header[..pos].trim().to_string(),
            header[pos + 1..].trim().to_string(),
        ),
        None => (header.trim().to_string(), String::new()),
    }
}
