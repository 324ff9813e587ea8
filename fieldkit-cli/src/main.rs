//! `fieldkit`: fill in a form described by a JSON/YAML/TOML document from
//! the terminal and write the submitted values out.

use std::fmt::Write as FmtWrite;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use fieldkit::{
    DynamicForm, FieldDescriptor, FormOptions, FormUI,
    io::{DocumentFormat, OutputDestination, OutputOptions, load_fields_value, parse_document_str},
};

#[derive(Debug, Parser)]
#[command(
    name = "fieldkit",
    version,
    about = "Fill in declarative forms from the terminal"
)]
struct Cli {
    /// Form spec: file path, inline payload, or "-" for stdin
    #[arg(short = 'F', long = "form", value_name = "SPEC")]
    form: String,

    /// Initial values spec: file path, inline payload, or "-" for stdin
    #[arg(short = 'V', long = "values", value_name = "SPEC")]
    values: Option<String>,

    /// Title shown at the top of the UI
    #[arg(long = "title", value_name = "TEXT")]
    title: Option<String>,

    /// Output destinations ("-" writes to stdout). Defaults to stdout.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,

    /// Validate fields as they change instead of only on submit
    #[arg(long = "live")]
    live: bool,

    /// Load the documents, report the field count and exit without opening the UI
    #[arg(long = "check")]
    check: bool,

    /// Write debug logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let mut diagnostics = DiagnosticCollector::default();

    if cli.form == "-" && cli.values.as_deref() == Some("-") {
        diagnostics.push_input(
            "form/values",
            "cannot read form and values from stdin simultaneously; provide inline content or files",
        );
    }

    let fields = match load_value(&cli.form, format_hint(&cli.form), "form") {
        Ok(document) => match load_fields_value(&document) {
            Ok(fields) => Some(fields),
            Err(err) => {
                diagnostics.push_input("form", format!("{err:#}"));
                None
            }
        },
        Err(err) => {
            diagnostics.push_input("form", err.to_string());
            None
        }
    };

    let values = match cli.values.as_deref() {
        Some(spec) if spec != "-" || cli.form != "-" => {
            match load_value(spec, format_hint(spec), "values") {
                Ok(Value::Object(map)) => Some(map),
                Ok(other) => {
                    diagnostics.push_input("values", format!("expected an object, got {other}"));
                    None
                }
                Err(err) => {
                    diagnostics.push_input("values", err.to_string());
                    None
                }
            }
        }
        _ => None,
    };

    let (output, output_paths) = build_output_options(&cli, &mut diagnostics);
    ensure_output_paths_available(&output_paths, cli.force, &mut diagnostics);

    diagnostics.into_result()?;

    let fields = fields.ok_or_else(|| eyre!("no form fields loaded"))?;
    let form = build_form(fields, values.as_ref(), cli.live)?;

    if cli.check {
        println!("form ok: {} field(s)", form.fields().len());
        return Ok(());
    }

    let mut ui = FormUI::new(form);
    if let Some(title) = cli.title.as_ref() {
        ui = ui.with_title(title.clone());
    }
    if let Some(options) = output {
        ui = ui.with_output(options);
    }

    ui.run().map_err(|err| eyre!("{err:#}"))?;
    Ok(())
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fieldkit=debug")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_form(
    fields: Vec<FieldDescriptor>,
    values: Option<&Map<String, Value>>,
    live: bool,
) -> Result<DynamicForm> {
    let options = FormOptions::default().with_validate_on_change(live);
    let mut form = DynamicForm::new(fields, options).map_err(Report::new)?;
    if let Some(values) = values {
        form.initialize(values).map_err(Report::new)?;
    }
    Ok(form)
}

fn format_hint(spec: &str) -> DocumentFormat {
    if spec == "-" {
        return DocumentFormat::default();
    }
    DocumentFormat::from_path(Path::new(spec)).unwrap_or_default()
}

fn load_value(spec: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    if spec == "-" {
        let contents = read_from_source(&InputSource::Stdin)?;
        return parse_contents(&contents, format, label);
    }

    let path = PathBuf::from(spec);
    match read_from_source(&InputSource::File(path.clone())) {
        Ok(contents) => parse_contents(&contents, format, label),
        Err(err) => {
            if is_not_found(&err) {
                let inline_label = format!("inline {label}");
                return parse_contents(spec, format, &inline_label);
            }
            Err(err.wrap_err(format!("failed to load {label} from {}", path.display())))
        }
    }
}

fn read_from_source(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("failed to read from stdin")?;
            Ok(buffer)
        }
        InputSource::File(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read file {}", path.display())),
    }
}

fn is_not_found(err: &Report) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}

/// Try the hinted format first, then every other compiled-in format.
fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    match parse_document_str(contents, format) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in DocumentFormat::available_formats() {
                if candidate == format {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, candidate) {
                    return Ok(value);
                }
            }
            Err(eyre!(
                "failed to parse {label}: tried {} (first error: {primary:#})",
                format_list()
            ))
        }
    }
}

fn format_list() -> String {
    let items: Vec<String> = DocumentFormat::available_formats()
        .into_iter()
        .map(|fmt| fmt.to_string())
        .collect();
    items.join(", ")
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn len(&self) -> usize {
        self.messages.len()
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

fn build_output_options(
    cli: &Cli,
    diagnostics: &mut DiagnosticCollector,
) -> (Option<OutputOptions>, Vec<PathBuf>) {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
            continue;
        }
        if raw == "-" {
            destinations.push(OutputDestination::Stdout);
        } else {
            destinations.push(OutputDestination::file(raw));
        }
    }
    if destinations.is_empty() && cli.outputs.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }
    if destinations.is_empty() {
        return (None, Vec::new());
    }

    let file_paths: Vec<PathBuf> = destinations
        .iter()
        .filter_map(|dest| match dest {
            OutputDestination::File(path) => Some(path.clone()),
            OutputDestination::Stdout => None,
        })
        .collect();

    let start = diagnostics.len();
    let format = infer_format_from_files(&file_paths, diagnostics).unwrap_or_default();
    if diagnostics.len() > start {
        return (None, file_paths);
    }

    (
        Some(
            OutputOptions::new(format)
                .with_pretty(!cli.no_pretty)
                .with_destinations(destinations),
        ),
        file_paths,
    )
}

/// All file destinations must agree on one format.
fn infer_format_from_files(
    file_paths: &[PathBuf],
    diagnostics: &mut DiagnosticCollector,
) -> Option<DocumentFormat> {
    let mut detected: Option<DocumentFormat> = None;
    for path in file_paths {
        match DocumentFormat::from_path(path) {
            Some(format) => match detected {
                Some(existing) if existing != format => diagnostics.push_output(format!(
                    "output file {} uses {format} but other destinations use {existing}; align extensions",
                    path.display()
                )),
                Some(_) => {}
                None => detected = Some(format),
            },
            None => diagnostics.push_output(format!(
                "cannot infer format from output file {}; use one of: {}",
                path.display(),
                format_list()
            )),
        }
    }
    detected
}

fn ensure_output_paths_available(
    paths: &[PathBuf],
    force: bool,
    diagnostics: &mut DiagnosticCollector,
) {
    if force {
        return;
    }
    for path in paths {
        if path.exists() {
            diagnostics.push_output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inline_documents_parse_when_no_file_exists() {
        let value = load_value(r#"[{"name": "email"}]"#, DocumentFormat::Json, "form").unwrap();
        assert_eq!(value, json!([{"name": "email"}]));
    }

    #[test]
    fn mixed_output_extensions_are_reported() {
        let mut diagnostics = DiagnosticCollector::default();
        let paths = [PathBuf::from("out.json"), PathBuf::from("out.txt")];
        assert_eq!(
            infer_format_from_files(&paths, &mut diagnostics),
            Some(DocumentFormat::Json)
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn initial_values_are_applied() {
        let fields = load_fields_value(&json!([{"name": "email", "type": "email"}])).unwrap();
        let values = json!({"email": "ada@example.com"});
        let form = build_form(fields, values.as_object(), false).unwrap();
        assert_eq!(
            form.values_json().get("email"),
            Some(&json!("ada@example.com"))
        );
    }
}
