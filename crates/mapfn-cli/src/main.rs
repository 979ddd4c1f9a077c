use futures::executor::block_on;
use mapfn::edit::{HydrateError, hydrate_page_headless_sync};
use mapfn::{
    Engine, EscapeRenderer, MapState, PageContext, RenderContext, RenderOptions,
    find_invocations, split_invocation,
};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Map(mapfn::Error),
    Hydrate(HydrateError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Map(err) => write!(f, "{err}"),
            CliError::Hydrate(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<mapfn::Error> for CliError {
    fn from(value: mapfn::Error) -> Self {
        Self::Map(value)
    }
}

impl From<HydrateError> for CliError {
    fn from(value: HydrateError) -> Self {
        Self::Hydrate(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    State,
    Scan,
    Preview,
}

#[derive(Debug)]
struct Args {
    command: Command,
    input: Option<String>,
    page: String,
    pretty: bool,
    strict: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            command: Command::Render,
            input: None,
            page: "Main Page".to_string(),
            pretty: false,
            strict: false,
        }
    }
}

/// Outcome of one invocation for `state`.
#[derive(Serialize)]
struct StateOut {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<MapState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn usage() -> &'static str {
    "mapfn-cli\n\
\n\
USAGE:\n\
  mapfn-cli [render] [--page <title>] [--strict] [<path>|-]\n\
  mapfn-cli state [--page <title>] [--pretty] [<path>|-]\n\
  mapfn-cli scan [--pretty] [<path>|-]\n\
  mapfn-cli preview [--page <title>] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - render replaces every {{#googlemap:...}} in wikitext with its HTML; failing tags render\n\
    as inline errors unless --strict is given.\n\
  - state prints the payload each tag would embed, or its error.\n\
  - scan reads rendered HTML and prints the embedded maps and the client bundle it needs.\n\
  - preview renders wikitext, hydrates every map headlessly and prints the controller state,\n\
    including the tag preview of edit-mode maps.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "state" => args.command = Command::State,
            "scan" => args.command = Command::Scan,
            "preview" => args.command = Command::Preview,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--page" => {
                let Some(title) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if title.trim().is_empty() {
                    return Err(CliError::Usage(usage()));
                }
                args.page = title.trim().to_string();
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn render_options(strict: bool) -> RenderOptions {
    if strict {
        RenderOptions::strict()
    } else {
        RenderOptions::lenient()
    }
}

fn tag_states(engine: &Engine, text: &str, page: &str) -> Vec<StateOut> {
    let messages = engine.messages();
    let mut out = Vec::new();
    for (index, invocation) in find_invocations(text).into_iter().enumerate() {
        let Some(args) = split_invocation(invocation) else {
            continue;
        };
        match engine.map_state_sync(&args, &EscapeRenderer, page) {
            Ok(state) => out.push(StateOut {
                index,
                state: Some(state),
                error: None,
            }),
            Err(err) => out.push(StateOut {
                index,
                state: None,
                error: Some(err.message_text(&messages)),
            }),
        }
    }
    out
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let engine = Engine::new();

    match args.command {
        Command::Render => {
            let mut ctx = RenderContext::new(PageContext::new(args.page.as_str()));
            let html = block_on(engine.render_page(
                &mut ctx,
                &text,
                &EscapeRenderer,
                render_options(args.strict),
            ))?;
            print!("{html}");
            Ok(())
        }
        Command::State => write_json(&tag_states(&engine, &text, &args.page), args.pretty),
        Command::Scan => {
            let scan = block_on(engine.scan_page(&text))?;
            write_json(&scan, args.pretty)
        }
        Command::Preview => {
            let mut ctx = RenderContext::new(PageContext::new(args.page.as_str()));
            let html = block_on(engine.render_page(
                &mut ctx,
                &text,
                &EscapeRenderer,
                RenderOptions::lenient(),
            ))?;
            let maps = hydrate_page_headless_sync(&engine, &html)?;
            let snapshots: Vec<_> = maps.iter().map(|m| m.snapshot()).collect();
            write_json(&snapshots, args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
