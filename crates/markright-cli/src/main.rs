use anyhow::{Context, Result, bail};
use markright_config::{Config, EditorSettings};
use markright_engine::host::{DocumentHost, HostEvent, HostNotice};
use markright_engine::text::split_lines;
use markright_engine::view::Presentation;
use markright_engine::{
    DocumentId, FocusMode, HostMessage, OverlayRenderer, PreviewRenderer, ViewId, ViewMessage,
    ViewState, WikiLinkResolver, focus_view, io, scan,
};
use relative_path::RelativePathBuf;
use std::{env, path::PathBuf, process};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, PartialEq)]
enum Command {
    Scan(RelativePathBuf),
    Overlays(RelativePathBuf),
    Preview(RelativePathBuf),
    Focus {
        file: RelativePathBuf,
        line: usize,
        mode: Option<FocusMode>,
    },
    Serve(RelativePathBuf),
}

#[derive(Debug, PartialEq)]
struct Args {
    workspace: Option<PathBuf>,
    command: Command,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [--workspace <dir>] <command>\n\n\
         Commands:\n  \
         scan <file>                  print overlay regions as JSON\n  \
         overlays <file>              print overlay placement for the whole file as JSON\n  \
         preview <file>               print preview HTML\n  \
         focus <file> <line> [mode]   print the focused and dimmed line spans\n  \
         serve <file>                 run a document host over stdin/stdout (JSON lines)\n\n\
         Files are relative to the workspace. Without --workspace the configured\n\
         workspace_path is used, then the current directory."
    )
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut workspace = None;
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-w" | "--workspace" => {
                let dir = iter.next().context("--workspace needs a directory")?;
                workspace = Some(PathBuf::from(dir));
            }
            _ => positional.push(arg.as_str()),
        }
    }

    let command = match positional.as_slice() {
        ["scan", file] => Command::Scan(RelativePathBuf::from(*file)),
        ["overlays", file] => Command::Overlays(RelativePathBuf::from(*file)),
        ["preview", file] => Command::Preview(RelativePathBuf::from(*file)),
        ["focus", file, line, rest @ ..] if rest.len() <= 1 => Command::Focus {
            file: RelativePathBuf::from(*file),
            line: line
                .parse()
                .with_context(|| format!("invalid line number: {line}"))?,
            mode: rest.first().map(|mode| mode.parse::<FocusMode>()).transpose()?,
        },
        ["serve", file] => Command::Serve(RelativePathBuf::from(*file)),
        [] => bail!("no command given"),
        [command, ..] => bail!("unknown command or wrong arguments: {command}"),
    };

    Ok(Args { workspace, command })
}

/// Workspace root and editor settings from the CLI flag and the config file.
fn resolve_settings(cli_workspace: Option<PathBuf>) -> Result<(PathBuf, EditorSettings)> {
    let config = Config::load().with_context(|| {
        format!(
            "failed to load config file '{}'",
            Config::config_path().display()
        )
    })?;

    let (config_workspace, settings) = match config {
        Some(config) => (Some(config.workspace_path), config.editor),
        None => (None, EditorSettings::default()),
    };
    let workspace = match cli_workspace.or(config_workspace) {
        Some(workspace) => workspace,
        None => env::current_dir()?,
    };

    io::validate_workspace(&workspace)
        .with_context(|| format!("workspace '{}' is invalid", workspace.display()))?;
    Ok((workspace, settings))
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("markright");

    let parsed = match parse_args(&args[1..]) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", usage(program));
            process::exit(1);
        }
    };

    if let Err(e) = run(parsed) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let (workspace, settings) = resolve_settings(args.workspace)?;

    match args.command {
        Command::Scan(file) => {
            let text = io::read_file(&file, &workspace)?;
            let regions = scan(&split_lines(&text));
            println!("{}", serde_json::to_string_pretty(&regions)?);
        }
        Command::Overlays(file) => {
            let text = io::read_file(&file, &workspace)?;
            println!("{}", serde_json::to_string_pretty(&layout(&text, &settings))?);
        }
        Command::Preview(file) => {
            let text = io::read_file(&file, &workspace)?;
            println!("{}", PreviewRenderer::new(settings.focus_mode).render(&text));
        }
        Command::Focus { file, line, mode } => {
            let text = io::read_file(&file, &workspace)?;
            let mode = mode.unwrap_or(settings.focus_mode);
            match focus_view(mode, &split_lines(&text), line) {
                Some(view) => println!("{}", serde_json::to_string_pretty(&view)?),
                None => println!("focus mode is off"),
            }
        }
        Command::Serve(file) => {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(serve(workspace, file, settings))?;
        }
    }
    Ok(())
}

/// Overlay placement in a view built from `settings`, sized so the whole
/// document is on screen.
fn layout(text: &str, settings: &EditorSettings) -> Presentation {
    let lines = split_lines(text);
    let mut view = ViewState::new(settings.view_options(), OverlayRenderer::new());
    view.handle(HostMessage::Update {
        text: text.to_string(),
        html: None,
    });
    view.handle(HostMessage::UpdateOverlays {
        overlays: scan(&lines),
    });
    view.scroll(0.0, lines.len() as f64 * view.viewport().line_height());
    view.presentation()
}

/// Hosts one document for one view speaking JSON lines over stdio.
///
/// Every applied edit is written back to the file.
async fn serve(workspace: PathBuf, file: RelativePathBuf, settings: EditorSettings) -> Result<()> {
    let text = io::read_file(&file, &workspace)?;
    let document = DocumentId::new(file.as_str());

    let (notice_tx, mut notices) = mpsc::unbounded_channel();
    let (events, host) = DocumentHost::new(settings.host_options())
        .with_resolver(WikiLinkResolver::new(&workspace))
        .with_notices(notice_tx)
        .spawn();

    let view = ViewId::new();
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    events
        .send(HostEvent::Open {
            document: document.clone(),
            text,
        })
        .context("document host stopped")?;
    events
        .send(HostEvent::Attach {
            view,
            document,
            outbox,
        })
        .context("document host stopped")?;
    log::info!("serving {file} from {}", workspace.display());

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = inbox.recv().await {
            let mut line = serde_json::to_string(&message)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        anyhow::Ok(())
    });

    let persister = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            match notice {
                HostNotice::DocumentChanged { version, text, .. } => {
                    match io::write_file(&file, &workspace, &text) {
                        Ok(path) => log::debug!("saved v{version} to {}", path.display()),
                        Err(e) => log::warn!("failed to save {file}: {e}"),
                    }
                }
                HostNotice::OpenFile { path, created } => {
                    let verb = if created { "created" } else { "open" };
                    log::info!("{verb} {}", path.display());
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ViewMessage>(line) {
            Ok(message) => events
                .send(HostEvent::FromView { view, message })
                .context("document host stopped")?,
            Err(e) => log::warn!("ignoring malformed message: {e}"),
        }
    }

    // Closing the inbox stops the host; dropping it closes the view channel.
    drop(events);
    drop(host.await?);
    writer.await??;
    persister.await?;
    Ok(())
}
