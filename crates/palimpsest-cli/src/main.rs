use anyhow::{Context, Result, bail};
use kurbo::{Point, Rect, Size};
use palimpsest_config::Config;
use palimpsest_engine::recording::describe_delta;
use palimpsest_engine::{
    MonospaceLayout, PaneIndex, PlaybackEvent, Recording, RecordingEngine, RecordingLibrary,
    TextPane, Workspace, io,
};
use std::{
    env,
    path::{Path, PathBuf},
    process,
    thread,
    time::{Duration, Instant},
};

/// Columns and rows of the virtual screen each pane is laid out on
const PANE_COLUMNS: f64 = 80.0;
const PANE_ROWS: f64 = 40.0;
const PANE_GAP: f64 = 16.0;
const FRAME: Duration = Duration::from_millis(50);

enum Command {
    List,
    Describe(String),
    Play(Option<String>),
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <workspace.json> list");
    eprintln!("       {program} <workspace.json> describe <recording>");
    eprintln!("       {program} <workspace.json> play [recording]");
    eprintln!("Recordings are matched by id or name.");
    process::exit(1);
}

fn parse_args() -> (PathBuf, Command) {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("palimpsest", String::as_str);

    let (Some(path), Some(command)) = (args.get(1), args.get(2)) else {
        usage(program);
    };
    let argument = args.get(3).cloned();
    let command = match (command.as_str(), argument) {
        ("list", None) => Command::List,
        ("describe", Some(recording)) => Command::Describe(recording),
        ("play", recording) => Command::Play(recording),
        _ => usage(program),
    };
    (PathBuf::from(path), command)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let (workspace_path, command) = parse_args();

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::debug!("No config file at {}, using defaults", Config::config_path().display());
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let (mut workspace, recordings) = load_workspace(&workspace_path, &config)?;

    match command {
        Command::List => list(&recordings),
        Command::Describe(name) => {
            let recording = find_recording(&recordings, Some(&name))?;
            describe(recording, &workspace);
            Ok(())
        }
        Command::Play(name) => {
            let id = find_recording(&recordings, name.as_deref())?.id.clone();
            play(&mut workspace, &recordings, &id)
        }
    }
}

fn load_workspace(path: &Path, config: &Config) -> Result<(Workspace<TextPane>, RecordingLibrary)> {
    let file = io::read_workspace_file(path)
        .with_context(|| format!("loading workspace '{}'", path.display()))?;
    let (panes, bytes) = file.text_stats();
    log::info!("Workspace {}: {panes} panes, {bytes} bytes of text", path.display());

    let (settings, _) = config.settings();
    let display = config.display.clone();
    let layout = move |index: PaneIndex| {
        let width = PANE_COLUMNS * display.cell_width;
        MonospaceLayout::new(
            Point::new(index as f64 * (width + PANE_GAP), 0.0),
            Size::new(width, PANE_ROWS * display.line_height),
        )
        .with_cell(display.cell_width, display.line_height)
    };
    let (workspace, embedded) = file.into_workspace(settings, layout)?;

    let recordings = match &config.recordings_path {
        Some(recordings_path) => {
            log::info!("Using recordings from {}", recordings_path.display());
            io::read_recordings(recordings_path)?
        }
        None => embedded,
    };
    Ok((workspace, recordings))
}

fn find_recording<'a>(library: &'a RecordingLibrary, name: Option<&str>) -> Result<&'a Recording> {
    let found = match name {
        Some(name) => library.iter().find(|r| r.id == name || r.name == name),
        None => library.first(),
    };
    match (found, name) {
        (Some(recording), _) => Ok(recording),
        (None, Some(name)) => bail!("no recording named '{name}'"),
        (None, None) => bail!("workspace has no recordings"),
    }
}

fn list(library: &RecordingLibrary) -> Result<()> {
    if library.is_empty() {
        println!("No recordings");
    }
    for recording in library.iter() {
        println!(
            "{}  {}  ({} steps, {} ms, {:?})",
            recording.id,
            recording.name,
            recording.step_count(),
            recording.global_delay_ms,
            recording.transition_type
        );
    }
    Ok(())
}

fn describe(recording: &Recording, workspace: &Workspace<TextPane>) {
    println!("{}", recording.name);
    for (index, step) in recording.steps.iter().enumerate() {
        println!(
            "{:>3}. {}",
            index + 1,
            describe_delta(&step.delta, workspace.layers().layers())
        );
    }
}

/// Smallest rect enclosing every pane
fn container(workspace: &Workspace<TextPane>) -> Rect {
    workspace
        .panes()
        .iter()
        .map(|(_, pane)| Rect::from_origin_size(pane.layout.origin, pane.layout.size))
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO)
}

fn log_frame(workspace: &Workspace<TextPane>) {
    for (handle, _) in workspace.panes().iter() {
        if let Some(decorations) = workspace.decorations(handle.index) {
            log::info!(
                "  pane {}: {} highlights, {} underlines, {} arrow endpoints",
                handle.index,
                decorations.highlights.len(),
                decorations.underlines.len(),
                decorations.arrow_endpoints.len()
            );
        }
    }
    let arrows = workspace.arrow_renders(container(workspace));
    let ghosted = arrows.iter().filter(|a| a.path.any_endpoint_clamped()).count();
    log::info!("  {} arrows ({ghosted} off screen)", arrows.len());
}

fn play(workspace: &mut Workspace<TextPane>, library: &RecordingLibrary, id: &str) -> Result<()> {
    let mut engine = RecordingEngine::new();
    engine.load(library, id)?;
    let Some(recording) = engine.loaded().cloned() else {
        bail!("recording {id} did not load");
    };
    log::info!(
        "Playing '{}': {} steps every {} ms",
        recording.name,
        recording.step_count(),
        recording.global_delay_ms
    );

    engine.play(workspace)?;
    log_frame(workspace);

    let mut last = Instant::now();
    loop {
        let now = Instant::now();
        let events = engine.tick(now - last, workspace);
        last = now;

        for event in events {
            match event {
                PlaybackEvent::StepApplied {
                    index, dangling, ..
                } => {
                    let description = recording
                        .steps
                        .get(index)
                        .map(|step| describe_delta(&step.delta, workspace.layers().layers()))
                        .unwrap_or_default();
                    log::info!("Step {}/{}: {description}", index + 1, recording.step_count());
                    for key in dangling {
                        log::warn!("  skipped {key}: target no longer exists");
                    }
                    log_frame(workspace);
                }
                PlaybackEvent::Finished => {
                    log::info!("Finished '{}'", recording.name);
                    return Ok(());
                }
                PlaybackEvent::Reset { .. } | PlaybackEvent::Unloaded => {}
            }
        }
        thread::sleep(FRAME);
    }
}
