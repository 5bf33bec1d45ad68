use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use studio_core::{update, AppState, AppViewModel, Msg};
use studio_engine::{EngineEvent, EngineHandle, ServiceSettings};
use studio_logging::{studio_info, studio_trace};

use super::commands::{self, Input, HELP};
use super::effects::EffectRunner;
use super::{export, render};
use crate::cli::{Cli, Command, ConvertArgs};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.service_settings();
    match cli.command {
        Command::Templates => run_templates(settings),
        Command::Convert(args) => run_convert(settings, args),
    }
}

fn run_templates(settings: ServiceSettings) -> anyhow::Result<()> {
    let engine = EngineHandle::new(settings.clone())?;
    engine.fetch_templates();
    let deadline = Instant::now() + settings.connect_timeout + settings.request_timeout;
    while Instant::now() < deadline {
        if let Some(EngineEvent::TemplatesLoaded(result)) =
            engine.recv_timeout(Duration::from_millis(100))
        {
            let catalog = result.context("listing templates")?;
            print!("{}", render::templates(&catalog));
            return Ok(());
        }
    }
    bail!("no answer from {} in time", settings.base_url)
}

fn run_convert(settings: ServiceSettings, args: ConvertArgs) -> anyhow::Result<()> {
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    studio_info!(
        "Converting {} ({} bytes) via {}",
        args.file.display(),
        content.len(),
        settings.base_url
    );

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(settings.clone(), input_tx.clone())?;
    spawn_stdin_reader(input_tx.clone());
    spawn_ticker(input_tx);

    // Submission waits until we know whether the service has its own key.
    runner.fetch_env_config();
    let mut app = App {
        state: AppState::new(),
        runner,
        settings,
        pending_submit: Some(Msg::SubmitRequested {
            content,
            options: args.submit_options(),
        }),
        apply_on_complete: args.apply_on_complete,
        auto_applied: false,
        last_status: String::new(),
        last_view: AppViewModel::default(),
    };
    println!("converting {}; type `help` for editor commands", args.file.display());

    for input in input_rx {
        if !app.handle(input) {
            break;
        }
    }
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    settings: ServiceSettings,
    pending_submit: Option<Msg>,
    apply_on_complete: bool,
    auto_applied: bool,
    last_status: String,
    last_view: AppViewModel,
}

impl App {
    /// Returns false when the user is done.
    fn handle(&mut self, input: Input) -> bool {
        match input {
            Input::Msg(Msg::Tick) => self.render_changes(),
            Input::Msg(msg) => {
                let env_known = matches!(msg, Msg::EnvConfigLoaded { .. });
                self.dispatch(msg);
                if env_known {
                    if let Some(submit) = self.pending_submit.take() {
                        self.dispatch(submit);
                    }
                }
            }
            Input::Show => match self.state.view().story {
                Some(story) => print!("{}", render::story(&story)),
                None => println!("no story loaded yet"),
            },
            Input::Export(dir) => self.export(&dir),
            Input::Help => println!("{HELP}"),
            Input::Quit => return false,
        }
        true
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
        for notice in self.state.take_notices() {
            println!("{}", render::notice(&notice));
        }
        self.maybe_auto_apply();
    }

    fn maybe_auto_apply(&mut self) {
        if !self.apply_on_complete || self.auto_applied || self.state.is_busy() {
            return;
        }
        if self.state.session().story().is_some() {
            self.auto_applied = true;
            self.dispatch(Msg::ApplyRequested);
        }
    }

    fn export(&self, dir: &Path) {
        let Some(story) = self.state.session().story() else {
            println!("no story loaded yet");
            return;
        };
        match export::write_story(dir, story) {
            Ok(paths) => {
                for path in paths {
                    println!("wrote {}", path.display());
                }
            }
            Err(err) => println!("error: export failed: {err}"),
        }
    }

    /// Throttled redraw: only on ticks, only what changed.
    fn render_changes(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        let view = self.state.view();
        studio_trace!("Render generation={} dirty view", view.render_generation);

        let status = render::status_line(&view);
        if status != self.last_status {
            println!("{status}");
            self.last_status = status;
        }

        let fresh_render = view.render_generation != self.last_view.render_generation;
        if let Some(job_id) = self.state.job().id() {
            for page in &view.gallery_pages {
                if !fresh_render && self.last_view.gallery_pages.contains(page) {
                    continue;
                }
                if let Ok(url) = self.settings.page_image_url(job_id, *page) {
                    println!("  page {page}: {url}");
                }
            }
        }

        if view.story != self.last_view.story {
            if let Some(story) = &view.story {
                print!("{}", render::story(story));
            }
        }
        self.last_view = view;
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match commands::parse(&line) {
                Ok(Some(input)) => {
                    if input_tx.send(input).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(message) => eprintln!("{message}"),
            }
        }
        let _ = input_tx.send(Input::Quit);
    });
}

fn spawn_ticker(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let interval = Duration::from_millis(200);
        while input_tx.send(Input::Msg(Msg::Tick)).is_ok() {
            thread::sleep(interval);
        }
    });
}
