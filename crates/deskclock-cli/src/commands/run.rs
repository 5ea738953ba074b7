use clap::Args;
use deskclock_core::error::Result;
use deskclock_core::input::parse_pair;
use deskclock_core::runtime::{self, Exit};
use deskclock_core::{
    notify, Command, Config, FormKind, ModeEngine, SoundCue, SystemClock, Ticker, TokioTicker,
    WallClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::terminal::TerminalPresenter;

#[derive(Args)]
pub struct RunArgs {
    /// Start straight into a countdown (MM:SS)
    #[arg(long, value_name = "MM:SS", conflicts_with = "alarm")]
    timer: Option<String>,
    /// Start with an alarm armed (HH:MM)
    #[arg(long, value_name = "HH:MM")]
    alarm: Option<String>,
}

pub fn run(args: RunArgs) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(run_clock(args, config));
    // The stdin reader sits in a blocking read that cannot be cancelled.
    rt.shutdown_background();
    Ok(result?)
}

async fn run_clock(args: RunArgs, config: Config) -> Result<()> {
    let (ticker, mut ticks) = TokioTicker::channel(config.ticker.align_to_second);
    let mut engine = ModeEngine::new(SystemClock, ticker, notify::from_config(&config.notifications))
        .with_cue(SoundCue::from_config(&config.notifications))
        .with_timer_defaults(config.timer.default_minutes, config.timer.default_seconds);

    pre_arm(&mut engine, &args)?;

    let (tx, mut commands) = mpsc::channel(16);
    tokio::spawn(read_commands(tx));

    let mut presenter = TerminalPresenter::new(std::io::stdout());
    presenter.help();
    let exit = runtime::run(&mut engine, &mut commands, &mut ticks, &mut presenter).await;
    presenter.finish();
    match exit {
        Exit::Quit => info!("quit"),
        Exit::InputClosed => info!("input closed"),
    }
    Ok(())
}

fn pre_arm<C: WallClock, T: Ticker>(engine: &mut ModeEngine<C, T>, args: &RunArgs) -> Result<()> {
    if let Some(text) = &args.timer {
        let (minutes, seconds) = parse_pair(text, FormKind::Timer)?;
        engine.request_timer();
        engine.confirm_timer(minutes, seconds)?;
    } else if let Some(text) = &args.alarm {
        let (hour, minute) = parse_pair(text, FormKind::Alarm)?;
        engine.request_alarm();
        engine.confirm_alarm(hour, minute)?;
    }
    Ok(())
}

async fn read_commands(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match Command::parse(&line) {
                Some(command) => {
                    if tx.send(command).await.is_err() {
                        break;
                    }
                }
                None => debug!(%line, "unrecognised input"),
            },
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        }
    }
}
