use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::{cell::RefCell, env, rc::Rc, time::Duration};

use barnstorm::{GameConfig, KeyboardEvent, PlayController, PlayData, SessionOutcome};

/// Host frame length fed to the session.
const FRAME: Duration = Duration::from_millis(16);
/// Seconds of full throttle before the stick is released.
const THROTTLE_SECS: f64 = 3.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Installs the global log subscriber; the app itself is not run.
    App::new().add_plugins(LogPlugin::default());

    let mut args = env::args().skip(1);
    let mut config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let data = match args.next() {
        Some(path) => PlayData::load(path)?,
        None => PlayData::default(),
    };
    config.session.seed.get_or_insert(42);

    let outcome: Rc<RefCell<Option<SessionOutcome>>> = Rc::new(RefCell::new(None));
    let (on_victory, on_defeat) = (outcome.clone(), outcome.clone());

    let mut controller = PlayController::new(config, data);
    controller.start(
        move |elapsed| {
            *on_victory.borrow_mut() = Some(SessionOutcome::Victory {
                elapsed: elapsed.as_secs_f64(),
            })
        },
        move |remaining| *on_defeat.borrow_mut() = Some(SessionOutcome::Defeat { remaining }),
    )?;

    controller.on_keyboard_event(KeyboardEvent::down(KeyCode::Space));
    let mut flown = Duration::ZERO;
    let mut throttle_held = true;
    let mut last_report = 0;

    while outcome.borrow().is_none() {
        controller.update(FRAME);
        flown += FRAME;

        if throttle_held && flown.as_secs_f64() >= THROTTLE_SECS {
            controller.on_keyboard_event(KeyboardEvent::up(KeyCode::Space));
            throttle_held = false;
        }
        for cue in controller.drain_audio_cues() {
            debug!("Audio cue: {:?}", cue);
        }
        if flown.as_secs() >= last_report + 10 {
            last_report = flown.as_secs();
            let thrust = controller.airplane().map_or(0.0, |airplane| airplane.thrust());
            info!(
                "t={}s cows={} remaining={:.0}s thrust={:.2}",
                last_report,
                controller.cows_remaining(),
                controller.remaining_time().as_secs_f64(),
                thrust
            );
        }
    }

    match *outcome.borrow() {
        Some(SessionOutcome::Victory { elapsed }) => info!("Victory in {:.1}s", elapsed),
        Some(SessionOutcome::Defeat { remaining }) => info!("Defeat with {} cows left", remaining),
        None => {}
    }
    controller.stop()?;
    Ok(())
}
