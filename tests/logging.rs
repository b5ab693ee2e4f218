use std::sync::{Arc, Mutex};

use log::{Level, LevelFilter, Log, Metadata, Record};

use flappy::{Observation, Stepper, World, WorldConfig};

struct Capture(Mutex<Vec<(Level, String)>>);

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.0.lock() {
            lines.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

// The logger is process-wide, so this binary holds a single test.
#[test]
fn generation_start_is_reported_at_info() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let world = Arc::new(World::new(WorldConfig::default()).unwrap());
    Stepper::new(world, vec![|_: &Observation| 0.0f32; 3], 6, 1).unwrap();

    let lines = CAPTURE.0.lock().unwrap();
    assert!(
        lines
            .iter()
            .any(|(level, msg)| *level == Level::Info && msg.starts_with("generation 6: 3 agents"))
    );
}
