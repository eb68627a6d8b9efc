use std::time::Duration;

use bbio::board::PinId;
use bbio::driver::Driver;
use bbio::gpio::{Direction, PinHandle};
use bbio::runner::{CancelToken, Runner};
use bbio::sim::SimDriver;
use bbio::Io;

#[derive(clap::Args, Debug)]
pub struct BlinkOpts {
    /// Pin to blink, named like P9.14.
    #[arg(default_value = "P9.14")]
    pin: PinId,

    /// Half-period of the blink in milliseconds.
    #[arg(long, default_value_t = 800)]
    period_ms: u64,
}

impl crate::ToolRun for BlinkOpts {
    fn run(&self) -> anyhow::Result<()> {
        let io = Io::init(SimDriver::new())?;
        let mut pin = io.claim(self.pin, Direction::Output)?;

        let token = CancelToken::new();
        let handler = token.clone();
        ctrlc::set_handler(move || handler.cancel())?;

        println!("Blinking {} every {} ms, ^C to stop.", self.pin, self.period_ms);
        let half = Duration::from_millis(self.period_ms);
        let runner = Runner::new(half, token);
        runner.run(|| blink_cycle(&mut pin, half))?;
        Ok(())
    }
}

// one full cycle per step, so cancellation never leaves the pin high; the
// runner's sleep provides the low half of the period
fn blink_cycle<D: Driver>(pin: &mut PinHandle<'_, D>, half: Duration) -> Result<(), bbio::Error> {
    pin.set_high()?;
    std::thread::sleep(half);
    pin.set_low()?;
    Ok(())
}
