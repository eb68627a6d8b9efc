use std::time::Duration;

use bbio::board::{Header, PinId};
use bbio::runner::{CancelToken, Runner};
use bbio::sim::SimDriver;
use bbio::spi::{self, Bus, ChipSelect, ClockDivider, Config, InputLine, SpiPins, MODE_0};
use bbio::time::Hertz;
use bbio::Io;

#[derive(clap::Args, Debug)]
pub struct AdcOpts {
    /// Command word clocked out to the converter each poll.
    #[arg(long, default_value_t = 0x0055_3caa)]
    command: u32,

    /// Poll period in milliseconds.
    #[arg(long, default_value_t = 500)]
    period_ms: u64,
}

impl crate::ToolRun for AdcOpts {
    fn run(&self) -> anyhow::Result<()> {
        let io = Io::init(SimDriver::new_loopback())?;

        // SPI0 on the P9 header: CS0, D1, D0, CLK
        let pins = SpiPins {
            cs: PinId::new(Header::P9, 17),
            d1: PinId::new(Header::P9, 18),
            d0: PinId::new(Header::P9, 21),
            clk: PinId::new(Header::P9, 22),
        };
        let bound = spi::configure(&io, Bus::Spi0, pins)?;

        // 48 MHz / 32 = 1.5 MHz, under the MCP3202's 1.8 MHz ceiling;
        // mode 0, 24-bit frames, converter output wired to D1
        let config = Config::new()
            .divider(ClockDivider::Div32)
            .mode(MODE_0)
            .chip_select(ChipSelect::ActiveLow)
            .input_line(InputLine::D1)
            .word_bits(24)
            .device_limit(Hertz::kHz(1800));
        let mut port = bound.enable(config)?;

        let token = CancelToken::new();
        let handler = token.clone();
        ctrlc::set_handler(move || handler.cancel())?;

        println!("Polling every {} ms, ^C to stop.", self.period_ms);
        let command = self.command;
        let runner = Runner::new(Duration::from_millis(self.period_ms), token);
        runner.run(|| {
            let value = port.transact(command)?;
            // display the low half only; the full word stays with the caller
            println!("Received: 0x{:04x}", value & 0xffff);
            Ok(())
        })?;
        Ok(())
    }
}
