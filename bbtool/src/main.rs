use clap::Parser;

mod adc;
mod blink;

trait ToolRun {
    fn run(&self) -> anyhow::Result<()>;
}

/// Exercise BeagleBone Black header pins through the simulated driver.
#[derive(Parser, Debug)]
struct Tool {
    #[command(subcommand)]
    command: ToolCommand,
}

#[derive(clap::Subcommand, Debug)]
enum ToolCommand {
    /// Blink a GPIO output pin.
    Blink(blink::BlinkOpts),
    /// Poll an MCP3202-style converter over SPI0.
    Adc(adc::AdcOpts),
}

impl ToolRun for ToolCommand {
    fn run(&self) -> anyhow::Result<()> {
        use ToolCommand::*;
        match self {
            Blink(o) => o.run(),
            Adc(o) => o.run(),
        }
    }
}

fn check_root_user() {
    // mapping physical memory needs an elevated caller; warn up front
    // rather than letting init fail later without context
    // safety: geteuid cannot fail
    if unsafe { libc::geteuid() } != 0 {
        log::warn!("not running as root; peripheral mapping may be refused");
    }
}

// warnings must be visible without RUST_LOG set; the privilege check and
// the per-iteration failure reports go through log::warn!
fn logger_env() -> env_logger::Env<'static> {
    env_logger::Env::default().default_filter_or("warn")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(logger_env()).init();
    check_root_user();
    Tool::parse().command.run()
}
