//! Engine entry point: just runs the UCI loop (spec §6).

fn main() {
    #[cfg(feature = "logging")]
    env_logger::init();

    talon::uci::run();
}
