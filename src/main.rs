#[cfg(target_family = "wasm")]
mod plugin;
#[cfg(not(target_family = "wasm"))]
mod preview;

#[cfg(target_family = "wasm")]
use zellij_tile::prelude::*;

#[cfg(target_family = "wasm")]
register_plugin!(plugin::WorldClockPlugin);

#[cfg(not(target_family = "wasm"))]
fn main() {
    preview::run(std::env::args().skip(1));
}
