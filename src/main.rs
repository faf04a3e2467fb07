use delocto::uci::{Uci, ENGINE_NAME, ENGINE_VERSION};

fn main() {
    delocto::init();

    println!("{ENGINE_NAME} {ENGINE_VERSION}");

    // Command line arguments are executed as a single UCI command
    // ("delocto bench"), otherwise run the interactive loop.
    let args: Vec<String> = std::env::args().skip(1).collect();
    Uci::new().run(&args);
}
