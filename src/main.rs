use clap::Parser;

fn main() {
    let args = t10_editor_lib::CliArgs::parse();

    if let Err(e) = t10_editor_lib::run(args) {
        eprintln!("t10-editor: {}", e);
        std::process::exit(1);
    }
}
