//! Minimal demo: assembles a small routine that counts a register down
//! with a conditional branch, then prints its hex dump. Exercises label
//! definition, resolution, and shortening end to end.

use clap::Parser;

use x64emit::encode::{branch, control, integer};
use x64emit::registers::{RAX, RBX};
use x64emit::Buffer;

/// Assemble a fixed demo routine and print its encoded bytes.
#[derive(Parser)]
#[command(name = "x64emit-demo", about = "Assembles a fixed demo routine with x64emit")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut buf = Buffer::new();
    let top = buf.new_label();
    let done = buf.new_label();

    buf.define_label(top).expect("top defined once");
    integer::cmp_imm32(&mut buf, RAX, 0);
    branch::emit_jle(&mut buf, done);
    integer::sub_imm32(&mut buf, RAX, 1);
    integer::add(&mut buf, RBX, RAX);
    branch::emit_jmp(&mut buf, top);
    buf.define_label(done).expect("done defined once");
    control::ret(&mut buf);

    buf.resolve_all().expect("every label used above is defined");
    buf.shorten().expect("shortening always converges for this routine");

    println!("{}", buf.format_hex());
}
