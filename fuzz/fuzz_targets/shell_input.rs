//! Fuzz harness for shell input.
//!
//! Any line, parsed and executed against the demo device, must be handled
//! without panicking.

#![no_main]
use isle_cli::{Shell, ShellOptions, parse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|lines: Vec<String>| {
    let mut shell = Shell::new(&ShellOptions::default(), std::io::sink());
    for line in lines.iter().take(64) {
        if shell.execute(parse(line)).is_err() {
            return;
        }
    }
});
