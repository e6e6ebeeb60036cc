//! Terminate every running mdbatch web UI so it can be started fresh.
//!
//! Takes no arguments. Prints one line per matched process.

use ui_restart::{pattern_from_env, restart_matching, SystemProcessTable};

fn main() {
    let pattern = pattern_from_env();
    let mut table = SystemProcessTable::new();

    println!("Looking for processes matching '{pattern}'");
    let outcomes = restart_matching(&mut table, &pattern);

    if outcomes.is_empty() {
        println!("No matching processes");
        return;
    }

    for outcome in &outcomes {
        if outcome.is_success() {
            println!("{outcome}");
        } else {
            eprintln!("{outcome}");
        }
    }

    let killed = outcomes.iter().filter(|o| o.is_success()).count();
    println!("{killed}/{} process(es) terminated", outcomes.len());
}
