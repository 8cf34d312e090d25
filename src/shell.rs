use core::str;
use hueos::console::CONSOLE;
use hueos::constants::console::CONSOLE_MAJOR;
use hueos::device::{InodeLock, DEVSW};
use hueos::error::Error;
use hueos::{kprintf, kwarn, print, println};

const LINE_BUF_LEN: usize = 128;
const MAX_ARGS: usize = 8;

/// The init task reads the console device directly; its handle has no lock.
struct ConsoleHandle;

impl InodeLock for ConsoleHandle {
    fn unlock(&self) {}
    fn lock(&self) {}
}

fn prompt() {
    print!("$ ");
}

/// Command function type
type CommandFn = fn(&[&str]);

/// Command registry entry
struct Command {
    name: &'static str,
    help: &'static str,
    func: CommandFn,
}

/// Command dispatch table - add new commands here
const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        help: "Display this help message",
        func: cmd_help,
    },
    Command {
        name: "echo",
        help: "Echo arguments to the screen",
        func: cmd_echo,
    },
    Command {
        name: "setecho",
        help: "setecho 0|1 - turn keyboard echo off or on",
        func: cmd_setecho,
    },
    Command {
        name: "ps",
        help: "List tasks (same as Ctrl-P)",
        func: cmd_ps,
    },
    Command {
        name: "reboot",
        help: "Reboot the system",
        func: cmd_reboot,
    },
];

/// Find command by name
fn find_command(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|cmd| cmd.name == name)
}

/// Read lines from the console device forever, running each as a command.
pub fn run() -> ! {
    let mut buf = [0u8; LINE_BUF_LEN];
    loop {
        prompt();
        match DEVSW.read(CONSOLE_MAJOR, &ConsoleHandle, &mut buf) {
            Ok(0) => println!("(end of input)"),
            Ok(n) => execute_line(&buf[..n]),
            Err(Error::Killed) => kwarn!("shell: read interrupted"),
            Err(err) => {
                kwarn!("shell: {}", err);
                halt();
            }
        }
    }
}

fn halt() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}

fn execute_line(line: &[u8]) {
    let Ok(line) = str::from_utf8(line) else {
        println!("input is not valid UTF-8");
        return;
    };
    let (args, argc) = split_whitespace(line.trim_end_matches('\n'));
    if argc == 0 {
        return;
    }

    match find_command(args[0]) {
        Some(cmd) => (cmd.func)(&args[1..argc]),
        None => kprintf!("%s: command not found\n", args[0]),
    }
}

// ============================================================================
// Command implementations
// ============================================================================

fn cmd_help(_args: &[&str]) {
    println!("Available commands:");
    for cmd in COMMANDS {
        println!("  {:<12} - {}", cmd.name, cmd.help);
    }
}

fn cmd_echo(args: &[&str]) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            print!(" ");
        }
        print!("{}", arg);
    }
    println!();
}

fn cmd_setecho(args: &[&str]) {
    let on = match args.first() {
        Some(&"0") => false,
        Some(&"1") => true,
        _ => {
            println!("usage: setecho 0|1");
            return;
        }
    };
    let was = CONSOLE.set_echo(on);
    kprintf!("echo %d (was %d)\n", on as i32, was as i32);
}

fn cmd_ps(_args: &[&str]) {
    use hueos::task::Scheduler;
    CONSOLE.tasks().procdump();
}

fn cmd_reboot(_args: &[&str]) {
    println!("Rebooting system...");
    hueos::keyboard::reset_cpu();
}

// ============================================================================
// Utilities
// ============================================================================

/// Splits on spaces and tabs into at most `MAX_ARGS` words.
fn split_whitespace(s: &str) -> ([&str; MAX_ARGS], usize) {
    let mut out: [&str; MAX_ARGS] = [""; MAX_ARGS];
    let mut count = 0;
    for word in s.split([' ', '\t']).filter(|w| !w.is_empty()).take(MAX_ARGS) {
        out[count] = word;
        count += 1;
    }
    (out, count)
}
