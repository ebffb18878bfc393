use std::io::Read;
use std::process::exit;

#[macro_use]
extern crate clap;
use clap::{App, Arg};

use erfindung::asm::Assembler;
use erfindung::console::Console;
use erfindung::debug::{Debugger, NO_LINE};
use erfindung::memory::MEMORY_CAPACITY;

/// frames of machine state kept around for the prefail report
const DEFAULT_FRAME_LIMIT: usize = 3;

/// bounded history of debugger frames, oldest dropped first
struct ExecutionHistory {
    frame_limit: usize,
    frames: Vec<String>,
}

impl ExecutionHistory {
    fn new(frame_limit: usize) -> Self {
        ExecutionHistory { frame_limit, frames: Vec::new() }
    }

    fn push_frame(&mut self, frame: String) {
        if self.frames.len() == self.frame_limit {
            self.frames.remove(0);
        }
        self.frames.push(frame);
    }

    fn to_string(&self) -> String {
        self.frames.join("\n")
    }
}

fn main() {
    let matches = App::new("erfindung-frontend")
        .version("0.1")
        .about("Assembles and runs Erfindung programs")
        .arg(Arg::with_name("INPUT")
            .help("Sets the input source file")
            .index(1))
        .arg(Arg::with_name("STREAMINPUT")
            .help("Reads the source from stdin instead of a file")
            .short("s")
            .long("stream-input"))
        .arg(Arg::with_name("CLI")
            .help("Runs on the command line (the only mode of this headless build)")
            .short("c")
            .long("command-line"))
        .arg(Arg::with_name("RUNTESTS")
            .help("Assembles and runs the built in smoke programs")
            .short("t")
            .long("run-tests"))
        .arg(Arg::with_name("WINDOWSCALE")
            .help("Scales the window resolution")
            .short("w")
            .long("window-scale")
            .takes_value(true))
        .arg(Arg::with_name("BREAKPOINTS")
            .help("Source lines to break on")
            .short("b")
            .long("break-points")
            .takes_value(true)
            .multiple(true))
        .arg(Arg::with_name("PREFAILWATCH")
            .help("Keeps a history of N frames, printed when the program fails")
            .short("p")
            .long("prefail-watch")
            .takes_value(true))
        .get_matches();

    if matches.is_present("RUNTESTS") {
        run_smoke_programs();
        return;
    }

    let mut assembler = Assembler::new();
    let assembled = if matches.is_present("STREAMINPUT") {
        let mut text = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut text) {
            eprintln!("could not read stdin: {}", e);
            exit(1);
        }
        assembler.assemble_from_string(&text)
    } else if let Some(filename) = matches.value_of("INPUT") {
        assembler.assemble_from_file(filename)
    } else {
        eprintln!("no input given; pass a source file or --stream-input");
        exit(1);
    };
    if let Err(e) = assembled {
        eprintln!("{}", e);
        exit(1);
    }
    for warning in assembler.warnings() {
        println!("{}", warning);
    }
    println!("program size: {}/{} bytes",
             assembler.program_data().len() * 4, MEMORY_CAPACITY);

    if matches.is_present("WINDOWSCALE") {
        println!("this build is headless, the window scale is ignored");
    }

    let mut console = Console::new();
    if let Err(e) = console.load_program(assembler.program_data()) {
        eprintln!("{}", e);
        exit(1);
    }

    let mut debugger = Debugger::new(assembler.debug_info());
    if let Some(lines) = matches.values_of("BREAKPOINTS") {
        for line in lines {
            let wanted: usize = match line.parse() {
                Ok(v) => v,
                Err(_) => {
                    println!("warning: break point \"{}\" is not a valid \
                              decimal number", line);
                    continue;
                }
            };
            let actual = debugger.add_break_point(wanted);
            if actual == NO_LINE {
                println!("failed to add a break point to line {}", wanted);
            } else if actual != wanted {
                println!("no instruction on line {}, breaking on proximal line {}",
                         wanted, actual);
            }
        }
    }

    let watching = matches.is_present("PREFAILWATCH")
        || matches.is_present("BREAKPOINTS");
    let frame_limit = value_t!(matches, "PREFAILWATCH", usize)
        .unwrap_or(DEFAULT_FRAME_LIMIT);
    let mut history = ExecutionHistory::new(frame_limit);

    // frame loop; each pass runs to the next wait and does the frame work
    loop {
        console.cpu.clear_wait();
        let frame_outcome = loop {
            match console.step() {
                Ok(()) => (),
                Err(e) => break Err(e),
            }
            if watching {
                debugger.update(&console.register_snapshot());
                if debugger.at_break_point() {
                    println!("{}", debugger.frame_report());
                }
            }
            if console.trying_to_shutdown() || console.cpu.wait_was_called()
                || console.pack.dev.wait_requested()
            {
                break Ok(());
            }
        };
        match frame_outcome {
            Ok(()) => {
                console.finish_frame();
                if watching {
                    debugger.update(&console.register_snapshot());
                    history.push_frame(debugger.frame_report());
                }
                if console.trying_to_shutdown() {
                    break;
                }
            }
            Err(e) => {
                match assembler.translate_to_line_number(e.pc) {
                    Some(line) => {
                        eprintln!("a problem has occured on source line {}", line);
                    }
                    None => eprintln!("a problem has occured outside of the \
                                       assembled program"),
                }
                eprintln!("{}", e);
                if watching {
                    eprintln!("the prefail frames are as follows:\n{}",
                              history.to_string());
                }
                exit(1);
            }
        }
    }
}

/// tiny programs exercising the whole pipeline end to end
fn run_smoke_programs() {
    let programs: &[(&str, &str, usize)] = &[
        ("push and pop", "set sp stack\nset a 1\npush a b c x y z\nset a 0\n\
                          pop z y x c b a\nio halt a\n\
                          :stack data [ ________ ________ ________ ________ \
                          ________ ________ ________ ________ ]", 32),
        ("call and return", "set sp stack\ncall double\nio halt x\n\
                             :double add x x x\npop pc\n\
                             :stack data [ ________ ________ ________ ________ ]", 16),
        ("fixed point multiply", "assume fp\nset x 0.5\nset y 0.25\n\
                                  times a x y\nio halt a", 8),
    ];
    for (name, source, limit) in programs {
        let mut assembler = Assembler::new();
        if let Err(e) = assembler.assemble_from_string(source) {
            eprintln!("test \"{}\" failed to assemble: {}", name, e);
            exit(1);
        }
        let mut console = Console::deterministic();
        if let Err(e) = console.load_program(assembler.program_data()) {
            eprintln!("test \"{}\" failed to load: {}", name, e);
            exit(1);
        }
        for _ in 0..*limit {
            if console.trying_to_shutdown() {
                break;
            }
            if let Err(e) = console.step() {
                eprintln!("test \"{}\" failed: {}", name, e);
                exit(1);
            }
        }
        println!("test \"{}\" ok", name);
    }
}
