#[macro_use]
extern crate criterion;

extern crate erfindung;

use criterion::Criterion;

use erfindung::asm::Assembler;
use erfindung::console::Console;

fn exec_simple_loop(c: &mut Criterion) {
    let mut asmr = Assembler::new();
    asmr.assemble_from_string(
        "assume integer\n\
         set x 0\n\
         :top add x x 1\n\
         cmp a x x\n\
         jump top")
        .unwrap();
    let mut console = Console::deterministic();
    console.load_program(asmr.program_data()).unwrap();

    c.bench_function("execute small jump loop", |b| {
        b.iter(|| console.step().unwrap())
    });
}

fn assemble_small_program(c: &mut Criterion) {
    let source = "\
        assume integer\n\
        set sp stack\n\
        set x 5\n\
        set y 3\n\
        add z x y\n\
        push z\n\
        pop a\n\
        io halt a\n\
        :stack data [ ________ ________ ________ ________ ]";
    c.bench_function("assemble small program", |b| {
        b.iter(|| {
            let mut asmr = Assembler::new();
            asmr.assemble_from_string(source).unwrap();
        })
    });
}

criterion_group!(benches, exec_simple_loop, assemble_small_program);
criterion_main!(benches);
